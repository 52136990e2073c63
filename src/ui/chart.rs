// ============================================================================
// Chart - Graphique ligne 1 an
// ============================================================================
// Affiche la série de clôtures du symbole sélectionné, ou un panneau
// d'erreur plein écran avec rechargement manuel
//
// CONCEPTS RATATUI :
// 1. Chart widget : Dataset (points x, y) + Axis
// 2. Labels : premier / milieu / dernier label de la série sur l'axe X
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::{App, ChartState};
use crate::models::PriceSeries;

/// Dessine le graphique selon l'état courant
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    match &app.chart {
        ChartState::Idle => render_message(frame, area, "No chart selected", Color::Gray),
        ChartState::Loading { symbol } => {
            render_message(frame, area, &format!("Loading 1Y history for {}...", symbol), Color::Yellow)
        }
        ChartState::Failed { symbol, message } => render_error(frame, area, symbol, message),
        ChartState::Loaded(series) if series.is_empty() => {
            render_message(frame, area, &format!("No price data for {}", series.symbol), Color::Gray)
        }
        ChartState::Loaded(series) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(area);

            render_chart_header(frame, series, chunks[0]);
            render_chart_graph(frame, series, chunks[1]);
        }
    }
}

/// Header : dernier prix et variation sur la période
fn render_chart_header(frame: &mut Frame, series: &PriceSeries, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 📈 {} - 1 Year ", series.symbol));

    let change = series.total_change_percent().unwrap_or(0.0);
    let color = if change >= 0.0 { Color::Green } else { Color::Red };
    let arrow = if change >= 0.0 { "▲" } else { "▼" };
    let last = series.data.last().copied().unwrap_or_default();

    let text = Line::from(vec![
        Span::raw("Price: "),
        Span::styled(format!("${:.2}", last), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("{} {:+.2}% (1Y)", arrow, change), Style::default().fg(color)),
        Span::raw("  "),
        Span::styled("[r]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Reload  "),
        Span::styled("[ESC]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Back"),
    ]);

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Graphique ligne (x = index du point, y = clôture)
fn render_chart_graph(frame: &mut Frame, series: &PriceSeries, area: Rect) {
    let points: Vec<(f64, f64)> = series
        .data
        .iter()
        .enumerate()
        .map(|(i, &price)| (i as f64, price))
        .collect();

    let (min_price, max_price) = series.bounds().unwrap_or((0.0, 0.0));

    // Marge de 5% pour que la courbe respire
    let margin = ((max_price - min_price) * 0.05).max(0.01);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let color = if series.total_change_percent().unwrap_or(0.0) >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };

    let datasets = vec![Dataset::default()
        .name(format!("{} Price (USD)", series.symbol))
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, points.len().saturating_sub(1).max(1) as f64])
        .labels(x_labels(series).into_iter().map(Span::raw).collect());

    let y_axis = Axis::default()
        .title("Price ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.2}", y_min)),
            Span::raw(format!("${:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Labels de l'axe X : premier, milieu, dernier
pub fn x_labels(series: &PriceSeries) -> Vec<String> {
    match series.labels.len() {
        0 => Vec::new(),
        1 => vec![series.labels[0].clone()],
        2 => series.labels.clone(),
        n => vec![
            series.labels[0].clone(),
            series.labels[n / 2].clone(),
            series.labels[n - 1].clone(),
        ],
    }
}

/// Panneau d'erreur plein écran avec rechargement manuel
fn render_error(frame: &mut Frame, area: Rect, symbol: &str, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(format!(" ⚠ {} ", symbol));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Failed to Load Chart",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[r]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Retry  "),
            Span::styled("[ESC]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Back"),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Message centré (chargement, pas de données)
fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled("[ESC] Back", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
