// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Cartes de la watchlist, journal des événements, footer (raccourcis / saisie)
//
// CONCEPTS RATATUI :
// 1. Layout : header / contenu / footer, puis cartes | journal
// 2. List : une carte = un ListItem de deux lignes
// 3. Style : vert/rouge selon la variation, jaune pour les infos
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::models::{format_compact, CardState, EventCategory, PriceEvent, WatchlistItem};
use crate::ui::chart;

/// Dessine l'interface complète selon l'écran courant
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Dashboard | Screen::InputMode => render_dashboard(frame, app),
        Screen::ChartView => chart::render_chart(frame, app, frame.size()),
    }
}

/// Dessine le dashboard (cartes + journal + footer)
fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(4), // Footer
        ])
        .split(frame.size());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_header(frame, app, chunks[0]);
    render_cards(frame, app, body[0]);
    render_event_log(frame, app, body[1]);

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[2]);
    } else {
        render_footer(frame, app, chunks[2]);
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" TickerWatch ")
        .title_alignment(Alignment::Center);

    let last_update = app
        .events
        .latest()
        .map(|e| format!("  ·  last event {}", e.time_label()))
        .unwrap_or_default();

    let text = Line::from(vec![
        Span::styled(
            format!("Watching {} symbols", app.watchlist.len()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(last_update, Style::default().fg(Color::Gray)),
    ]);

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Cartes
// ============================================================================

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Watchlist ");

    if app.cards.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Watchlist is empty", Style::default().fg(Color::Gray))),
            Line::from(Span::styled("[a] to add a symbol", Style::default().fg(Color::Gray))),
        ];
        let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let mut style = card_style(card);
            if index == app.selected_index {
                style = style.add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED);
            }

            ListItem::new(vec![
                Line::from(format!(" {}", card.display())),
                Line::from(Span::styled(
                    format!("   {}", card_details(card)),
                    Style::default().fg(Color::Gray),
                )),
            ])
            .style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn card_style(card: &WatchlistItem) -> Style {
    match &card.state {
        CardState::Loading => Style::default().fg(Color::Gray),
        CardState::Failed(_) => Style::default().fg(Color::Red),
        CardState::Loaded(_) if card.is_positive() => Style::default().fg(Color::Green),
        CardState::Loaded(_) => Style::default().fg(Color::Red),
    }
}

/// Deuxième ligne d'une carte : métriques de la séance
///
/// Format : "O 201.50  H 211.20  L 199.80  Vol 48.00M  Cap 3.20T"
pub fn card_details(card: &WatchlistItem) -> String {
    let quote = match &card.state {
        CardState::Loaded(quote) => quote,
        CardState::Loading => return String::new(),
        CardState::Failed(_) => return "Fetch failed, retrying on next refresh".to_string(),
    };

    let price = |value: Option<f64>| value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
    let compact = |value: Option<f64>| value.map(format_compact).unwrap_or_else(|| "-".to_string());

    format!(
        "O {}  H {}  L {}  Vol {}  Cap {}",
        price(quote.open),
        price(quote.high),
        price(quote.low),
        compact(quote.volume.map(|v| v as f64)),
        compact(quote.market_cap),
    )
}

// ============================================================================
// Journal des événements
// ============================================================================

fn render_event_log(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🔔 Events ");

    let items: Vec<ListItem> = app.events.iter().map(event_item).collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn event_item(event: &PriceEvent) -> ListItem<'static> {
    let color = match event.category {
        EventCategory::Info => Color::Yellow,
        EventCategory::PriceJump => Color::Green,
        EventCategory::PriceDrop => Color::Red,
        EventCategory::Error => Color::LightRed,
    };

    ListItem::new(Line::from(vec![
        Span::styled(format!("{} ", event.time_label()), Style::default().fg(Color::Gray)),
        Span::styled(event.message.clone(), Style::default().fg(color)),
    ]))
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let blinking = Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::SLOW_BLINK);
    let key = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_delete_confirmation() {
        let symbol = app.selected_item().map(|item| item.symbol.as_str()).unwrap_or("?");
        Line::from(vec![
            Span::styled("⚠  Press ", warning),
            Span::styled("[d]", blinking),
            Span::styled(format!(" again to remove {}, any other key to cancel ⚠", symbol), warning),
        ])
    } else if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Press ", warning),
            Span::styled("[q]", blinking),
            Span::styled(" again to quit, any other key to cancel ⚠", warning),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key(Color::Yellow)),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key(Color::Yellow)),
            Span::raw(" Navigate  "),
            Span::styled("[Enter]", key(Color::Yellow)),
            Span::raw(" 1Y Chart  "),
            Span::styled("[a]", key(Color::Green)),
            Span::raw(" Add  "),
            Span::styled("[d]", key(Color::Red)),
            Span::raw(" Remove"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts]).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie : prompt + buffer + curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.to_uppercase(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Add  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
