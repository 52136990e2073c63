// ============================================================================
// TickerWatch - Watchlist avec polling et journal des mouvements
// ============================================================================
// Programme TUI : cartes de cotations rafraîchies périodiquement, journal des
// mouvements significatifs, graphique 1 an du symbole sélectionné
//
// ARCHITECTURE :
// 1. Thread UI : possède App, dessine, lit le clavier, applique les résultats
// 2. Thread worker : runtime tokio, fetchs HTTP + ticks du poller
// 3. Deux channels : commandes UI -> worker, résultats worker -> UI
// ============================================================================

use std::io;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use tickerwatch::api::QuoteClient;
use tickerwatch::app::App;
use tickerwatch::config::Config;
use tickerwatch::detector::EventDetector;
use tickerwatch::storage::{FileStore, Watchlist};
use tickerwatch::ui::{events::EventHandler, render, Event};
use tickerwatch::worker::{spawn_worker, WorkerEvent, WorkerHandle};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans ./logs/tickerwatch.log.YYYY-MM-DD
///
/// # Utilisation
/// ```bash
/// tail -f logs/tickerwatch.log.*
/// RUST_LOG=tickerwatch=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "tickerwatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour tickerwatch, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickerwatch=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("TickerWatch starting up");

    let config = Config::from_env().context("Configuration invalide")?;
    info!(?config, "Configuration loaded");

    let client = QuoteClient::new(config.base_url.as_str())?;
    let watchlist = Watchlist::new(Box::new(FileStore::new(&config.data_dir)));
    let mut app = App::new(watchlist, EventDetector::from_config(&config));

    let (result_tx, result_rx) = mpsc::channel::<WorkerEvent>();
    info!("Spawning background worker thread");
    let (worker, _worker_thread) = spawn_worker(client, config.poll_interval, result_tx)?;

    // Chargement de la watchlist : un fetch par symbole
    for symbol in app.load_watchlist() {
        worker.fetch_quote(symbol);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();
    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &worker, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Dropper la poignée ferme le channel : le worker s'arrête de lui-même
    drop(worker);
    result
}

// ============================================================================
// Event Loop
// ============================================================================
// À chaque itération :
// 0. Appliquer les résultats du worker (seul endroit où l'état change hors clavier)
// 1. Dessiner
// 2. Traiter l'entrée clavier (timeout 250ms)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    worker: &WorkerHandle,
    result_rx: &mpsc::Receiver<WorkerEvent>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS : vide tout ce qui est arrivé depuis le dernier tour
        loop {
            match result_rx.try_recv() {
                Ok(result) => apply_worker_event(app, result, worker),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    anyhow::bail!("Worker thread disconnected");
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, worker),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Applique un résultat du worker sur l'état
fn apply_worker_event(app: &mut App, event: WorkerEvent, worker: &WorkerHandle) {
    match event {
        WorkerEvent::PollTick => {
            let symbols = app.on_poll_tick();
            info!(count = symbols.len(), "Poll tick, refreshing watchlist");
            for symbol in symbols {
                worker.fetch_quote(symbol);
            }
        }
        WorkerEvent::QuoteLoaded { quote } => app.apply_quote(quote),
        WorkerEvent::QuoteFailed { symbol, error } => app.apply_quote_error(&symbol, &error),
        WorkerEvent::HistoryLoaded { series } => app.apply_history(series),
        WorkerEvent::HistoryFailed { symbol, error } => app.apply_history_error(&symbol, &error),
    }
}

// ============================================================================
// Gestion des événements clavier
// ============================================================================
// Le mode saisie est traité en premier : 'q', 'd', 'a'... y sont des lettres
// de symbole, pas des raccourcis.
// ============================================================================

fn handle_event(app: &mut App, event: Event, worker: &WorkerHandle) {
    use tickerwatch::ui::events::{
        get_char_from_event, is_add_event, is_backspace_event, is_delete_event, is_down_event,
        is_enter_event, is_escape_event, is_quit_event, is_reload_event, is_space_event,
        is_ticker_char_event, is_up_event,
    };

    if let Event::Tick = event {
        return;
    }

    // ========================================
    // Mode saisie
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            let input = app.submit_input();
            if let Some(symbol) = app.add_symbol(&input) {
                worker.fetch_quote(symbol);
            }
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_ticker_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        return;
    }

    // Quit two-step, sur tous les écrans
    if is_quit_event(&event) {
        app.cancel_delete();
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // ========================================
    // Graphique
    // ========================================
    if app.is_on_chart() {
        app.cancel_quit();
        if is_escape_event(&event) || is_space_event(&event) {
            debug!("User returned to dashboard");
            app.show_dashboard();
        } else if is_reload_event(&event) {
            if let Some(symbol) = app.reload_chart() {
                info!(ticker = %symbol, "User reloaded chart");
                worker.fetch_history(symbol);
            }
        }
        return;
    }

    // ========================================
    // Dashboard
    // ========================================
    if is_delete_event(&event) {
        app.cancel_quit();
        if app.cards.is_empty() {
            return;
        }
        if app.is_awaiting_delete_confirmation() {
            info!("User confirmed delete");
            app.delete_selected();
        } else {
            info!("User requested delete (awaiting confirmation)");
            app.request_delete();
        }
        return;
    }

    // Toute autre touche annule les confirmations en attente
    app.cancel_quit();
    app.cancel_delete();

    if is_add_event(&event) {
        info!("User requested add ticker");
        app.start_input("Add ticker: ".to_string());
    } else if is_up_event(&event) {
        app.navigate_up();
    } else if is_down_event(&event) {
        app.navigate_down();
    } else if is_enter_event(&event) {
        if let Some(symbol) = app.open_chart() {
            info!(ticker = %symbol, "User opened chart view");
            worker.fetch_history(symbol);
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
