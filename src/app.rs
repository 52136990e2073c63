// ============================================================================
// Structure : App
// ============================================================================
// Contexte de l'application, possédé par le thread UI
//
// PATTERN : "Application State"
// - Watchlist persistée, table des derniers prix, journal, cartes : tout est ici
// - Seul le thread UI le modifie (en vidant les résultats du worker), donc
//   pas de Mutex
// - Les méthodes qui déclenchent du réseau RETOURNENT les symboles à fetcher :
//   App ne connaît pas le worker et reste testable sans runtime
// ============================================================================

use tracing::{debug, error, info, warn};

use crate::detector::{EventDetector, PreviousPriceTable};
use crate::models::{CardState, EventLog, PriceEvent, PriceSeries, Quote, WatchlistItem};
use crate::storage::{AddOutcome, Watchlist};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : cartes de la watchlist + journal
    Dashboard,

    /// Graphique 1 an du symbole sélectionné
    ChartView,

    /// Mode saisie : ajout d'un symbole
    /// - Enter valide, ESC annule
    InputMode,
}

/// État du graphique 1 an
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    /// Aucun graphique demandé
    Idle,
    Loading { symbol: String },
    Loaded(PriceSeries),
    /// Panneau d'erreur avec possibilité de recharger
    Failed { symbol: String, message: String },
}

impl ChartState {
    /// Symbole concerné par le graphique courant
    pub fn symbol(&self) -> Option<&str> {
        match self {
            ChartState::Idle => None,
            ChartState::Loading { symbol } | ChartState::Failed { symbol, .. } => Some(symbol.as_str()),
            ChartState::Loaded(series) => Some(series.symbol.as_str()),
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Watchlist persistée : source de vérité des symboles pollés
    pub watchlist: Watchlist,

    /// Cartes affichées, dans l'ordre d'apparition
    pub cards: Vec<WatchlistItem>,

    /// Dernier prix observé par symbole
    pub previous_prices: PreviousPriceTable,

    /// Journal des événements (20 max, plus récent en tête)
    pub events: EventLog,

    pub detector: EventDetector,

    /// Index de la carte sélectionnée
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    pub chart: ChartState,

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,

    /// Two-step delete : première pression de 'd' -> confirmation
    pub confirm_delete: bool,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input (ex: "Add ticker: ")
    pub input_prompt: String,
}

impl App {
    /// Crée l'application autour d'une watchlist (pas encore chargée)
    pub fn new(watchlist: Watchlist, detector: EventDetector) -> Self {
        Self {
            running: true,
            watchlist,
            cards: Vec::new(),
            previous_prices: PreviousPriceTable::new(),
            events: EventLog::new(),
            detector,
            selected_index: 0,
            current_screen: Screen::Dashboard,
            chart: ChartState::Idle,
            confirm_quit: false,
            confirm_delete: false,
            input_buffer: String::new(),
            input_prompt: String::new(),
        }
    }

    // ========================================================================
    // Watchlist
    // ========================================================================

    /// Charge la watchlist persistée et retourne les symboles à fetcher
    pub fn load_watchlist(&mut self) -> Vec<String> {
        if let Err(e) = self.watchlist.load() {
            error!(error = ?e, "Failed to load watchlist");
            self.events.push(PriceEvent::error(format!("Could not load watchlist: {}", e)));
        }

        let symbols = self.watchlist.symbols().to_vec();
        self.cards = symbols.iter().cloned().map(WatchlistItem::new).collect();
        self.selected_index = 0;

        info!(count = symbols.len(), "Watchlist loaded");
        self.events.push(PriceEvent::info(format!("Watching {} symbols", symbols.len())));
        symbols
    }

    /// Ajoute un symbole saisi par l'utilisateur
    ///
    /// Retourne le symbole normalisé à fetcher immédiatement, ou None
    /// (saisie vide ou doublon).
    pub fn add_symbol(&mut self, input: &str) -> Option<String> {
        let outcome = match self.watchlist.add(input) {
            Ok(outcome) => outcome,
            Err(e) => {
                // Ajouté en mémoire mais pas persisté
                error!(error = ?e, "Failed to persist watchlist");
                self.events.push(PriceEvent::error(format!("Could not save watchlist: {}", e)));
                let symbol = crate::storage::normalize_symbol(input);
                AddOutcome::Added(symbol)
            }
        };

        match outcome {
            AddOutcome::Added(symbol) => {
                info!(ticker = %symbol, "Symbol added to watchlist");
                self.events.push(PriceEvent::info(format!("Added {} to watchlist", symbol)));
                self.upsert_card(&symbol, CardState::Loading);
                Some(symbol)
            }
            AddOutcome::AlreadyPresent(symbol) => {
                debug!(ticker = %symbol, "Symbol already in watchlist");
                self.events.push(PriceEvent::info(format!("{} is already in your watchlist", symbol)));
                None
            }
            AddOutcome::Empty => None,
        }
    }

    /// Retire un symbole : liste persistée, dernier prix, carte
    pub fn remove_symbol(&mut self, symbol: &str) {
        if let Err(e) = self.watchlist.remove(symbol) {
            error!(ticker = %symbol, error = ?e, "Failed to persist watchlist");
            self.events.push(PriceEvent::error(format!("Could not save watchlist: {}", e)));
        }

        self.previous_prices.remove(symbol);
        self.cards.retain(|card| !card.symbol.eq_ignore_ascii_case(symbol));

        if self.selected_index >= self.cards.len() && self.selected_index > 0 {
            self.selected_index = self.cards.len().saturating_sub(1);
        }

        info!(ticker = %symbol, "Symbol removed from watchlist");
        self.events.push(PriceEvent::info(format!("Removed {} from watchlist", symbol)));
    }

    /// Retire la carte sélectionnée (après confirmation)
    pub fn delete_selected(&mut self) {
        if let Some(symbol) = self.selected_item().map(|item| item.symbol.clone()) {
            self.remove_symbol(&symbol);
        }
        self.confirm_delete = false;
    }

    // ========================================================================
    // Résultats du worker
    // ========================================================================

    /// Tick du poller : un événement "refreshed" et tous les symboles à fetcher
    pub fn on_poll_tick(&mut self) -> Vec<String> {
        self.events.push(PriceEvent::info("Data refreshed"));
        self.watchlist.symbols().to_vec()
    }

    /// Applique une cotation reçue : détection puis mise à jour de la carte
    ///
    /// Un fetch en vol pour un symbole retiré écrit quand même sa carte
    /// (course acceptée, pas d'annulation).
    pub fn apply_quote(&mut self, quote: Quote) {
        for event in self.detector.evaluate(&quote, &mut self.previous_prices) {
            info!(ticker = %quote.symbol, message = %event.message, "Price event");
            self.events.push(event);
        }

        let symbol = quote.symbol.clone();
        self.upsert_card(&symbol, CardState::Loaded(quote));
    }

    /// Applique un échec de fetch : carte en erreur + événement
    pub fn apply_quote_error(&mut self, symbol: &str, message: &str) {
        warn!(ticker = %symbol, error = %message, "Quote fetch failed");
        self.events.push(PriceEvent::error(format!("{}: {}", symbol, message)));
        self.upsert_card(symbol, CardState::Failed(message.to_string()));
    }

    /// Met à jour la carte d'un symbole, ou l'ajoute en fin de liste
    fn upsert_card(&mut self, symbol: &str, state: CardState) {
        match self.cards.iter_mut().find(|card| card.symbol == symbol) {
            Some(card) => card.state = state,
            None => {
                let mut card = WatchlistItem::new(symbol.to_string());
                card.state = state;
                self.cards.push(card);
            }
        }
    }

    // ========================================================================
    // Graphique 1 an
    // ========================================================================

    /// Ouvre le graphique du symbole sélectionné, retourne le symbole à fetcher
    pub fn open_chart(&mut self) -> Option<String> {
        let symbol = self.selected_item()?.symbol.clone();
        self.chart = ChartState::Loading { symbol: symbol.clone() };
        self.current_screen = Screen::ChartView;
        Some(symbol)
    }

    /// Recharge manuellement le graphique courant
    pub fn reload_chart(&mut self) -> Option<String> {
        let symbol = self.chart.symbol()?.to_string();
        self.chart = ChartState::Loading { symbol: symbol.clone() };
        Some(symbol)
    }

    /// Applique un historique reçu (ignoré s'il ne correspond plus au graphique affiché)
    pub fn apply_history(&mut self, series: PriceSeries) {
        if self.chart.symbol() == Some(series.symbol.as_str()) {
            self.chart = ChartState::Loaded(series);
        } else {
            debug!(ticker = %series.symbol, "Discarding stale price history");
        }
    }

    pub fn apply_history_error(&mut self, symbol: &str, message: &str) {
        if self.chart.symbol() == Some(symbol) {
            self.chart = ChartState::Failed {
                symbol: symbol.to_string(),
                message: message.to_string(),
            };
        }
    }

    // ========================================================================
    // Navigation et écrans
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max_index = self.cards.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    pub fn selected_item(&self) -> Option<&WatchlistItem> {
        self.cards.get(self.selected_index)
    }

    pub fn show_dashboard(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_chart(&self) -> bool {
        self.current_screen == Screen::ChartView
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete
    }

    // ========================================================================
    // Mode saisie
    // ========================================================================

    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Valide la saisie et retourne le texte brut
    pub fn submit_input(&mut self) -> String {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Dashboard;
        self.input_prompt.clear();
        value
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }
}

// ============================================================================
// Tests
// ============================================================================
