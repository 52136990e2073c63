// ============================================================================
// Structure : WatchlistItem
// ============================================================================
// Une carte affichée sur le dashboard : un symbole et l'état de sa cotation
//
// CONCEPTS RUST :
// 1. Enum avec données : Loading / Loaded(Quote) / Failed(String)
// 2. Option chaining pour lire la cotation quand elle existe
// ============================================================================

use crate::models::Quote;

/// État d'une carte
#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    /// Fetch en cours (premier chargement)
    Loading,
    /// Dernière cotation reçue
    Loaded(Quote),
    /// Dernier fetch en échec, avec le message à afficher
    Failed(String),
}

/// Une carte de la watchlist
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistItem {
    /// Symbole du ticker (ex: "AAPL")
    pub symbol: String,

    pub state: CardState,
}

impl WatchlistItem {
    /// Crée une carte en attente de données
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            state: CardState::Loading,
        }
    }

    pub fn quote(&self) -> Option<&Quote> {
        match &self.state {
            CardState::Loaded(quote) => Some(quote),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            CardState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Nom affiché : celui de la cotation, sinon le symbole
    pub fn name(&self) -> &str {
        self.quote().map(|q| q.name.as_str()).unwrap_or(&self.symbol)
    }

    pub fn has_data(&self) -> bool {
        self.quote().is_some()
    }

    /// Retourne true si le ticker est en hausse
    pub fn is_positive(&self) -> bool {
        self.quote().map(|q| q.is_positive()).unwrap_or(false)
    }

    /// Formatte la ligne principale de la carte
    ///
    /// Format : "AAPL    Apple Inc.            $271.49  ▲ +5.61 (+2.11%)"
    ///
    /// Note : Le nom est tronqué à 20 caractères pour éviter le débordement
    pub fn display(&self) -> String {
        let truncated_name = if self.name().chars().count() <= 20 {
            self.name().to_string()
        } else {
            let truncated: String = self.name().chars().take(19).collect();
            format!("{}…", truncated)
        };

        match &self.state {
            CardState::Loading => {
                format!("{:<8} {:<20} {:>12}", self.symbol, truncated_name, "Loading...")
            }
            CardState::Loaded(quote) => format!(
                "{:<8} {:<20} {:>12}  {}",
                self.symbol,
                truncated_name,
                format!("${:.2}", quote.price),
                quote.change_label()
            ),
            CardState::Failed(message) => {
                format!("{:<8} {:<20} ⚠ {}", self.symbol, truncated_name, message)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
