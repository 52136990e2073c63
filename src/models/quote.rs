// ============================================================================
// Structure : Quote
// ============================================================================
// Instantané d'une cotation tel que renvoyé par l'API, aplati
//
// CONCEPTS RUST :
// 1. Option<T> pour les champs que l'API peut omettre (open, volume, etc.)
// 2. Valeurs dérivées calculées une seule fois à la construction
// ============================================================================

use serde::{Deserialize, Serialize};

/// Cotation d'un symbole à un instant donné
///
/// Recréée à chaque poll, jamais fusionnée avec l'état précédent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbole du ticker (ex: "AAPL")
    pub symbol: String,

    /// Nom affiché (ex: "Apple Inc.")
    pub name: String,

    /// Prix courant
    pub price: f64,

    /// Variation absolue depuis la clôture précédente
    pub change: f64,

    /// Variation en pourcentage depuis la clôture précédente
    pub change_percent: f64,

    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,

    /// Volume de la séance (dernier élément renvoyé par l'API)
    pub volume: Option<u64>,

    /// Capitalisation boursière
    pub market_cap: Option<f64>,
}

impl Quote {
    /// Construit une cotation à partir du prix courant et de la clôture précédente
    ///
    /// CONCEPT : Valeurs dérivées
    /// - change et change_percent sont calculés ici, une fois pour toutes
    /// - Une clôture précédente nulle donne une variation de 0%
    pub fn new(symbol: String, name: String, price: f64, previous_close: f64) -> Self {
        let change = price - previous_close;
        let change_percent = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Self {
            symbol,
            name,
            price,
            change,
            change_percent,
            open: None,
            high: None,
            low: None,
            volume: None,
            market_cap: None,
        }
    }

    /// Retourne true si la séance est en hausse (ou stable)
    pub fn is_positive(&self) -> bool {
        self.change >= 0.0
    }

    /// Formatte la variation pour l'affichage
    ///
    /// Format : "▲ +1.25 (+0.68%)"
    pub fn change_label(&self) -> String {
        let arrow = if self.is_positive() { "▲" } else { "▼" };
        format!("{} {:+.2} ({:+.2}%)", arrow, self.change, self.change_percent)
    }
}

/// Formatte un grand nombre de manière compacte (volume, capitalisation)
///
/// Exemples : 2_450_000_000_000 -> "2.45T", 53_200_000 -> "53.20M"
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.0}", value)
    }
}

// ============================================================================
// Tests
// ============================================================================
