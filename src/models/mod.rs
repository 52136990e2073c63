// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod price_event;    // Événements et journal borné
pub mod price_series;   // Historique 1 an pour le graphique
pub mod quote;          // Cotation aplatie
pub mod watchlist_item; // Carte du dashboard

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use tickerwatch::models::quote::Quote;
// On peut faire : use tickerwatch::models::Quote;
pub use price_event::{EventCategory, EventLog, PriceEvent, MAX_EVENTS};
pub use price_series::PriceSeries;
pub use quote::{format_compact, Quote};
pub use watchlist_item::{CardState, WatchlistItem};
