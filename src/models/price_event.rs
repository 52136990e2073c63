// ============================================================================
// Structures : PriceEvent et EventLog
// ============================================================================
// Journal des événements affichés sous la watchlist
//
// CONCEPTS RUST :
// 1. VecDeque : insertion en tête en O(1), éviction en queue
// 2. DateTime<Local> : horodatage dans le fuseau de l'utilisateur
// ============================================================================

use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Nombre maximum d'événements conservés
pub const MAX_EVENTS: usize = 20;

/// Catégorie d'un événement (détermine la couleur à l'affichage)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    /// Information (rafraîchissement, ajout, doublon...)
    Info,
    /// Hausse significative
    PriceJump,
    /// Baisse significative
    PriceDrop,
    /// Échec d'un fetch ou de la persistance
    Error,
}

impl EventCategory {
    /// Catégorie d'un mouvement de prix selon son signe
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            EventCategory::PriceJump
        } else {
            EventCategory::PriceDrop
        }
    }

    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Info => "INFO",
            EventCategory::PriceJump => "JUMP",
            EventCategory::PriceDrop => "DROP",
            EventCategory::Error => "ERROR",
        }
    }
}

/// Un événement horodaté
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEvent {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub category: EventCategory,
}

impl PriceEvent {
    /// Crée un événement horodaté maintenant
    pub fn new(message: impl Into<String>, category: EventCategory) -> Self {
        Self::at(Local::now(), message, category)
    }

    /// Crée un événement avec un horodatage explicite
    pub fn at(timestamp: DateTime<Local>, message: impl Into<String>, category: EventCategory) -> Self {
        Self {
            timestamp,
            message: message.into(),
            category,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, EventCategory::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, EventCategory::Error)
    }

    /// Heure de l'événement, ex: "14:05:32"
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Journal borné, du plus récent au plus ancien
///
/// CONCEPT : Append-only avec éviction
/// - push() insère en tête
/// - Au-delà de la capacité, le plus ancien (en queue) est supprimé
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<PriceEvent>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Ajoute un événement en tête et évince le plus ancien si besoin
    pub fn push(&mut self, event: PriceEvent) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
    }

    /// Itère du plus récent au plus ancien
    pub fn iter(&self) -> impl Iterator<Item = &PriceEvent> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&PriceEvent> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
