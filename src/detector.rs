// ============================================================================
// Détection des mouvements de prix
// ============================================================================
// Transforme des cotations successives en événements discrets
//
// Deux règles indépendantes :
// 1. Momentum : variation depuis le poll précédent > seuil (1% par défaut)
// 2. Variation du jour : change_percent de la cotation > seuil (5% par défaut)
//
// Les comparaisons se font en pleine précision, l'affichage à 2 décimales.
// ============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::config::Config;
use crate::models::{EventCategory, PriceEvent, Quote};

/// Dernier prix observé par symbole
///
/// Invariant : contient le prix du dernier fetch réussi, ou rien si le
/// symbole n'a jamais été fetché (ou a été retiré).
#[derive(Debug, Clone, Default)]
pub struct PreviousPriceTable {
    prices: HashMap<String, f64>,
}

impl PreviousPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    pub fn update(&mut self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_string(), price);
    }

    /// Supprime l'entrée, retourne l'ancien prix s'il existait
    pub fn remove(&mut self, symbol: &str) -> Option<f64> {
        self.prices.remove(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Détecteur d'événements paramétré par ses deux seuils
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDetector {
    /// Seuil (%) de la règle momentum
    pub jump_threshold_pct: f64,
    /// Seuil (%) de la règle variation du jour
    pub swing_threshold_pct: f64,
}

impl Default for EventDetector {
    fn default() -> Self {
        Self {
            jump_threshold_pct: 1.0,
            swing_threshold_pct: 5.0,
        }
    }
}

impl EventDetector {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jump_threshold_pct: config.jump_threshold_pct,
            swing_threshold_pct: config.swing_threshold_pct,
        }
    }

    /// Évalue une nouvelle cotation puis met à jour la table
    ///
    /// Retourne 0, 1 ou 2 événements (momentum en premier). La table est
    /// mise à jour avec le nouveau prix dans tous les cas.
    pub fn evaluate(&self, quote: &Quote, previous: &mut PreviousPriceTable) -> Vec<PriceEvent> {
        let mut events = Vec::new();

        if let Some(old_price) = previous.get(&quote.symbol) {
            let change = (quote.price - old_price) / old_price * 100.0;

            // Un ancien prix à 0 donne inf/NaN : pas de règle momentum
            if change.is_finite() && change.abs() > self.jump_threshold_pct {
                let verb = if change > 0.0 { "jumped" } else { "dropped" };
                events.push(PriceEvent::new(
                    format!("{} {} {:.2}% to ${:.2}", quote.symbol, verb, change.abs(), quote.price),
                    EventCategory::from_change(change),
                ));
            }
        }

        if quote.change_percent.abs() > self.swing_threshold_pct {
            let direction = if quote.change_percent > 0.0 { "up" } else { "down" };
            events.push(PriceEvent::new(
                format!("{} is {} {:.2}% today!", quote.symbol, direction, quote.change_percent.abs()),
                EventCategory::from_change(quote.change_percent),
            ));
        }

        previous.update(&quote.symbol, quote.price);

        if !events.is_empty() {
            debug!(ticker = %quote.symbol, count = events.len(), "Price events detected");
        }

        events
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Cotation avec une variation du jour donnée
    fn quote(symbol: &str, price: f64, change_percent: f64) -> Quote {
        let mut quote = Quote::new(symbol.to_string(), symbol.to_string(), price, price);
        quote.change_percent = change_percent;
        quote
    }

    #[test]
    fn test_jump_fires_above_threshold() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        table.update("X", 100.0);

        let events = detector.evaluate(&quote("X", 102.0, 0.5), &mut table);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "X jumped 2.00% to $102.00");
        assert_eq!(events[0].category, EventCategory::PriceJump);
    }

    #[test]
    fn test_exact_threshold_does_not_fire() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        table.update("X", 100.0);

        let events = detector.evaluate(&quote("X", 99.0, 0.0), &mut table);

        assert!(events.is_empty());
        assert_eq!(table.get("X"), Some(99.0));
    }

    #[test]
    fn test_drop_fires() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        table.update("X", 100.0);

        let events = detector.evaluate(&quote("X", 97.5, 0.0), &mut table);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "X dropped 2.50% to $97.50");
        assert_eq!(events[0].category, EventCategory::PriceDrop);
    }

    #[test]
    fn test_daily_swing_without_previous_price() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();

        let events = detector.evaluate(&quote("X", 50.0, -6.5), &mut table);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "X is down 6.50% today!");
        assert_eq!(events[0].category, EventCategory::PriceDrop);
        assert_eq!(table.get("X"), Some(50.0));
    }

    #[test]
    fn test_daily_swing_boundary() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();

        assert!(detector.evaluate(&quote("X", 50.0, 5.0), &mut table).is_empty());
        assert!(detector.evaluate(&quote("X", 50.0, -5.0), &mut table).is_empty());
    }

    #[test]
    fn test_both_rules_fire_together() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        table.update("X", 100.0);

        let events = detector.evaluate(&quote("X", 110.0, 7.25), &mut table);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "X jumped 10.00% to $110.00");
        assert_eq!(events[1].message, "X is up 7.25% today!");
        assert!(events.iter().all(|e| e.category == EventCategory::PriceJump));
    }

    #[test]
    fn test_rules_are_independent_in_sign() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        table.update("X", 100.0);

        // Rebond intra-journée sur une séance très négative
        let events = detector.evaluate(&quote("X", 103.0, -8.0), &mut table);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category, EventCategory::PriceJump);
        assert_eq!(events[1].category, EventCategory::PriceDrop);
    }

    #[test]
    fn test_table_tracks_latest_price_over_sequence() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        let prices = [100.0, 100.5, 103.0, 102.9, 99.0];
        let mut fired = Vec::new();

        for &p in &prices {
            fired.push(detector.evaluate(&quote("X", p, 0.0), &mut table).len());
            assert_eq!(table.get("X"), Some(p));
        }

        // 100 -> 100.5 : +0.5%, 100.5 -> 103 : +2.49%, 103 -> 102.9 : -0.1%, 102.9 -> 99 : -3.79%
        assert_eq!(fired, vec![0, 0, 1, 0, 1]);
    }

    #[test]
    fn test_zero_previous_price_skips_momentum() {
        let detector = EventDetector::default();
        let mut table = PreviousPriceTable::new();
        table.update("X", 0.0);

        let events = detector.evaluate(&quote("X", 10.0, 0.0), &mut table);

        assert!(events.is_empty());
        assert_eq!(table.get("X"), Some(10.0));
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = Config {
            jump_threshold_pct: 0.1,
            swing_threshold_pct: 1.0,
            ..Config::default()
        };
        let detector = EventDetector::from_config(&config);
        let mut table = PreviousPriceTable::new();
        table.update("X", 100.0);

        let events = detector.evaluate(&quote("X", 100.5, 1.5), &mut table);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_remove_entry() {
        let mut table = PreviousPriceTable::new();
        table.update("X", 1.0);
        assert_eq!(table.remove("X"), Some(1.0));
        assert_eq!(table.remove("X"), None);
        assert!(table.is_empty());
    }
}
