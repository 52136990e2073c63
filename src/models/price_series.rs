// ============================================================================
// Structure : PriceSeries
// ============================================================================
// Historique de clôtures pour le graphique ligne (labels + données alignés)
//
// CONCEPTS RUST :
// 1. zip : parcourir deux tableaux parallèles sans indexation manuelle
// 2. Option<f64> : les clôtures manquantes arrivent en null dans le JSON
// ============================================================================

use anyhow::{Context, Result};
use chrono::DateTime;

/// Série de prix indexée par des labels de date
///
/// Invariant : labels.len() == data.len(), labels[i] correspond à data[i]
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl PriceSeries {
    /// Construit la série depuis les tableaux parallèles timestamps / clôtures
    ///
    /// CONCEPT : Filtrage en gardant l'alignement
    /// - On filtre les paires (timestamp, prix), jamais un tableau seul
    /// - Une clôture null (ou absente) élimine la paire entière
    pub fn from_parallel(symbol: &str, timestamps: &[i64], closes: &[Option<f64>]) -> Result<Self> {
        let mut labels = Vec::with_capacity(timestamps.len());
        let mut data = Vec::with_capacity(timestamps.len());

        for (&timestamp, close) in timestamps.iter().zip(closes.iter()) {
            if let Some(price) = *close {
                labels.push(date_label(timestamp)?);
                data.push(price);
            }
        }

        Ok(Self {
            symbol: symbol.to_string(),
            labels,
            data,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bornes (min, max) des prix, None si la série est vide
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().fold((f64::MAX, f64::MIN), |(min, max), &p| {
            (min.min(p), max.max(p))
        }))
    }

    /// Variation en % entre le premier et le dernier point
    pub fn total_change_percent(&self) -> Option<f64> {
        let first = *self.data.first()?;
        let last = *self.data.last()?;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

/// Convertit un timestamp Unix (secondes) en label "Mon D, YYYY"
///
/// Les timestamps journaliers tombent à l'ouverture du marché US, on formate en UTC.
pub fn date_label(timestamp: i64) -> Result<String> {
    let datetime = DateTime::from_timestamp(timestamp, 0)
        .with_context(|| format!("Timestamp invalide : {}", timestamp))?;
    Ok(datetime.format("%b %-d, %Y").to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-01-02 .. 2025-01-08, 14:30 UTC (ouverture NYSE)
    const TIMESTAMPS: [i64; 5] = [1735828200, 1735914600, 1736173800, 1736260200, 1736346600];

    #[test]
    fn test_date_label() {
        assert_eq!(date_label(1735828200).unwrap(), "Jan 2, 2025");
        assert_eq!(date_label(1736173800).unwrap(), "Jan 6, 2025");
    }

    #[test]
    fn test_null_price_dropped_and_aligned() {
        let closes = [Some(10.0), Some(11.0), None, Some(12.5), Some(12.0)];
        let series = PriceSeries::from_parallel("RKLB", &TIMESTAMPS, &closes).unwrap();

        assert_eq!(series.labels.len(), 4);
        assert_eq!(series.data.len(), 4);
        assert_eq!(series.data, vec![10.0, 11.0, 12.5, 12.0]);
        // Le label du 3e point est celui du 4e timestamp (Jan 7), pas Jan 6
        assert_eq!(series.labels[2], "Jan 7, 2025");
    }

    #[test]
    fn test_short_closes_array() {
        let closes = [Some(10.0), Some(11.0)];
        let series = PriceSeries::from_parallel("RKLB", &TIMESTAMPS, &closes).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_bounds_and_change() {
        let closes = [Some(10.0), Some(8.0), Some(15.0)];
        let series = PriceSeries::from_parallel("RKLB", &TIMESTAMPS[..3], &closes).unwrap();
        assert_eq!(series.bounds(), Some((8.0, 15.0)));
        assert!((series.total_change_percent().unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::from_parallel("RKLB", &[], &[]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.bounds(), None);
        assert_eq!(series.total_change_percent(), None);
    }
}
