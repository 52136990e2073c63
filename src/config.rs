// ============================================================================
// Configuration
// ============================================================================
// Valeurs par défaut + surcharge via variables d'environnement
//
// Variables reconnues :
// - TICKERWATCH_POLL_SECS : période du poller en secondes (défaut 30)
// - TICKERWATCH_BASE_URL  : base de l'API chart (défaut Yahoo Finance)
// - TICKERWATCH_DATA_DIR  : répertoire de la watchlist persistée
// - TICKERWATCH_JUMP_PCT  : seuil de variation entre deux polls (défaut 1.0)
// - TICKERWATCH_SWING_PCT : seuil de variation journalière (défaut 5.0)
// ============================================================================

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// URL de base de l'API Yahoo Finance
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Période du poller par défaut
pub const DEFAULT_POLL_SECS: u64 = 30;

/// Symboles ajoutés au premier lancement
pub const DEFAULT_SYMBOLS: [&str; 3] = ["AAPL", "TSLA", "RKLB"];

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Période entre deux ticks du poller
    pub poll_interval: Duration,

    /// Base de l'API (sans slash final)
    pub base_url: String,

    /// Répertoire du key/value store
    pub data_dir: PathBuf,

    /// Seuil (en %) de la règle "momentum" entre deux polls
    pub jump_threshold_pct: f64,

    /// Seuil (en %) de la règle "variation du jour"
    pub swing_threshold_pct: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            jump_threshold_pct: 1.0,
            swing_threshold_pct: 5.0,
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement du process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration via une fonction de lookup
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - Permet de tester sans toucher aux vraies variables d'environnement
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "TICKERWATCH_POLL_SECS")? {
            if secs == 0 {
                anyhow::bail!("TICKERWATCH_POLL_SECS doit être supérieur à 0");
            }
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Some(url) = lookup("TICKERWATCH_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(dir) = lookup("TICKERWATCH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(pct) = parse_var::<f64, _>(&lookup, "TICKERWATCH_JUMP_PCT")? {
            config.jump_threshold_pct = pct;
        }

        if let Some(pct) = parse_var::<f64, _>(&lookup, "TICKERWATCH_SWING_PCT")? {
            config.swing_threshold_pct = pct;
        }

        Ok(config)
    }
}

/// Parse une variable optionnelle, erreur avec contexte si la valeur est invalide
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("Valeur invalide pour {} : {:?}", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Répertoire de données par défaut
///
/// - Linux : ~/.local/share/tickerwatch
/// - macOS : ~/Library/Application Support/tickerwatch
/// - Fallback : ./data
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tickerwatch"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.jump_threshold_pct, 1.0);
        assert_eq!(config.swing_threshold_pct, 5.0);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TICKERWATCH_POLL_SECS", "10"),
            ("TICKERWATCH_BASE_URL", "http://localhost:8080/"),
            ("TICKERWATCH_DATA_DIR", "/tmp/tw"),
            ("TICKERWATCH_SWING_PCT", "3.5"),
        ]))
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tw"));
        assert_eq!(config.swing_threshold_pct, 3.5);
        assert_eq!(config.jump_threshold_pct, 1.0);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("TICKERWATCH_POLL_SECS", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("TICKERWATCH_POLL_SECS"));
    }

    #[test]
    fn test_zero_poll_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("TICKERWATCH_POLL_SECS", "0")])).is_err());
    }
}
