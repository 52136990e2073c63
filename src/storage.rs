// ============================================================================
// Watchlist persistée
// ============================================================================
// Une liste ordonnée de symboles, sans doublons, stockée sous une seule clé
// d'un key/value store (un fichier JSON par clé sur disque).
//
// CONCEPTS RUST :
// 1. Trait object (Box<dyn KeyValueStore>) : disque en prod, mémoire en test
// 2. Enum de résultat (AddOutcome) au lieu d'un bool ambigu
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_SYMBOLS;

/// Clé de la watchlist dans le store
pub const WATCHLIST_KEY: &str = "watchlist";

// ============================================================================
// Trait : KeyValueStore
// ============================================================================

/// Stockage clé/valeur de chaînes, hors mémoire du process
pub trait KeyValueStore: Send {
    /// Lit une valeur, Ok(None) si la clé n'existe pas
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Écrase la valeur associée à la clé
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store sur disque : <dir>/<key>.json
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Échec de la création de {}", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("Échec de l'écriture de {}", path.display()))?;
        debug!(path = %path.display(), "Store entry written");
        Ok(())
    }
}

/// Store en mémoire (tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Structure : Watchlist
// ============================================================================

/// Résultat d'un ajout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Symbole ajouté (forme normalisée)
    Added(String),
    /// Déjà présent, rien n'a changé
    AlreadyPresent(String),
    /// Saisie vide après normalisation
    Empty,
}

/// Résultat d'un chargement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Premier lancement : symboles par défaut écrits dans le store
    Seeded,
    /// Liste restaurée telle quelle
    Restored,
}

/// Normalise une saisie utilisateur : trim + majuscules
pub fn normalize_symbol(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Watchlist ordonnée (ordre d'insertion) et persistée
pub struct Watchlist {
    symbols: Vec<String>,
    store: Box<dyn KeyValueStore>,
}

impl Watchlist {
    /// Crée une watchlist vide adossée au store (appeler load() ensuite)
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            symbols: Vec::new(),
            store,
        }
    }

    /// Charge la liste persistée, ou l'initialise avec les symboles par défaut
    ///
    /// Si l'entrée existe mais est illisible, la liste démarre sur les défauts
    /// SANS écraser le fichier, et l'erreur est remontée à l'appelant.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        match self.store.get(WATCHLIST_KEY)? {
            Some(raw) => {
                let parsed: Result<Vec<String>> = serde_json::from_str(&raw)
                    .context("Watchlist persistée illisible (JSON invalide)");
                match parsed {
                    Ok(symbols) => {
                        info!(count = symbols.len(), "Watchlist restored");
                        self.symbols = symbols;
                        Ok(LoadOutcome::Restored)
                    }
                    Err(e) => {
                        warn!(error = ?e, "Falling back to default watchlist");
                        self.symbols = default_symbols();
                        Err(e)
                    }
                }
            }
            None => {
                info!("No persisted watchlist, seeding defaults");
                self.symbols = default_symbols();
                self.persist()?;
                Ok(LoadOutcome::Seeded)
            }
        }
    }

    /// Ajoute un symbole (normalisé) s'il n'est pas déjà présent
    ///
    /// En cas d'échec de persistance, le symbole reste ajouté en mémoire et
    /// l'erreur est retournée.
    pub fn add(&mut self, input: &str) -> Result<AddOutcome> {
        let symbol = normalize_symbol(input);
        if symbol.is_empty() {
            return Ok(AddOutcome::Empty);
        }
        if self.contains(&symbol) {
            return Ok(AddOutcome::AlreadyPresent(symbol));
        }

        self.symbols.push(symbol.clone());
        self.persist()?;
        Ok(AddOutcome::Added(symbol))
    }

    /// Retire un symbole et persiste la liste (même s'il était absent)
    ///
    /// Retourne true si le symbole faisait partie de la liste.
    pub fn remove(&mut self, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol);
        let before = self.symbols.len();
        self.symbols.retain(|s| !s.trim().eq_ignore_ascii_case(&symbol));
        let removed = self.symbols.len() != before;
        self.persist()?;
        Ok(removed)
    }

    /// Comparaison insensible à la casse : une entrée restaurée en
    /// minuscules ("msft") compte comme "MSFT"
    pub fn contains(&self, symbol: &str) -> bool {
        let symbol = normalize_symbol(symbol);
        self.symbols.iter().any(|s| s.trim().eq_ignore_ascii_case(&symbol))
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Écrase l'entrée persistée avec la liste courante
    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.symbols).context("Échec de la sérialisation de la watchlist")?;
        self.store.set(WATCHLIST_KEY, &raw)
    }

    /// Lit l'entrée brute du store (tests et diagnostic)
    pub fn persisted_raw(&self) -> Result<Option<String>> {
        self.store.get(WATCHLIST_KEY)
    }
}

fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_watchlist() -> Watchlist {
        let mut watchlist = Watchlist::new(Box::new(MemoryStore::new()));
        watchlist.load().unwrap();
        watchlist
    }

    #[test]
    fn test_first_load_seeds_defaults() {
        let mut watchlist = Watchlist::new(Box::new(MemoryStore::new()));

        assert_eq!(watchlist.load().unwrap(), LoadOutcome::Seeded);
        assert_eq!(watchlist.symbols(), &["AAPL", "TSLA", "RKLB"]);
        assert_eq!(
            watchlist.persisted_raw().unwrap().as_deref(),
            Some(r#"["AAPL","TSLA","RKLB"]"#)
        );
    }

    #[test]
    fn test_load_restores_verbatim() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, r#"["NVDA","msft"]"#).unwrap();
        let mut watchlist = Watchlist::new(Box::new(store));

        assert_eq!(watchlist.load().unwrap(), LoadOutcome::Restored);
        assert_eq!(watchlist.symbols(), &["NVDA", "msft"]);
    }

    #[test]
    fn test_restored_lowercase_entry_matches_case_insensitively() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, r#"["msft"]"#).unwrap();
        let mut watchlist = Watchlist::new(Box::new(store));
        watchlist.load().unwrap();

        assert!(watchlist.contains("MSFT"));
        assert_eq!(
            watchlist.add("msft").unwrap(),
            AddOutcome::AlreadyPresent("MSFT".to_string())
        );
        assert_eq!(watchlist.symbols(), &["msft"]);

        assert!(watchlist.remove("msft").unwrap());
        assert!(watchlist.is_empty());
        assert_eq!(watchlist.persisted_raw().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_load_empty_list_is_not_reseeded() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, "[]").unwrap();
        let mut watchlist = Watchlist::new(Box::new(store));

        assert_eq!(watchlist.load().unwrap(), LoadOutcome::Restored);
        assert!(watchlist.is_empty());
    }

    #[test]
    fn test_load_corrupt_entry() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, "not json").unwrap();
        let mut watchlist = Watchlist::new(Box::new(store));

        assert!(watchlist.load().is_err());
        assert_eq!(watchlist.len(), 3);
        // Le fichier n'est pas écrasé
        assert_eq!(watchlist.persisted_raw().unwrap().as_deref(), Some("not json"));
    }

    #[test]
    fn test_add_normalizes_and_persists() {
        let mut watchlist = loaded_watchlist();

        assert_eq!(watchlist.add("  nvda ").unwrap(), AddOutcome::Added("NVDA".to_string()));
        assert_eq!(watchlist.symbols().last().unwrap(), "NVDA");
        assert!(watchlist.persisted_raw().unwrap().unwrap().contains("\"NVDA\""));
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut watchlist = loaded_watchlist();
        let before = watchlist.persisted_raw().unwrap();

        assert_eq!(
            watchlist.add("aapl").unwrap(),
            AddOutcome::AlreadyPresent("AAPL".to_string())
        );
        assert_eq!(watchlist.len(), 3);
        assert_eq!(watchlist.persisted_raw().unwrap(), before);
    }

    #[test]
    fn test_add_empty() {
        let mut watchlist = loaded_watchlist();
        assert_eq!(watchlist.add("   ").unwrap(), AddOutcome::Empty);
        assert_eq!(watchlist.len(), 3);
    }

    #[test]
    fn test_remove_persists() {
        let mut watchlist = loaded_watchlist();

        assert!(watchlist.remove("TSLA").unwrap());
        assert_eq!(watchlist.symbols(), &["AAPL", "RKLB"]);
        assert_eq!(
            watchlist.persisted_raw().unwrap().as_deref(),
            Some(r#"["AAPL","RKLB"]"#)
        );

        // Symbole absent : rien retiré, mais la liste est quand même écrite
        assert!(!watchlist.remove("TSLA").unwrap());
        assert_eq!(watchlist.len(), 2);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("tickerwatch-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        {
            let mut watchlist = Watchlist::new(Box::new(FileStore::new(&dir)));
            assert_eq!(watchlist.load().unwrap(), LoadOutcome::Seeded);
            watchlist.add("GME").unwrap();
        }

        let mut reloaded = Watchlist::new(Box::new(FileStore::new(&dir)));
        assert_eq!(reloaded.load().unwrap(), LoadOutcome::Restored);
        assert_eq!(reloaded.symbols(), &["AAPL", "TSLA", "RKLB", "GME"]);
        assert!(dir.join("watchlist.json").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
