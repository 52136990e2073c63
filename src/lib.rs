// ============================================================================
// TickerWatch - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;       // Client de l'API de cotations (Yahoo Finance chart)
pub mod app;       // État de l'application (contexte possédé par l'UI)
pub mod config;    // Configuration (défauts + variables d'environnement)
pub mod detector;  // Détection des mouvements de prix
pub mod models;    // Structures de données
pub mod storage;   // Watchlist persistée (key/value store)
pub mod ui;        // Interface utilisateur
pub mod worker;    // Worker async : fetchs + poller
