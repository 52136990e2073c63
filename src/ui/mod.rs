// ============================================================================
// Module : ui
// ============================================================================
// Rendu de l'interface : un pur "sink", aucune logique métier ici
// ============================================================================

pub mod chart;     // Graphique ligne 1 an
pub mod dashboard; // Cartes + journal + footer
pub mod events;    // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
