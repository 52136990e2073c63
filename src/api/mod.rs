// ============================================================================
// Module : api
// ============================================================================
// Client de l'endpoint de cotations (Yahoo Finance chart)
// ============================================================================

pub mod yahoo;  // Client API Yahoo Finance

// Re-export des types principaux
pub use yahoo::{ChartRange, QuoteClient};
