// ============================================================================
// Gestion des événements clavier
// ============================================================================
// Lit les événements du terminal et fournit des helpers pour les identifier
//
// CONCEPTS RUST :
// 1. Enums avec variants : Key(KeyEvent) ou Tick
// 2. Non-blocking I/O avec timeout : poll() puis read()
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Pas d'entrée pendant le timeout : l'event loop en profite pour
    /// vider les résultats du worker
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    timeout: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un timeout de 250ms
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant au plus `timeout`)
    ///
    /// Seuls les Press sont gardés : sur certains OS on reçoit aussi Release.
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.timeout)? {
            match event::read()? {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                // Release, resize, souris : ignorés
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : identifier les touches
// ============================================================================

/// Extrait le KeyCode d'un événement clavier
fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_space_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char(' ')))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    )
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    )
}

/// 'a' : ajouter un symbole
pub fn is_add_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('a') | KeyCode::Char('A')))
}

/// 'd' : retirer le symbole sélectionné (avec confirmation)
pub fn is_delete_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('d') | KeyCode::Char('D')))
}

/// 'r' : recharger le graphique
pub fn is_reload_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Caractère valide dans un symbole : alphanumérique, '-', '.', '^', '='
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '^' | '=')
    )
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_navigation_keys() {
        assert!(is_up_event(&key(KeyCode::Up)));
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Char('j'))));
        assert!(!is_down_event(&key(KeyCode::Up)));
    }

    #[test]
    fn test_ticker_chars() {
        assert!(is_ticker_char_event(&key(KeyCode::Char('b'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('-'))));
        assert!(is_ticker_char_event(&key(KeyCode::Char('^'))));
        assert!(!is_ticker_char_event(&key(KeyCode::Char(' '))));
        assert!(!is_ticker_char_event(&key(KeyCode::Char('é'))));
        assert_eq!(get_char_from_event(&key(KeyCode::Char('x'))), Some('x'));
        assert_eq!(get_char_from_event(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_reload_event() {
        assert!(is_reload_event(&key(KeyCode::Char('r'))));
        assert!(!is_reload_event(&Event::Tick));
    }
}
