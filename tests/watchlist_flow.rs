// ============================================================================
// Test d'intégration : cycle complet de la watchlist
// ============================================================================
// Charge -> ticks du poller -> cotations -> événements -> ajout / retrait,
// sans réseau : les résultats du worker sont simulés
// ============================================================================

use tickerwatch::app::App;
use tickerwatch::detector::EventDetector;
use tickerwatch::models::{CardState, EventCategory, Quote, MAX_EVENTS};
use tickerwatch::storage::{FileStore, KeyValueStore, MemoryStore, Watchlist, WATCHLIST_KEY};

fn quote(symbol: &str, price: f64, previous_close: f64) -> Quote {
    Quote::new(symbol.to_string(), format!("{} Corp", symbol), price, previous_close)
}

fn messages(app: &App) -> Vec<String> {
    app.events.iter().map(|e| e.message.clone()).collect()
}

#[test]
fn test_polling_cycle_emits_events() {
    let mut app = App::new(Watchlist::new(Box::new(MemoryStore::new())), EventDetector::default());
    let to_fetch = app.load_watchlist();
    assert_eq!(to_fetch, vec!["AAPL", "TSLA", "RKLB"]);

    // Premier passage : pas de prix précédent, seule la règle du jour peut sortir
    app.apply_quote(quote("AAPL", 100.0, 99.0));
    app.apply_quote(quote("TSLA", 200.0, 220.0)); // -9.09% aujourd'hui
    app.apply_quote(quote("RKLB", 20.0, 20.0));
    assert_eq!(messages(&app)[0], "TSLA is down 9.09% today!");

    // Tick : un seul événement "Data refreshed"
    let before = app.events.len();
    let to_fetch = app.on_poll_tick();
    assert_eq!(to_fetch.len(), 3);
    assert_eq!(app.events.len(), before + 1);

    app.apply_quote(quote("AAPL", 102.0, 99.0)); // +2% depuis le poll précédent
    app.apply_quote(quote("RKLB", 19.9, 20.0)); // -0.5%, rien

    let log = messages(&app);
    assert_eq!(log[0], "AAPL jumped 2.00% to $102.00");
    assert_eq!(log[1], "Data refreshed");
    assert_eq!(app.events.latest().unwrap().category, EventCategory::PriceJump);
    assert_eq!(app.previous_prices.get("RKLB"), Some(19.9));
}

#[test]
fn test_add_remove_and_duplicates() {
    let mut app = App::new(Watchlist::new(Box::new(MemoryStore::new())), EventDetector::default());
    app.load_watchlist();

    assert_eq!(app.add_symbol("msft"), Some("MSFT".to_string()));
    assert_eq!(app.add_symbol("MSFT "), None);
    assert_eq!(app.watchlist.symbols(), &["AAPL", "TSLA", "RKLB", "MSFT"]);
    assert_eq!(app.on_poll_tick(), vec!["AAPL", "TSLA", "RKLB", "MSFT"]);

    app.apply_quote(quote("MSFT", 400.0, 400.0));
    app.remove_symbol("MSFT");

    assert_eq!(app.previous_prices.get("MSFT"), None);
    assert_eq!(app.on_poll_tick(), vec!["AAPL", "TSLA", "RKLB"]);
}

#[test]
fn test_failed_symbol_does_not_affect_others() {
    let mut app = App::new(Watchlist::new(Box::new(MemoryStore::new())), EventDetector::default());
    app.load_watchlist();

    app.apply_quote_error("TSLA", "No data found, symbol may be delisted");
    app.apply_quote(quote("AAPL", 100.0, 100.0));

    assert!(matches!(app.cards[1].state, CardState::Failed(_)));
    assert!(matches!(app.cards[0].state, CardState::Loaded(_)));

    // Le symbole en échec reste pollé
    assert!(app.on_poll_tick().contains(&"TSLA".to_string()));
}

#[test]
fn test_event_log_never_exceeds_cap() {
    let mut app = App::new(Watchlist::new(Box::new(MemoryStore::new())), EventDetector::default());
    app.load_watchlist();

    let mut price = 100.0;
    for _ in 0..50 {
        price *= 1.02;
        app.apply_quote(quote("AAPL", price, 100.0));
        assert!(app.events.len() <= MAX_EVENTS);
    }
    assert_eq!(app.events.len(), MAX_EVENTS);
}

#[test]
fn test_watchlist_survives_restart() {
    let dir = std::env::temp_dir().join(format!("tickerwatch-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    {
        let mut app = App::new(Watchlist::new(Box::new(FileStore::new(&dir))), EventDetector::default());
        app.load_watchlist();
        app.add_symbol("nvda");
        app.remove_symbol("TSLA");
    }

    let store = FileStore::new(&dir);
    assert_eq!(
        store.get(WATCHLIST_KEY).unwrap().as_deref(),
        Some(r#"["AAPL","RKLB","NVDA"]"#)
    );

    let mut app = App::new(Watchlist::new(Box::new(store)), EventDetector::default());
    assert_eq!(app.load_watchlist(), vec!["AAPL", "RKLB", "NVDA"]);

    let _ = std::fs::remove_dir_all(&dir);
}
