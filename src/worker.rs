// ============================================================================
// Background Worker : fetchs async + poller
// ============================================================================
// Thread séparé qui porte un runtime tokio :
// - reçoit des Command via un channel tokio (envoi non-bloquant depuis l'UI)
// - lance une tâche par fetch (fire-and-forget)
// - renvoie des WorkerEvent via un channel std (try_recv côté UI)
// - émet un WorkerEvent::PollTick à chaque période du poller
//
// Choix assumés :
// - pas d'annulation : un fetch lancé va toujours jusqu'au bout
// - pas de dé-duplication : si le fetch d'un symbole du tick précédent est
//   encore en vol, un nouveau est lancé quand même
// - l'état (App) reste dans le thread UI : le worker ne fait que du réseau
// ============================================================================

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::api::QuoteClient;
use crate::models::{PriceSeries, Quote};

/// Commandes envoyées au worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Cotation du jour pour une carte de la watchlist
    FetchQuote { symbol: String },

    /// Historique 1 an pour le graphique
    FetchHistory { symbol: String },
}

/// Résultats renvoyés au thread UI
#[derive(Debug)]
pub enum WorkerEvent {
    QuoteLoaded { quote: Quote },

    QuoteFailed { symbol: String, error: String },

    HistoryLoaded { series: PriceSeries },

    HistoryFailed { symbol: String, error: String },

    /// Un tick du poller : l'UI relance un fetch par symbole surveillé
    PollTick,
}

/// Poignée pour envoyer des commandes au worker
///
/// Dropper la poignée ferme le channel et arrête le worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    commands: tokio_mpsc::UnboundedSender<Command>,
}

impl WorkerHandle {
    pub fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            error!("Worker is gone, command dropped");
        }
    }

    pub fn fetch_quote(&self, symbol: impl Into<String>) {
        self.send(Command::FetchQuote { symbol: symbol.into() });
    }

    pub fn fetch_history(&self, symbol: impl Into<String>) {
        self.send(Command::FetchHistory { symbol: symbol.into() });
    }
}

/// Lance le worker dans un thread OS avec son propre runtime tokio
///
/// CONCEPT : Runtime per-thread
/// - Le runtime est créé ici (erreur propagée) puis déplacé dans le thread
/// - block_on() bloque le thread worker, jamais l'UI
pub fn spawn_worker(
    client: QuoteClient,
    poll_interval: Duration,
    result_tx: mpsc::Sender<WorkerEvent>,
) -> Result<(WorkerHandle, JoinHandle<()>)> {
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let (command_tx, command_rx) = tokio_mpsc::unbounded_channel();

    let join = std::thread::Builder::new()
        .name("tickerwatch-worker".to_string())
        .spawn(move || {
            runtime.block_on(run_worker(client, poll_interval, command_rx, result_tx));
            info!("Worker thread exiting (channel closed)");
        })
        .context("Échec du lancement du thread worker")?;

    Ok((WorkerHandle { commands: command_tx }, join))
}

/// Boucle du worker : commandes et ticks du poller
async fn run_worker(
    client: QuoteClient,
    poll_interval: Duration,
    mut command_rx: tokio_mpsc::UnboundedReceiver<Command>,
    result_tx: mpsc::Sender<WorkerEvent>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Le premier tick est immédiat : le chargement initial fait déjà les fetchs
    ticker.tick().await;

    loop {
        tokio::select! {
            command = command_rx.recv() => {
                let Some(command) = command else { break };
                debug!(?command, "Worker received command");
                tokio::spawn(run_command(client.clone(), command, result_tx.clone()));
            }
            _ = ticker.tick() => {
                debug!("Poll tick");
                if result_tx.send(WorkerEvent::PollTick).is_err() {
                    // L'UI est partie
                    break;
                }
            }
        }
    }
}

/// Exécute une commande et renvoie le résultat
///
/// Les erreurs ne sortent jamais de la tâche : elles deviennent un WorkerEvent.
async fn run_command(client: QuoteClient, command: Command, result_tx: mpsc::Sender<WorkerEvent>) {
    let event = match command {
        Command::FetchQuote { symbol } => match client.fetch_quote(&symbol).await {
            Ok(quote) => WorkerEvent::QuoteLoaded { quote },
            Err(e) => {
                error!(ticker = %symbol, error = ?e, "Failed to fetch quote");
                WorkerEvent::QuoteFailed {
                    symbol,
                    error: e.to_string(),
                }
            }
        },
        Command::FetchHistory { symbol } => match client.fetch_price_history(&symbol).await {
            Ok(series) => WorkerEvent::HistoryLoaded { series },
            Err(e) => {
                error!(ticker = %symbol, error = ?e, "Failed to fetch price history");
                WorkerEvent::HistoryFailed {
                    symbol,
                    error: e.to_string(),
                }
            }
        },
    };

    // L'UI peut être fermée entre-temps
    let _ = result_tx.send(event);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Client vers un port fermé : chaque fetch échoue rapidement
    fn dead_client() -> QuoteClient {
        QuoteClient::new("http://127.0.0.1:9").unwrap()
    }

    /// Attend le prochain événement qui n'est pas un PollTick
    fn next_result(rx: &mpsc::Receiver<WorkerEvent>) -> WorkerEvent {
        loop {
            match rx.recv_timeout(Duration::from_secs(10)).expect("worker result") {
                WorkerEvent::PollTick => continue,
                event => return event,
            }
        }
    }

    #[test]
    fn test_failed_quote_is_reported() {
        let (tx, rx) = mpsc::channel();
        let (handle, _join) = spawn_worker(dead_client(), Duration::from_secs(3600), tx).unwrap();

        handle.fetch_quote("AAPL");

        match next_result(&rx) {
            WorkerEvent::QuoteFailed { symbol, error } => {
                assert_eq!(symbol, "AAPL");
                assert!(!error.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_failed_history_is_reported() {
        let (tx, rx) = mpsc::channel();
        let (handle, _join) = spawn_worker(dead_client(), Duration::from_secs(3600), tx).unwrap();

        handle.fetch_history("RKLB");

        assert!(matches!(
            next_result(&rx),
            WorkerEvent::HistoryFailed { symbol, .. } if symbol == "RKLB"
        ));
    }

    #[test]
    fn test_overlapping_fetches_are_not_deduplicated() {
        let (tx, rx) = mpsc::channel();
        let (handle, _join) = spawn_worker(dead_client(), Duration::from_secs(3600), tx).unwrap();

        handle.fetch_quote("AAPL");
        handle.fetch_quote("AAPL");

        assert!(matches!(next_result(&rx), WorkerEvent::QuoteFailed { .. }));
        assert!(matches!(next_result(&rx), WorkerEvent::QuoteFailed { .. }));
    }

    #[test]
    fn test_poll_ticks_are_emitted() {
        let (tx, rx) = mpsc::channel();
        let (_handle, _join) = spawn_worker(dead_client(), Duration::from_millis(50), tx).unwrap();

        for _ in 0..2 {
            let event = rx.recv_timeout(Duration::from_secs(5)).expect("poll tick");
            assert!(matches!(event, WorkerEvent::PollTick));
        }
    }

    #[test]
    fn test_dropping_handle_stops_worker() {
        let (tx, _rx) = mpsc::channel();
        let (handle, join) = spawn_worker(dead_client(), Duration::from_secs(3600), tx).unwrap();

        drop(handle);
        join.join().expect("worker thread joined");
    }
}
