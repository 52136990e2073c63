// ============================================================================
// API Client : Yahoo Finance (endpoint chart)
// ============================================================================
// Récupère une cotation du jour ou un historique 1 an pour un symbole
//
// Deux façons d'échouer, fusionnées en un seul message (anyhow::Error) :
// - transport / statut HTTP hors 2xx
// - erreur décrite dans le payload (chart.error.description) malgré un HTTP 200
//
// CONCEPTS RUST :
// 1. async/await : la requête ne bloque pas le worker
// 2. Serde : structures qui collent au JSON, champs optionnels en Option<T>
// 3. Parsing séparé du réseau : testable sans connexion
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{PriceSeries, Quote};

/// User-Agent de navigateur : Yahoo bloque les clients sans User-Agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================
// {
//   "chart": {
//     "result": [{ "meta": {...}, "timestamp": [...],
//                  "indicators": { "quote": [{ "open": [...], ... }] } }],
//     "error": null | { "code": "...", "description": "..." }
//   }
// }
// ============================================================================

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Métadonnées du ticker
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")] // "regularMarketPrice" -> regular_market_price
struct Meta {
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

/// Tableaux parallèles OHLCV, avec des null possibles
#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

// ============================================================================
// Sélecteur de période
// ============================================================================

/// Période / granularité demandée à l'endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRange {
    /// Séance du jour (cartes de la watchlist)
    OneDay,
    /// Un an de clôtures journalières (graphique)
    OneYear,
}

impl ChartRange {
    pub fn range(&self) -> &'static str {
        match self {
            ChartRange::OneDay => "1d",
            ChartRange::OneYear => "1y",
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client de l'endpoint chart
///
/// CONCEPT : un seul reqwest::Client partagé
/// - Clone est peu coûteux (Arc interne), chaque tâche du worker en prend un
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    /// Crée un client pointant sur `base_url` (ex: "https://query1.finance.yahoo.com")
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Construit l'URL de l'endpoint chart
    pub fn chart_url(&self, symbol: &str, range: ChartRange) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url,
            symbol,
            range.range()
        )
    }

    /// Récupère la cotation du jour d'un symbole
    ///
    /// Le symbole doit déjà être normalisé (trim + majuscules) par l'appelant.
    #[instrument(skip(self))]
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let response = self.get_chart(symbol, ChartRange::OneDay).await?;
        let quote = parse_quote(symbol, response)?;
        info!(price = quote.price, change_percent = quote.change_percent, "Quote fetched");
        Ok(quote)
    }

    /// Récupère un an de clôtures journalières
    #[instrument(skip(self))]
    pub async fn fetch_price_history(&self, symbol: &str) -> Result<PriceSeries> {
        let response = self.get_chart(symbol, ChartRange::OneYear).await?;
        let series = parse_history(symbol, response)?;
        info!(points = series.len(), "Price history fetched");
        Ok(series)
    }

    /// Effectue la requête et désérialise le JSON
    ///
    /// Pas de retry : le prochain tick du poller est la seule reprise.
    async fn get_chart(&self, symbol: &str, range: ChartRange) -> Result<YahooResponse> {
        if symbol.is_empty() {
            anyhow::bail!("Empty symbol");
        }

        let url = self.chart_url(symbol, range);
        debug!(url = %url, "Sending HTTP request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch data for {}", symbol))?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "Quote endpoint returned error status");
            anyhow::bail!("Failed to fetch data for {} (HTTP {})", symbol, status);
        }

        response
            .json::<YahooResponse>()
            .await
            .with_context(|| format!("Invalid response for {}", symbol))
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Extrait le premier résultat, ou l'erreur décrite dans le payload
fn first_result(symbol: &str, response: YahooResponse) -> Result<ChartResult> {
    if let Some(err) = response.chart.error {
        warn!(ticker = %symbol, code = ?err.code, "Payload carries an error");
        anyhow::bail!(
            "{}",
            err.description.unwrap_or_else(|| format!("Unknown error for {}", symbol))
        );
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .with_context(|| format!("No data returned for {}", symbol))
}

/// Convertit la réponse "séance du jour" en Quote
fn parse_quote(symbol: &str, response: YahooResponse) -> Result<Quote> {
    let result = first_result(symbol, response)?;
    let meta = result.meta;

    let price = meta
        .regular_market_price
        .with_context(|| format!("No price available for {}", symbol))?;

    // Sans clôture précédente, la variation du jour vaut 0
    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .unwrap_or(price);

    let name = meta
        .short_name
        .or(meta.long_name)
        .unwrap_or_else(|| symbol.to_string());

    let block = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut quote = Quote::new(symbol.to_string(), name, price, previous_close);
    quote.open = block.open.iter().flatten().copied().next();
    quote.high = block.high.iter().flatten().copied().reduce(f64::max);
    quote.low = block.low.iter().flatten().copied().reduce(f64::min);
    quote.volume = block.volume.last().copied().flatten();
    quote.market_cap = meta.market_cap;

    Ok(quote)
}

/// Convertit la réponse "1 an" en série de prix alignée
fn parse_history(symbol: &str, response: YahooResponse) -> Result<PriceSeries> {
    let result = first_result(symbol, response)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let block = result.indicators.quote.into_iter().next().unwrap_or_default();

    let series = PriceSeries::from_parallel(symbol, &timestamps, &block.close)?;

    let skipped = timestamps.len().saturating_sub(series.len());
    if skipped > 0 {
        warn!(ticker = %symbol, skipped, total = timestamps.len(), "Skipped points with missing close");
    }

    Ok(series)
}

// ============================================================================
// Tests unitaires
// ============================================================================
