//! Yahoo Finance chart API adapter.

use crate::domain::error::LedgerError;
use crate::domain::market::{Interval, Lookback};
use crate::ports::market_data_port::{MarketDataPort, Observations};
use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LedgerError::MarketData {
                ticker: "*".into(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, lookback: Lookback, interval: Interval) -> String {
        format!(
            "{}/{}?range={}&interval={}",
            self.base_url, ticker, lookback, interval
        )
    }
}

/// Decodes a chart response body into dated closes.
///
/// Timestamps are shifted by the exchange's GMT offset before taking the
/// calendar date.
fn parse_chart(ticker: &str, body: &str) -> Result<Observations, LedgerError> {
    let err = |reason: String| LedgerError::MarketData {
        ticker: ticker.to_string(),
        reason,
    };

    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| err(format!("invalid chart response: {}", e)))?;

    if let Some(e) = response.chart.error {
        return Err(err(format!("{} - {}", e.code, e.description)));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| err("no chart data returned".into()))?;

    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut observations = Vec::with_capacity(data.timestamp.len());
    for (i, ts) in data.timestamp.iter().enumerate() {
        let local = DateTime::from_timestamp(ts + data.meta.gmtoffset, 0)
            .ok_or_else(|| err(format!("timestamp {} out of range", ts)))?;
        let close = closes.get(i).copied().flatten();
        observations.push((local.date_naive(), close));
    }

    Ok(observations)
}

impl MarketDataPort for YahooAdapter {
    fn fetch_ticker(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Observations, LedgerError> {
        let url = self.chart_url(ticker, lookback, interval);
        tracing::debug!(%url, "fetching chart");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| LedgerError::MarketData {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?;

        let observations = parse_chart(ticker, &body)?;
        tracing::info!(%ticker, points = observations.len(), "fetched closes");
        Ok(observations)
    }
}
