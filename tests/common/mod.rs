#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::Cell;
use std::collections::HashMap;
use tradeledger::domain::analytics::{RealizedTrade, TickerDrawdown, TickerPerformance};
use tradeledger::domain::error::LedgerError;
use tradeledger::domain::market::{Interval, Lookback};
use tradeledger::domain::pipeline::{PipelineConfig, StorageBackend};
use tradeledger::domain::trade::Trade;
use tradeledger::ports::ledger_port::LedgerPort;
use tradeledger::ports::market_data_port::{MarketDataPort, Observations};

pub struct MockMarketData {
    pub data: HashMap<String, Observations>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_closes(mut self, ticker: &str, closes: &[f64]) -> Self {
        self.data.insert(ticker.to_string(), observations(closes));
        self
    }

    pub fn with_observations(mut self, ticker: &str, obs: Observations) -> Self {
        self.data.insert(ticker.to_string(), obs);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_ticker(
        &self,
        ticker: &str,
        _lookback: Lookback,
        _interval: Interval,
    ) -> Result<Observations, LedgerError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(LedgerError::MarketData {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}

/// Ledger whose writes always fail; records whether analytics were attempted.
pub struct FailingLedger {
    pub queried: Cell<bool>,
}

impl FailingLedger {
    pub fn new() -> Self {
        Self {
            queried: Cell::new(false),
        }
    }

    fn query<T>(&self) -> Result<Vec<T>, LedgerError> {
        self.queried.set(true);
        Ok(Vec::new())
    }
}

impl LedgerPort for FailingLedger {
    fn replace_trades(&self, _trades: &[Trade]) -> Result<(), LedgerError> {
        Err(LedgerError::Database {
            reason: "disk full".into(),
        })
    }

    fn load_trades(&self) -> Result<Vec<Trade>, LedgerError> {
        self.query()
    }

    fn realized_pnl(&self) -> Result<Vec<RealizedTrade>, LedgerError> {
        self.query()
    }

    fn ticker_performance(&self) -> Result<Vec<TickerPerformance>, LedgerError> {
        self.query()
    }

    fn max_drawdown(&self) -> Result<Vec<TickerDrawdown>, LedgerError> {
        self.query()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days from 2024-01-01, one per close.
pub fn observations(closes: &[f64]) -> Observations {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| (date(2024, 1, 1) + Duration::days(i as i64), Some(c)))
        .collect()
}

/// 20 flat closes followed by `tail`.
pub fn flat_then(tail: &[f64]) -> Vec<f64> {
    let mut closes = vec![100.0; 20];
    closes.extend_from_slice(tail);
    closes
}

/// RR.L crosses up, down, up, down: BUY 120, SELL 80, BUY 130, SELL 70.
pub fn rr_closes() -> Vec<f64> {
    flat_then(&[120.0, 80.0, 130.0, 70.0])
}

/// AML.L crosses down first: SELL 80, BUY 120, SELL 70, BUY 130.
pub fn aml_closes() -> Vec<f64> {
    flat_then(&[80.0, 120.0, 70.0, 130.0])
}

pub fn mock_market() -> MockMarketData {
    MockMarketData::new()
        .with_closes("RR.L", &rr_closes())
        .with_closes("AML.L", &aml_closes())
        .with_closes("TSCO.L", &[300.0; 10])
}

pub fn memory_config() -> PipelineConfig {
    PipelineConfig {
        storage: StorageBackend::Memory,
        ..PipelineConfig::default()
    }
}

pub fn wide_csv(tickers: &[&str], columns: &[Vec<f64>]) -> String {
    let len = columns.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = format!("Date,{}\n", tickers.join(","));
    for i in 0..len {
        let day = date(2024, 1, 1) + Duration::days(i as i64);
        let cells: Vec<String> = columns
            .iter()
            .map(|c| c.get(i).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        out.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), cells.join(",")));
    }
    out
}
