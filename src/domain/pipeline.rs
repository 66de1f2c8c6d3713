//! Pipeline settings and the pure signal → ledger stages.

use crate::domain::market::{Interval, Lookback};
use crate::domain::price::CloseTable;
use crate::domain::signal::{calculate_signals, SignalSeries, DEFAULT_SMA_WINDOW};
use crate::domain::trade::{build_ledger, Trade, TradeParams};
use crate::domain::universe::default_tickers;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DB_PATH: &str = "portfolio.db";

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Yahoo,
    Csv(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{other}' (expected sqlite or memory)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub tickers: Vec<String>,
    pub source: DataSource,
    pub lookback: Lookback,
    pub interval: Interval,
    pub window: usize,
    pub trade: TradeParams,
    pub storage: StorageBackend,
    pub db_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            source: DataSource::Yahoo,
            lookback: Lookback::Years(1),
            interval: Interval::Daily,
            window: DEFAULT_SMA_WINDOW,
            trade: TradeParams::default(),
            storage: StorageBackend::Sqlite,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

/// Signal series for each configured ticker, in configured order.
pub fn build_signal_series(table: &CloseTable, tickers: &[String], window: usize) -> Vec<SignalSeries> {
    tickers
        .iter()
        .map(|ticker| calculate_signals(ticker, &table.series(ticker), window))
        .collect()
}

pub fn generate_ledger(table: &CloseTable, config: &PipelineConfig) -> Vec<Trade> {
    let series = build_signal_series(table, &config.tickers, config.window);
    build_ledger(&series, &config.trade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn column(prices: &[f64]) -> Vec<(NaiveDate, Option<f64>)> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                (
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                    Some(p),
                )
            })
            .collect()
    }

    #[test]
    fn defaults_match_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.tickers, vec!["RR.L", "AML.L", "TSCO.L"]);
        assert_eq!(config.window, 20);
        assert_eq!(config.lookback, Lookback::Years(1));
        assert_eq!(config.interval, Interval::Daily);
        assert_eq!(config.trade.quantity, 1000);
        assert_eq!(config.trade.commission, 5.0);
        assert_eq!(config.db_path, PathBuf::from("portfolio.db"));
    }

    #[test]
    fn storage_backend_parse() {
        assert_eq!("SQLite".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn ledger_follows_configured_ticker_order() {
        let table = CloseTable::from_columns(vec![
            ("A".into(), column(&[10.0, 12.0, 10.0])),
            ("B".into(), column(&[5.0, 6.0, 4.0])),
        ]);
        let config = PipelineConfig {
            tickers: vec!["B".into(), "A".into(), "MISSING".into()],
            window: 2,
            ..PipelineConfig::default()
        };

        let ledger = generate_ledger(&table, &config);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].ticker, "B");
        assert_eq!(ledger[0].trade_id, 1);
        assert_eq!(ledger[1].ticker, "A");
        assert_eq!(ledger[1].trade_id, 2);
    }

    #[test]
    fn series_per_ticker() {
        let table = CloseTable::from_columns(vec![("A".into(), column(&[1.0, 2.0]))]);
        let series = build_signal_series(&table, &["A".to_string(), "B".to_string()], 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].states.len(), 2);
        assert!(series[1].states.is_empty());
    }
}
