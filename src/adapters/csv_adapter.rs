//! CSV close-price adapter.
//!
//! Reads a wide table: a `date` column followed by one close column per
//! ticker. Empty and non-finite cells are missing values. The lookback is
//! measured back from the latest date in the file.

use crate::domain::error::LedgerError;
use crate::domain::market::{Interval, Lookback};
use crate::ports::market_data_port::{MarketDataPort, Observations};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    path: PathBuf,
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl CsvAdapter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| LedgerError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let headers = rdr.headers().map_err(|e| LedgerError::PriceData {
            reason: format!("CSV header error: {}", e),
        })?;
        if headers.len() < 2 {
            return Err(LedgerError::PriceData {
                reason: format!(
                    "{} needs a date column and at least one ticker column",
                    path.display()
                ),
            });
        }
        let tickers: Vec<String> = headers
            .iter()
            .skip(1)
            .map(|h| h.trim().to_uppercase())
            .collect();
        let mut seen = HashSet::new();
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(LedgerError::PriceData {
                    reason: format!("{}: duplicate column for {}", path.display(), ticker),
                });
            }
        }

        let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| LedgerError::PriceData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| LedgerError::PriceData {
                reason: format!("row {}: missing date column", line + 2),
            })?;
            let date = parse_date(date_str).ok_or_else(|| LedgerError::PriceData {
                reason: format!("row {}: invalid date '{}'", line + 2, date_str),
            })?;

            let mut closes = Vec::with_capacity(tickers.len());
            for (col, ticker) in tickers.iter().enumerate() {
                let cell = record.get(col + 1).unwrap_or("");
                let close = parse_close(cell).map_err(|e| LedgerError::PriceData {
                    reason: format!("row {}: invalid close for {}: {}", line + 2, ticker, e),
                })?;
                closes.push(close);
            }
            rows.push((date, closes));
        }

        rows.sort_by_key(|(date, _)| *date);

        let dates = rows.iter().map(|(date, _)| *date).collect();
        let columns = tickers
            .into_iter()
            .enumerate()
            .map(|(col, ticker)| {
                let values = rows.iter().map(|(_, closes)| closes[col]).collect();
                (ticker, values)
            })
            .collect();

        Ok(Self {
            path,
            dates,
            columns,
        })
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn parse_close(cell: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    let value: f64 = cell.parse()?;
    Ok(value.is_finite().then_some(value))
}

impl MarketDataPort for CsvAdapter {
    fn fetch_ticker(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Observations, LedgerError> {
        if interval != Interval::Daily {
            tracing::debug!(%interval, "CSV prices are used at their stored sampling");
        }

        let wanted = ticker.to_uppercase();
        let (_, values) = self
            .columns
            .iter()
            .find(|(t, _)| *t == wanted)
            .ok_or_else(|| LedgerError::MarketData {
                ticker: ticker.to_string(),
                reason: format!("no column in {}", self.path.display()),
            })?;

        let start = self
            .dates
            .last()
            .and_then(|last| lookback.start_from(*last));

        Ok(self
            .dates
            .iter()
            .zip(values)
            .filter(|(date, _)| start.is_none_or(|s| **date >= s))
            .map(|(date, close)| (*date, *close))
            .collect())
    }
}
