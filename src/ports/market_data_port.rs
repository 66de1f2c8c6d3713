//! Market data access port trait.

use crate::domain::error::LedgerError;
use crate::domain::market::{Interval, Lookback};
use crate::domain::price::CloseTable;
use chrono::NaiveDate;

/// Dated closes for one ticker; `None` marks a missing value.
pub type Observations = Vec<(NaiveDate, Option<f64>)>;

pub trait MarketDataPort {
    /// Closing prices for `tickers`, one column per ticker in the given order.
    ///
    /// A ticker the source cannot serve is reported as `LedgerError::MarketData`
    /// by `fetch_ticker`; `fetch_closes` logs it and leaves the column empty.
    fn fetch_ticker(
        &self,
        ticker: &str,
        lookback: Lookback,
        interval: Interval,
    ) -> Result<Observations, LedgerError>;

    fn fetch_closes(
        &self,
        tickers: &[String],
        lookback: Lookback,
        interval: Interval,
    ) -> CloseTable {
        let columns = tickers
            .iter()
            .map(|ticker| {
                let observations = match self.fetch_ticker(ticker, lookback, interval) {
                    Ok(obs) => obs,
                    Err(e) => {
                        tracing::warn!(%ticker, error = %e, "skipping ticker");
                        Vec::new()
                    }
                };
                (ticker.clone(), observations)
            })
            .collect();
        CloseTable::from_columns(columns)
    }
}
