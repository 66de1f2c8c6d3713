//! Closing-price points and the date-aligned close table.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices indexed by date, one column per ticker.
///
/// Columns are aligned on the union of every ticker's dates. A cell is `None`
/// when the ticker has no observation for that date, or when the source
/// reported a missing or non-finite close.
#[derive(Debug, Clone, Default)]
pub struct CloseTable {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl CloseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from per-ticker observations, keeping ticker order.
    ///
    /// A date repeated within one ticker keeps the last observation.
    pub fn from_columns(columns: Vec<(String, Vec<(NaiveDate, Option<f64>)>)>) -> Self {
        let dates: Vec<NaiveDate> = columns
            .iter()
            .flat_map(|(_, obs)| obs.iter().map(|(date, _)| *date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let aligned = columns
            .into_iter()
            .map(|(ticker, obs)| {
                let by_date: BTreeMap<NaiveDate, Option<f64>> = obs.into_iter().collect();
                let values = dates
                    .iter()
                    .map(|d| by_date.get(d).copied().flatten())
                    .collect();
                (ticker, values)
            })
            .collect();

        Self {
            dates,
            columns: aligned,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Ordered series for one ticker with absent and non-finite values dropped.
    ///
    /// Returns an empty series for a ticker the table does not hold.
    pub fn series(&self, ticker: &str) -> Vec<PricePoint> {
        let Some((_, values)) = self.columns.iter().find(|(t, _)| t == ticker) else {
            return Vec::new();
        };

        self.dates
            .iter()
            .zip(values)
            .filter_map(|(date, value)| match value {
                Some(close) if close.is_finite() => Some(PricePoint {
                    ticker: ticker.to_string(),
                    date: *date,
                    close: *close,
                }),
                _ => None,
            })
            .collect()
    }
}
