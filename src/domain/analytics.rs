//! Ledger analytics: realized round trips, per-ticker performance and
//! maximum drawdown.
//!
//! Each ticker's ledger rows are walked in date order carrying the previous
//! row, the running equity and the running peak. The SQLite adapter computes
//! the same figures with window functions; both must agree row for row.

use crate::domain::trade::{round2, Action, Trade};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const QUERY_A_TITLE: &str = "Query A: Realized Profit/Loss per Trade (Window Function)";
pub const QUERY_B_TITLE: &str = "Query B: Ticker Performance Analytics (CTE)";
pub const QUERY_C_TITLE: &str = "Query C: Maximum Drawdown (Risk Metric)";

/// A SELL closing the BUY immediately before it.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedTrade {
    pub trade_id: i64,
    pub ticker: String,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub entry_price: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerPerformance {
    pub ticker: String,
    pub total_trades: usize,
    pub win_rate_pct: f64,
    pub total_net_profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerDrawdown {
    pub ticker: String,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsReport {
    pub realized: Vec<RealizedTrade>,
    pub performance: Vec<TickerPerformance>,
    pub drawdowns: Vec<TickerDrawdown>,
}

/// Profit of moving from `prev` to `row`: price change times quantity less a
/// round-trip commission. Quantity and commission come from the later row.
pub fn pair_profit(prev: &Trade, row: &Trade) -> f64 {
    (row.price - prev.price) * row.quantity as f64 - row.commission * 2.0
}

/// Groups rows by ticker (sorted) with each group ordered by date.
fn by_ticker(trades: &[Trade]) -> BTreeMap<&str, Vec<&Trade>> {
    let mut groups: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
    for trade in trades {
        groups.entry(trade.ticker.as_str()).or_default().push(trade);
    }
    for rows in groups.values_mut() {
        rows.sort_by_key(|t| (t.date, t.trade_id));
    }
    groups
}

/// Per-row profits after the first row of each ticker.
fn row_profits(rows: &[&Trade]) -> Vec<f64> {
    rows.windows(2).map(|w| pair_profit(w[0], w[1])).collect()
}

pub fn realized_pnl(trades: &[Trade]) -> Vec<RealizedTrade> {
    let mut realized = Vec::new();
    for rows in by_ticker(trades).values() {
        for pair in rows.windows(2) {
            let (prev, row) = (pair[0], pair[1]);
            if row.action == Action::Sell && prev.action == Action::Buy {
                realized.push(RealizedTrade {
                    trade_id: row.trade_id,
                    ticker: row.ticker.clone(),
                    exit_date: row.date,
                    exit_price: row.price,
                    entry_price: prev.price,
                    net_profit: pair_profit(prev, row),
                });
            }
        }
    }
    realized
}

/// Summarizes a run of per-row profits. `None` when there are no rows.
pub fn summarize_profits(ticker: &str, profits: &[f64]) -> Option<TickerPerformance> {
    if profits.is_empty() {
        return None;
    }
    let wins = profits.iter().filter(|p| **p > 0.0).count();
    Some(TickerPerformance {
        ticker: ticker.to_string(),
        total_trades: profits.len(),
        win_rate_pct: round2(wins as f64 * 100.0 / profits.len() as f64),
        total_net_profit: round2(profits.iter().sum()),
    })
}

pub fn ticker_performance(trades: &[Trade]) -> Vec<TickerPerformance> {
    let mut performance: Vec<TickerPerformance> = by_ticker(trades)
        .iter()
        .filter_map(|(ticker, rows)| summarize_profits(ticker, &row_profits(rows)))
        .collect();
    performance.sort_by(|a, b| b.total_net_profit.total_cmp(&a.total_net_profit));
    performance
}

/// Most negative gap between running equity and its running peak.
/// `None` when there are no profits.
pub fn max_drawdown_of(profits: &[f64]) -> Option<f64> {
    let mut equity = 0.0_f64;
    let mut peak = f64::NEG_INFINITY;
    let mut worst: Option<f64> = None;

    for profit in profits {
        equity += profit;
        peak = peak.max(equity);
        let drawdown = equity - peak;
        worst = Some(worst.map_or(drawdown, |w| w.min(drawdown)));
    }

    worst
}

pub fn max_drawdown(trades: &[Trade]) -> Vec<TickerDrawdown> {
    by_ticker(trades)
        .iter()
        .filter_map(|(ticker, rows)| {
            max_drawdown_of(&row_profits(rows)).map(|max_drawdown| TickerDrawdown {
                ticker: ticker.to_string(),
                max_drawdown,
            })
        })
        .collect()
}

pub fn compute_report(trades: &[Trade]) -> AnalyticsReport {
    AnalyticsReport {
        realized: realized_pnl(trades),
        performance: ticker_performance(trades),
        drawdowns: max_drawdown(trades),
    }
}
