//! Action events and the synthetic trade ledger.
//!
//! Events are signal changes after the moving average becomes defined.
//! A LONG event buys and a SHORT event sells; a change into NONE is an event
//! with no order. An event pointing the same way as the ticker's last trade
//! (LONG -> NONE -> LONG) re-touches the average without crossing it and
//! also produces no order, so actions alternate per ticker.

use crate::domain::signal::{Signal, SignalSeries};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_QUANTITY: i64 = 1000;
pub const DEFAULT_COMMISSION: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }

    fn for_signal(signal: Signal) -> Option<Self> {
        match signal {
            Signal::Long => Some(Action::Buy),
            Signal::Short => Some(Action::Sell),
            Signal::None => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub trade_id: i64,
    pub date: NaiveDate,
    pub ticker: String,
    pub action: Action,
    pub price: f64,
    pub quantity: i64,
    pub commission: f64,
}

/// Fixed position size and flat fee applied to every synthetic trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeParams {
    pub quantity: i64,
    pub commission: f64,
}

impl Default for TradeParams {
    fn default() -> Self {
        Self {
            quantity: DEFAULT_QUANTITY,
            commission: DEFAULT_COMMISSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub date: NaiveDate,
    pub close: f64,
    pub previous: Signal,
    pub signal: Signal,
}

pub fn detect_events(series: &SignalSeries) -> Vec<ActionEvent> {
    let mut events = Vec::new();
    let mut previous: Option<Signal> = None;

    for state in series.states.iter().filter(|s| s.is_valid()) {
        if let Some(prev) = previous {
            if prev != state.signal {
                events.push(ActionEvent {
                    date: state.date,
                    close: state.close,
                    previous: prev,
                    signal: state.signal,
                });
            }
        }
        previous = Some(state.signal);
    }

    events
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sequential trade ids shared across every ticker of a run, starting at 1.
#[derive(Debug)]
pub struct TradeIdSequence {
    next: i64,
}

impl TradeIdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for TradeIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns one ticker's events into trades, drawing ids from `ids`.
pub fn trades_for_series(
    series: &SignalSeries,
    params: &TradeParams,
    ids: &mut TradeIdSequence,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut last_action: Option<Action> = None;

    for event in detect_events(series) {
        let Some(action) = Action::for_signal(event.signal) else {
            continue;
        };
        if last_action == Some(action) {
            continue;
        }
        trades.push(Trade {
            trade_id: ids.next_id(),
            date: event.date,
            ticker: series.ticker.clone(),
            action,
            price: round2(event.close),
            quantity: params.quantity,
            commission: params.commission,
        });
        last_action = Some(action);
    }

    trades
}

/// Builds the cross-ticker ledger in the given series order.
pub fn build_ledger(series: &[SignalSeries], params: &TradeParams) -> Vec<Trade> {
    let mut ids = TradeIdSequence::new();
    series
        .iter()
        .flat_map(|s| trades_for_series(s, params, &mut ids))
        .collect()
}
