//! Simple moving average crossover signal.
//!
//! SMA(n) = (P[i-n+1] + ... + P[i]) / n, summed afresh for every window.
//! Warmup: first (n-1) points have no average and no signal.
//! Signal: LONG when close > SMA, SHORT when close < SMA, NONE otherwise.

use crate::domain::price::PricePoint;
use chrono::NaiveDate;
use std::fmt;

pub const DEFAULT_SMA_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Long,
    Short,
    None,
}

impl Signal {
    pub fn classify(close: f64, sma: Option<f64>) -> Self {
        match sma {
            Some(avg) if close > avg => Signal::Long,
            Some(avg) if close < avg => Signal::Short,
            _ => Signal::None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Long => "LONG",
            Signal::Short => "SHORT",
            Signal::None => "NONE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalState {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
    pub signal: Signal,
}

impl SignalState {
    pub fn is_valid(&self) -> bool {
        self.sma.is_some()
    }
}

/// Signal states for a ticker's date-ordered series, one per input point.
#[derive(Debug, Clone)]
pub struct SignalSeries {
    pub ticker: String,
    pub window: usize,
    pub states: Vec<SignalState>,
}

/// Mean close of `window`. A flat window yields its close exactly, so a
/// close equal to every point in its window classifies as NONE.
fn window_mean(window: &[PricePoint]) -> f64 {
    let first = window[0].close;
    if window.iter().all(|p| p.close == first) {
        return first;
    }
    window.iter().map(|p| p.close).sum::<f64>() / window.len() as f64
}

pub fn calculate_signals(ticker: &str, points: &[PricePoint], window: usize) -> SignalSeries {
    let states = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let sma = if window > 0 && i + 1 >= window {
                Some(window_mean(&points[i + 1 - window..=i]))
            } else {
                None
            };
            SignalState {
                date: point.date,
                close: point.close,
                sma,
                signal: Signal::classify(point.close, sma),
            }
        })
        .collect();

    SignalSeries {
        ticker: ticker.to_string(),
        window,
        states,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_points(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                close,
            })
            .collect()
    }

    #[test]
    fn classify() {
        assert_eq!(Signal::classify(101.0, Some(100.0)), Signal::Long);
        assert_eq!(Signal::classify(99.0, Some(100.0)), Signal::Short);
        assert_eq!(Signal::classify(100.0, Some(100.0)), Signal::None);
        assert_eq!(Signal::classify(100.0, None), Signal::None);
    }

    #[test]
    fn sma_warmup() {
        let points = make_points(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_signals("TEST", &points, 3);

        assert_eq!(series.states.len(), 5);
        assert!(!series.states[0].is_valid());
        assert!(!series.states[1].is_valid());
        assert!(series.states[2].is_valid());
        assert_eq!(series.states[0].signal, Signal::None);
        assert_eq!(series.states[1].signal, Signal::None);
    }

    #[test]
    fn sma_values_and_signals() {
        let points = make_points(&[10.0, 20.0, 30.0, 10.0, 50.0]);
        let series = calculate_signals("TEST", &points, 3);

        // (10+20+30)/3 = 20, (20+30+10)/3 = 20, (30+10+50)/3 = 30
        assert_relative_eq!(series.states[2].sma.unwrap(), 20.0);
        assert_relative_eq!(series.states[3].sma.unwrap(), 20.0);
        assert_relative_eq!(series.states[4].sma.unwrap(), 30.0);

        assert_eq!(series.states[2].signal, Signal::Long);
        assert_eq!(series.states[3].signal, Signal::Short);
        assert_eq!(series.states[4].signal, Signal::Long);
    }

    #[test]
    fn flat_window_is_none() {
        let points = make_points(&[250.0; 6]);
        let series = calculate_signals("TEST", &points, 3);
        assert!(series.states[2..].iter().all(|s| s.signal == Signal::None));
        assert!(series.states[2..].iter().all(|s| s.is_valid()));
    }

    #[test]
    fn flat_window_of_pence_prices_equals_close() {
        for price in [183.55, 101.37, 447.3, 0.1] {
            let points = make_points(&[price; 25]);
            let series = calculate_signals("TEST", &points, DEFAULT_SMA_WINDOW);
            for state in &series.states[19..] {
                assert_eq!(state.sma, Some(price));
                assert_eq!(state.signal, Signal::None);
            }
        }
    }

    #[test]
    fn short_series_has_no_valid_points() {
        let points = make_points(&[1.0, 2.0, 3.0]);
        let series = calculate_signals("TEST", &points, DEFAULT_SMA_WINDOW);
        assert!(series.states.iter().all(|s| !s.is_valid()));
    }

    #[test]
    fn window_of_one_tracks_close() {
        let points = make_points(&[5.0, 6.0]);
        let series = calculate_signals("TEST", &points, 1);
        assert!(series.states.iter().all(|s| s.signal == Signal::None));
        assert_relative_eq!(series.states[1].sma.unwrap(), 6.0);
    }

    #[test]
    fn empty_input() {
        let series = calculate_signals("TEST", &[], 20);
        assert!(series.states.is_empty());
        assert_eq!(series.window, 20);
    }
}
