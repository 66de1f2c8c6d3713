//! Lookback period and sampling interval for market data requests.

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Lookback {
    /// First date covered when the window ends on `end`. `None` means unbounded.
    pub fn start_from(&self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            Lookback::Days(n) => end.checked_sub_days(Days::new(u64::from(*n))),
            Lookback::Months(n) => end.checked_sub_months(Months::new(*n)),
            Lookback::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Lookback::YearToDate => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Lookback::Max => None,
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5d" => Ok(Lookback::Days(5)),
            "1mo" => Ok(Lookback::Months(1)),
            "3mo" => Ok(Lookback::Months(3)),
            "6mo" => Ok(Lookback::Months(6)),
            "1y" => Ok(Lookback::Years(1)),
            "2y" => Ok(Lookback::Years(2)),
            "5y" => Ok(Lookback::Years(5)),
            "10y" => Ok(Lookback::Years(10)),
            "ytd" => Ok(Lookback::YearToDate),
            "max" => Ok(Lookback::Max),
            other => Err(format!(
                "unsupported lookback '{other}' (expected 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max)"
            )),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::YearToDate => write!(f, "ytd"),
            Lookback::Max => write!(f, "max"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            "1mo" => Ok(Interval::Monthly),
            other => Err(format!(
                "unsupported interval '{other}' (expected 1d, 1wk or 1mo)"
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        };
        f.write_str(s)
    }
}
