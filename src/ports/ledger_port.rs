//! Trade ledger storage port trait.

use crate::domain::analytics::{AnalyticsReport, RealizedTrade, TickerDrawdown, TickerPerformance};
use crate::domain::error::LedgerError;
use crate::domain::trade::Trade;

pub trait LedgerPort {
    /// Replaces the stored ledger with `trades`.
    fn replace_trades(&self, trades: &[Trade]) -> Result<(), LedgerError>;

    fn load_trades(&self) -> Result<Vec<Trade>, LedgerError>;

    fn realized_pnl(&self) -> Result<Vec<RealizedTrade>, LedgerError>;

    fn ticker_performance(&self) -> Result<Vec<TickerPerformance>, LedgerError>;

    fn max_drawdown(&self) -> Result<Vec<TickerDrawdown>, LedgerError>;

    fn analytics(&self) -> Result<AnalyticsReport, LedgerError> {
        Ok(AnalyticsReport {
            realized: self.realized_pnl()?,
            performance: self.ticker_performance()?,
            drawdowns: self.max_drawdown()?,
        })
    }
}
