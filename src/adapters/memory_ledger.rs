//! In-process ledger store backed by the fold analytics.

use crate::domain::analytics::{self, RealizedTrade, TickerDrawdown, TickerPerformance};
use crate::domain::error::LedgerError;
use crate::domain::trade::Trade;
use crate::ports::ledger_port::LedgerPort;
use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct MemoryLedger {
    trades: RefCell<Vec<Trade>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerPort for MemoryLedger {
    fn replace_trades(&self, trades: &[Trade]) -> Result<(), LedgerError> {
        *self.trades.borrow_mut() = trades.to_vec();
        Ok(())
    }

    fn load_trades(&self) -> Result<Vec<Trade>, LedgerError> {
        Ok(self.trades.borrow().clone())
    }

    fn realized_pnl(&self) -> Result<Vec<RealizedTrade>, LedgerError> {
        Ok(analytics::realized_pnl(&self.trades.borrow()))
    }

    fn ticker_performance(&self) -> Result<Vec<TickerPerformance>, LedgerError> {
        Ok(analytics::ticker_performance(&self.trades.borrow()))
    }

    fn max_drawdown(&self) -> Result<Vec<TickerDrawdown>, LedgerError> {
        Ok(analytics::max_drawdown(&self.trades.borrow()))
    }
}
