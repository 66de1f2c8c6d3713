//! SQLite ledger adapter.
//!
//! The `trades` table is dropped and recreated on every write. Analytics run
//! as window-function queries over it.

use crate::domain::analytics::{RealizedTrade, TickerDrawdown, TickerPerformance};
use crate::domain::error::LedgerError;
use crate::domain::trade::{Action, Trade};
use crate::ports::ledger_port::LedgerPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

const CREATE_TRADES: &str = "CREATE TABLE trades (
    Trade_ID INTEGER PRIMARY KEY,
    Date TEXT NOT NULL,
    Ticker TEXT NOT NULL,
    Action TEXT NOT NULL CHECK (Action IN ('BUY', 'SELL')),
    Price REAL NOT NULL,
    Quantity INTEGER NOT NULL,
    Commission REAL NOT NULL
)";

/// Query A: each SELL paired with the row before it, kept when that row is a BUY.
pub const REALIZED_PNL_SQL: &str = "
SELECT
    Trade_ID,
    Ticker,
    Date AS Exit_Date,
    Price AS Exit_Price,
    Prev_Price AS Entry_Price,
    (Price - Prev_Price) * Quantity - (Commission * 2) AS Net_Profit_GBP
FROM (
    SELECT *,
           LAG(Price) OVER (PARTITION BY Ticker ORDER BY Date, Trade_ID) AS Prev_Price,
           LAG(Action) OVER (PARTITION BY Ticker ORDER BY Date, Trade_ID) AS Prev_Action
    FROM trades
)
WHERE Action = 'SELL' AND Prev_Action = 'BUY'
ORDER BY Ticker, Exit_Date";

/// Query B: every consecutive row pair counts as one trade.
pub const TICKER_PERFORMANCE_SQL: &str = "
WITH TradePerf AS (
    SELECT
        Ticker,
        (Price - LAG(Price) OVER (PARTITION BY Ticker ORDER BY Date, Trade_ID)) * Quantity
            - (Commission * 2) AS Profit
    FROM trades
)
SELECT
    Ticker,
    COUNT(*) AS Total_Trades,
    ROUND(SUM(CASE WHEN Profit > 0 THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2) AS Win_Rate_Pct,
    ROUND(SUM(Profit), 2) AS Total_Net_Profit_GBP
FROM TradePerf
WHERE Profit IS NOT NULL
GROUP BY Ticker
ORDER BY Total_Net_Profit_GBP DESC, Ticker";

/// Query C: running equity, running peak, deepest gap between them.
pub const MAX_DRAWDOWN_SQL: &str = "
WITH Cumulative_PL AS (
    SELECT
        Ticker,
        Date,
        Trade_ID,
        (Price - LAG(Price) OVER (PARTITION BY Ticker ORDER BY Date, Trade_ID)) * Quantity
            - (Commission * 2) AS Trade_PL
    FROM trades
),
Running_Balance AS (
    SELECT
        Ticker,
        Date,
        Trade_ID,
        SUM(Trade_PL) OVER (
            PARTITION BY Ticker ORDER BY Date, Trade_ID
            ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW
        ) AS Equity_Curve
    FROM Cumulative_PL
    WHERE Trade_PL IS NOT NULL
),
Drawdown_Calc AS (
    SELECT
        Ticker,
        Equity_Curve,
        MAX(Equity_Curve) OVER (
            PARTITION BY Ticker ORDER BY Date, Trade_ID
            ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW
        ) AS Peak_Equity
    FROM Running_Balance
)
SELECT
    Ticker,
    MIN(Equity_Curve - Peak_Equity) AS Max_Drawdown_GBP
FROM Drawdown_Calc
GROUP BY Ticker
ORDER BY Ticker";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> LedgerError {
    LedgerError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_date_column(idx: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl SqliteAdapter {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let manager = SqliteConnectionManager::file(path);
        Self::with_manager(manager)
    }

    pub fn in_memory() -> Result<Self, LedgerError> {
        Self::with_manager(SqliteConnectionManager::memory())
    }

    fn with_manager(manager: SqliteConnectionManager) -> Result<Self, LedgerError> {
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| LedgerError::Database {
                reason: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, LedgerError> {
        self.pool.get().map_err(|e: r2d2::Error| LedgerError::Database {
            reason: e.to_string(),
        })
    }

    fn has_trades_table(&self) -> Result<bool, LedgerError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'trades'",
                [],
                |row| row.get(0),
            )
            .map_err(query_err)?;
        Ok(count > 0)
    }

    fn require_trades_table(&self) -> Result<(), LedgerError> {
        if self.has_trades_table()? {
            Ok(())
        } else {
            Err(LedgerError::DatabaseQuery {
                reason: "no trades table; run the pipeline first".into(),
            })
        }
    }
}

impl LedgerPort for SqliteAdapter {
    fn replace_trades(&self, trades: &[Trade]) -> Result<(), LedgerError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute_batch("DROP TABLE IF EXISTS trades;")
            .map_err(query_err)?;
        tx.execute(CREATE_TRADES, []).map_err(query_err)?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO trades (Trade_ID, Date, Ticker, Action, Price, Quantity, Commission)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(query_err)?;
            for trade in trades {
                stmt.execute(params![
                    trade.trade_id,
                    trade.date.format("%Y-%m-%d").to_string(),
                    trade.ticker,
                    trade.action.as_str(),
                    trade.price,
                    trade.quantity,
                    trade.commission,
                ])
                .map_err(query_err)?;
            }
        }

        tx.commit().map_err(query_err)?;
        Ok(())
    }

    fn load_trades(&self) -> Result<Vec<Trade>, LedgerError> {
        self.require_trades_table()?;
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT Trade_ID, Date, Ticker, Action, Price, Quantity, Commission
                 FROM trades ORDER BY Trade_ID",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let action: String = row.get(3)?;
                let action = action.parse::<Action>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?;
                Ok(Trade {
                    trade_id: row.get(0)?,
                    date: parse_date_column(1, row.get(1)?)?,
                    ticker: row.get(2)?,
                    action,
                    price: row.get(4)?,
                    quantity: row.get(5)?,
                    commission: row.get(6)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn realized_pnl(&self) -> Result<Vec<RealizedTrade>, LedgerError> {
        self.require_trades_table()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(REALIZED_PNL_SQL).map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RealizedTrade {
                    trade_id: row.get(0)?,
                    ticker: row.get(1)?,
                    exit_date: parse_date_column(2, row.get(2)?)?,
                    exit_price: row.get(3)?,
                    entry_price: row.get(4)?,
                    net_profit: row.get(5)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn ticker_performance(&self) -> Result<Vec<TickerPerformance>, LedgerError> {
        self.require_trades_table()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(TICKER_PERFORMANCE_SQL).map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                let total: i64 = row.get(1)?;
                Ok(TickerPerformance {
                    ticker: row.get(0)?,
                    total_trades: total as usize,
                    win_rate_pct: row.get(2)?,
                    total_net_profit: row.get(3)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn max_drawdown(&self) -> Result<Vec<TickerDrawdown>, LedgerError> {
        self.require_trades_table()?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(MAX_DRAWDOWN_SQL).map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TickerDrawdown {
                    ticker: row.get(0)?,
                    max_drawdown: row.get(1)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }
}
