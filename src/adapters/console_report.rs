//! Plain-text report printed to stdout.

use crate::domain::analytics::{AnalyticsReport, QUERY_A_TITLE, QUERY_B_TITLE, QUERY_C_TITLE};
use crate::domain::error::LedgerError;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::io::Write;

struct TextTable {
    headers: &'static [&'static str],
    numeric: &'static [bool],
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let _ = writeln!(out, "{}", self.line(&widths, self.headers.iter().copied()));
        if self.rows.is_empty() {
            let _ = writeln!(out, "(no rows)");
        }
        for row in &self.rows {
            let _ = writeln!(out, "{}", self.line(&widths, row.iter().map(String::as_str)));
        }
    }

    fn line<'a>(&self, widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
        cells
            .enumerate()
            .map(|(i, cell)| {
                if self.numeric[i] {
                    format!("{:>width$}", cell, width = widths[i])
                } else {
                    format!("{:<width$}", cell, width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }
}

pub fn render_report(report: &AnalyticsReport) -> String {
    let realized = TextTable {
        headers: &[
            "Trade_ID",
            "Ticker",
            "Exit_Date",
            "Exit_Price",
            "Entry_Price",
            "Net_Profit_GBP",
        ],
        numeric: &[true, false, false, true, true, true],
        rows: report
            .realized
            .iter()
            .map(|r| {
                vec![
                    r.trade_id.to_string(),
                    r.ticker.clone(),
                    r.exit_date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", r.exit_price),
                    format!("{:.2}", r.entry_price),
                    format!("{:.2}", r.net_profit),
                ]
            })
            .collect(),
    };

    let performance = TextTable {
        headers: &["Ticker", "Total_Trades", "Win_Rate_Pct", "Total_Net_Profit_GBP"],
        numeric: &[false, true, true, true],
        rows: report
            .performance
            .iter()
            .map(|p| {
                vec![
                    p.ticker.clone(),
                    p.total_trades.to_string(),
                    format!("{:.2}", p.win_rate_pct),
                    format!("{:.2}", p.total_net_profit),
                ]
            })
            .collect(),
    };

    let drawdowns = TextTable {
        headers: &["Ticker", "Max_Drawdown_GBP"],
        numeric: &[false, true],
        rows: report
            .drawdowns
            .iter()
            .map(|d| vec![d.ticker.clone(), format!("{:.2}", d.max_drawdown)])
            .collect(),
    };

    let mut out = String::new();
    for (title, table) in [
        (QUERY_A_TITLE, realized),
        (QUERY_B_TITLE, performance),
        (QUERY_C_TITLE, drawdowns),
    ] {
        let _ = writeln!(out, "\n--- {} ---", title);
        table.render(&mut out);
    }
    out
}

pub struct ConsoleReport;

impl ReportPort for ConsoleReport {
    fn write(&self, report: &AnalyticsReport) -> Result<(), LedgerError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(render_report(report).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
