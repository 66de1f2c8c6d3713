//! Port traits separating domain logic from I/O.

pub mod config_port;
pub mod ledger_port;
pub mod market_data_port;
pub mod report_port;
