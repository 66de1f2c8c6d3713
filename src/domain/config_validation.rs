//! Configuration validation.
//!
//! Every key is optional; present keys must hold usable values.

use crate::domain::error::LedgerError;
use crate::domain::market::{Interval, Lookback};
use crate::domain::pipeline::StorageBackend;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    validate_tickers(config)?;
    validate_source(config)?;
    validate_lookback(config)?;
    validate_interval(config)?;
    validate_window(config)?;
    validate_quantity(config)?;
    validate_commission(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(tickers) = config.get_string("market", "tickers") {
        parse_tickers(&tickers)
            .map_err(|e| LedgerError::config_invalid("market", "tickers", e.to_string()))?;
    }
    Ok(())
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    let source = config
        .get_string("market", "source")
        .unwrap_or_else(|| "yahoo".to_string());
    match source.trim().to_lowercase().as_str() {
        "yahoo" => Ok(()),
        "csv" => {
            let path = config.get_string("market", "csv_path").unwrap_or_default();
            if path.trim().is_empty() {
                return Err(LedgerError::ConfigMissing {
                    section: "market".to_string(),
                    key: "csv_path".to_string(),
                });
            }
            Ok(())
        }
        other => Err(LedgerError::config_invalid(
            "market",
            "source",
            format!("unknown source '{other}' (expected yahoo or csv)"),
        )),
    }
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(value) = config.get_string("market", "lookback") {
        value
            .parse::<Lookback>()
            .map_err(|e| LedgerError::config_invalid("market", "lookback", e))?;
    }
    Ok(())
}

fn validate_interval(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(value) = config.get_string("market", "interval") {
        value
            .parse::<Interval>()
            .map_err(|e| LedgerError::config_invalid("market", "interval", e))?;
    }
    Ok(())
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if config.get_string("signal", "window").is_some() {
        let window = config.get_int("signal", "window", 0);
        if window < 1 {
            return Err(LedgerError::config_invalid(
                "signal",
                "window",
                "window must be a positive integer",
            ));
        }
    }
    Ok(())
}

fn validate_quantity(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if config.get_string("trades", "quantity").is_some() {
        let quantity = config.get_int("trades", "quantity", 0);
        if quantity < 1 {
            return Err(LedgerError::config_invalid(
                "trades",
                "quantity",
                "quantity must be a positive integer",
            ));
        }
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if config.get_string("trades", "commission").is_some() {
        let commission = config.get_double("trades", "commission", -1.0);
        if !commission.is_finite() || commission < 0.0 {
            return Err(LedgerError::config_invalid(
                "trades",
                "commission",
                "commission must be a non-negative number",
            ));
        }
    }
    Ok(())
}

fn validate_storage(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(value) = config.get_string("storage", "backend") {
        value
            .parse::<StorageBackend>()
            .map_err(|e| LedgerError::config_invalid("storage", "backend", e))?;
    }
    if let Some(path) = config.get_string("sqlite", "path") {
        if path.trim().is_empty() {
            return Err(LedgerError::config_invalid(
                "sqlite",
                "path",
                "path must not be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn validate(ini: &str) -> Result<(), LedgerError> {
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        validate_pipeline_config(&adapter)
    }

    fn invalid_key(result: Result<(), LedgerError>) -> String {
        match result {
            Err(LedgerError::ConfigInvalid { key, .. }) => key,
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate("").is_ok());
    }

    #[test]
    fn full_config_is_valid() {
        let ini = r#"
[market]
tickers = RR.L,AML.L
source = csv
csv_path = prices.csv
lookback = 6mo
interval = 1wk

[signal]
window = 10

[trades]
quantity = 500
commission = 0

[storage]
backend = memory

[sqlite]
path = ledger.db
"#;
        assert!(validate(ini).is_ok());
    }

    #[test]
    fn rejects_bad_tickers() {
        assert_eq!(invalid_key(validate("[market]\ntickers = RR.L,,X\n")), "tickers");
    }

    #[test]
    fn csv_source_requires_path() {
        match validate("[market]\nsource = csv\n") {
            Err(LedgerError::ConfigMissing { section, key }) => {
                assert_eq!(section, "market");
                assert_eq!(key, "csv_path");
            }
            other => panic!("expected ConfigMissing, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_source() {
        assert_eq!(invalid_key(validate("[market]\nsource = bloomberg\n")), "source");
    }

    #[test]
    fn rejects_bad_lookback_and_interval() {
        assert_eq!(invalid_key(validate("[market]\nlookback = 3w\n")), "lookback");
        assert_eq!(invalid_key(validate("[market]\ninterval = 1h\n")), "interval");
    }

    #[test]
    fn rejects_non_positive_window() {
        assert_eq!(invalid_key(validate("[signal]\nwindow = 0\n")), "window");
        assert_eq!(invalid_key(validate("[signal]\nwindow = abc\n")), "window");
    }

    #[test]
    fn rejects_bad_trade_params() {
        assert_eq!(invalid_key(validate("[trades]\nquantity = -5\n")), "quantity");
        assert_eq!(invalid_key(validate("[trades]\ncommission = -1\n")), "commission");
        assert_eq!(invalid_key(validate("[trades]\ncommission = five\n")), "commission");
    }

    #[test]
    fn rejects_bad_storage() {
        assert_eq!(invalid_key(validate("[storage]\nbackend = redis\n")), "backend");
    }
}
