//! CLI orchestration tests: config loading, overrides and adapter selection.

mod common;

use common::*;
use std::io::Write;
use std::path::PathBuf;
use tradeledger::adapters::file_config_adapter::FileConfigAdapter;
use tradeledger::cli;
use tradeledger::domain::error::LedgerError;
use tradeledger::domain::market::{Interval, Lookback};
use tradeledger::domain::pipeline::{DataSource, PipelineConfig, StorageBackend};
use tradeledger::ports::ledger_port::LedgerPort;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FULL_INI: &str = r#"
[market]
tickers = rr.l, tsco.l
source = csv
csv_path = data/closes.csv
lookback = 6mo
interval = 1wk

[signal]
window = 10

[trades]
quantity = 250
commission = 2.5

[storage]
backend = sqlite

[sqlite]
path = /tmp/ledger.db
"#;

mod config_building {
    use super::*;

    #[test]
    fn full_ini_resolves_every_setting() {
        let adapter = FileConfigAdapter::from_string(FULL_INI).unwrap();
        let config = cli::build_pipeline_config(&adapter).unwrap();

        assert_eq!(config.tickers, vec!["RR.L", "TSCO.L"]);
        assert_eq!(config.source, DataSource::Csv(PathBuf::from("data/closes.csv")));
        assert_eq!(config.lookback, Lookback::Months(6));
        assert_eq!(config.interval, Interval::Weekly);
        assert_eq!(config.window, 10);
        assert_eq!(config.trade.quantity, 250);
        assert_eq!(config.trade.commission, 2.5);
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = cli::build_pipeline_config(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn invalid_lookback_rejected() {
        let adapter = FileConfigAdapter::from_string("[market]\nlookback = 3w\n").unwrap();
        match cli::build_pipeline_config(&adapter) {
            Err(LedgerError::ConfigInvalid { section, key, .. }) => {
                assert_eq!(section, "market");
                assert_eq!(key, "lookback");
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn csv_source_needs_path() {
        let adapter = FileConfigAdapter::from_string("[market]\nsource = csv\n").unwrap();
        assert!(matches!(
            cli::build_pipeline_config(&adapter),
            Err(LedgerError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn memory_backend_selected() {
        let adapter = FileConfigAdapter::from_string("[storage]\nbackend = memory\n").unwrap();
        let config = cli::build_pipeline_config(&adapter).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn load_from_disk() {
        let file = write_temp_ini(FULL_INI);
        let adapter = cli::load_config(Some(file.path())).unwrap();
        let config = cli::build_pipeline_config(&adapter).unwrap();
        assert_eq!(config.window, 10);
    }

    #[test]
    fn missing_file_is_parse_error() {
        let result = cli::load_config(Some(std::path::Path::new("/nonexistent/ledger.ini")));
        let err = result.err().unwrap();
        assert!(matches!(err, LedgerError::ConfigParse { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn no_path_gives_empty_config() {
        let adapter = cli::load_config(None).unwrap();
        let config = cli::build_pipeline_config(&adapter).unwrap();
        assert_eq!(config.tickers, vec!["RR.L", "AML.L", "TSCO.L"]);
    }
}

mod overrides {
    use super::*;

    #[test]
    fn flags_replace_file_values() {
        let mut config = memory_config();
        cli::apply_overrides(
            &mut config,
            Some("aml.l"),
            Some(PathBuf::from("prices.csv")),
            Some(PathBuf::from("other.db")),
        )
        .unwrap();

        assert_eq!(config.tickers, vec!["AML.L"]);
        assert_eq!(config.source, DataSource::Csv(PathBuf::from("prices.csv")));
        assert_eq!(config.db_path, PathBuf::from("other.db"));
        assert_eq!(config.storage, StorageBackend::Sqlite);
    }

    #[test]
    fn no_flags_keep_config() {
        let mut config = memory_config();
        cli::apply_overrides(&mut config, None, None, None).unwrap();
        assert_eq!(config, memory_config());
    }

    #[test]
    fn duplicate_tickers_rejected() {
        let mut config = PipelineConfig::default();
        let result = cli::apply_overrides(&mut config, Some("RR.L,rr.l"), None, None);
        assert!(matches!(result, Err(LedgerError::ConfigInvalid { .. })));
    }
}

mod adapter_selection {
    use super::*;

    #[test]
    fn memory_backend_opens_empty_ledger() {
        let ledger = cli::open_ledger(&memory_config()).unwrap();
        assert!(ledger.load_trades().unwrap().is_empty());
    }

    #[test]
    fn sqlite_backend_opens_database_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = PipelineConfig {
            db_path: dir.path().join("portfolio.db"),
            ..PipelineConfig::default()
        };
        let ledger = cli::open_ledger(&config).unwrap();
        ledger.replace_trades(&[]).unwrap();
        assert!(config.db_path.exists());
    }

    #[test]
    fn csv_source_runs_through_pipeline() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("closes.csv");
        std::fs::write(&path, wide_csv(&["RR.L"], &[rr_closes()])).unwrap();

        let config = PipelineConfig {
            tickers: vec!["RR.L".into()],
            source: DataSource::Csv(path),
            ..memory_config()
        };
        let data = cli::open_market_data(&config.source).unwrap();
        let ledger = cli::open_ledger(&config).unwrap();
        let outcome = cli::execute_pipeline(data.as_ref(), ledger.as_ref(), &config).unwrap();

        assert_eq!(outcome.trades.len(), 4);
        assert_eq!(outcome.report.realized.len(), 2);
    }

    #[test]
    fn missing_csv_is_price_data_error() {
        let source = DataSource::Csv(PathBuf::from("/nonexistent/closes.csv"));
        let err = cli::open_market_data(&source).err().unwrap();
        assert!(matches!(err, LedgerError::PriceData { .. }));
        assert_eq!(err.exit_status(), 5);
    }
}
