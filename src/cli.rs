//! CLI definition, pipeline orchestration and dispatch.

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::console_report::ConsoleReport;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_ledger::MemoryLedger;
use crate::domain::analytics::AnalyticsReport;
use crate::domain::config_validation::validate_pipeline_config;
use crate::domain::error::LedgerError;
use crate::domain::market::{Interval, Lookback};
use crate::domain::pipeline::{
    generate_ledger, DataSource, PipelineConfig, StorageBackend, DEFAULT_DB_PATH,
};
use crate::domain::signal::DEFAULT_SMA_WINDOW;
use crate::domain::trade::{Trade, TradeParams, DEFAULT_COMMISSION, DEFAULT_QUANTITY};
use crate::domain::universe::{default_tickers, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "tradeledger",
    about = "SMA crossover trade ledger with SQL analytics"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, rebuild the trade ledger and print analytics (default)
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma separated tickers, overriding the configured list
        #[arg(long)]
        tickers: Option<String>,
        /// Read closes from a CSV file instead of the configured source
        #[arg(long)]
        prices: Option<PathBuf>,
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print analytics for the ledger already stored in the database
    Report {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Validate a configuration file and show the resolved settings
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let command = cli.command.unwrap_or(Command::Run {
        config: None,
        tickers: None,
        prices: None,
        db: None,
    });

    let result = match command {
        Command::Run {
            config,
            tickers,
            prices,
            db,
        } => run_pipeline(config.as_deref(), tickers.as_deref(), prices, db),
        Command::Report { config, db } => run_report(config.as_deref(), db),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, LedgerError> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| LedgerError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn parse_setting<T: std::str::FromStr<Err = String>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, LedgerError> {
    match config.get_string(section, key) {
        Some(value) => value
            .parse()
            .map_err(|e| LedgerError::config_invalid(section, key, e)),
        None => Ok(default),
    }
}

pub fn build_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, LedgerError> {
    validate_pipeline_config(config)?;

    let tickers = match config.get_string("market", "tickers") {
        Some(list) => parse_tickers(&list)
            .map_err(|e| LedgerError::config_invalid("market", "tickers", e.to_string()))?,
        None => default_tickers(),
    };

    let source = match config
        .get_string("market", "source")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        Some("csv") => {
            let path = config.get_string("market", "csv_path").ok_or_else(|| {
                LedgerError::ConfigMissing {
                    section: "market".into(),
                    key: "csv_path".into(),
                }
            })?;
            DataSource::Csv(PathBuf::from(path.trim()))
        }
        _ => DataSource::Yahoo,
    };

    Ok(PipelineConfig {
        tickers,
        source,
        lookback: parse_setting(config, "market", "lookback", Lookback::Years(1))?,
        interval: parse_setting(config, "market", "interval", Interval::Daily)?,
        window: config.get_int("signal", "window", DEFAULT_SMA_WINDOW as i64) as usize,
        trade: TradeParams {
            quantity: config.get_int("trades", "quantity", DEFAULT_QUANTITY),
            commission: config.get_double("trades", "commission", DEFAULT_COMMISSION),
        },
        storage: parse_setting(config, "storage", "backend", StorageBackend::Sqlite)?,
        db_path: config
            .get_string("sqlite", "path")
            .map(|p| PathBuf::from(p.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
    })
}

/// Applies command-line overrides on top of the file configuration.
pub fn apply_overrides(
    config: &mut PipelineConfig,
    tickers: Option<&str>,
    prices: Option<PathBuf>,
    db: Option<PathBuf>,
) -> Result<(), LedgerError> {
    if let Some(list) = tickers {
        config.tickers = parse_tickers(list)
            .map_err(|e| LedgerError::config_invalid("market", "tickers", e.to_string()))?;
    }
    if let Some(path) = prices {
        config.source = DataSource::Csv(path);
    }
    if let Some(path) = db {
        config.db_path = path;
        config.storage = StorageBackend::Sqlite;
    }
    Ok(())
}

pub fn open_market_data(source: &DataSource) -> Result<Box<dyn MarketDataPort>, LedgerError> {
    match source {
        DataSource::Csv(path) => {
            info!("Reading closes from {}", path.display());
            Ok(Box::new(CsvAdapter::open(path)?))
        }
        DataSource::Yahoo => {
            #[cfg(feature = "yahoo")]
            {
                use crate::adapters::yahoo_adapter::YahooAdapter;
                Ok(Box::new(YahooAdapter::new()?))
            }

            #[cfg(not(feature = "yahoo"))]
            {
                Err(LedgerError::config_invalid(
                    "market",
                    "source",
                    "yahoo feature is required for the yahoo source",
                ))
            }
        }
    }
}

pub fn open_ledger(config: &PipelineConfig) -> Result<Box<dyn LedgerPort>, LedgerError> {
    match config.storage {
        StorageBackend::Memory => Ok(Box::new(MemoryLedger::new())),
        StorageBackend::Sqlite => {
            #[cfg(feature = "sqlite")]
            {
                use crate::adapters::sqlite_adapter::SqliteAdapter;
                info!("Opening ledger database {}", config.db_path.display());
                Ok(Box::new(SqliteAdapter::open(&config.db_path)?))
            }

            #[cfg(not(feature = "sqlite"))]
            {
                Err(LedgerError::config_invalid(
                    "storage",
                    "backend",
                    "sqlite feature is required for the sqlite backend",
                ))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub trades: Vec<Trade>,
    pub report: AnalyticsReport,
}

/// Fetch → signals → ledger → store → analytics.
///
/// A storage failure aborts before any analytics run.
pub fn execute_pipeline(
    data_port: &dyn MarketDataPort,
    ledger: &dyn LedgerPort,
    config: &PipelineConfig,
) -> Result<PipelineOutcome, LedgerError> {
    info!(
        "Fetching {} closes for {} ({} interval)",
        config.lookback,
        config.tickers.join(", "),
        config.interval
    );
    let table = data_port.fetch_closes(&config.tickers, config.lookback, config.interval);
    if table.is_empty() {
        warn!("No price data returned for any ticker");
    }

    for ticker in &config.tickers {
        let points = table.series(ticker).len();
        if points == 0 {
            warn!("{}: no price data", ticker);
        } else if points < config.window {
            warn!(
                "{}: {} closes, fewer than the {}-point window; no trades",
                ticker, points, config.window
            );
        }
    }

    let trades = generate_ledger(&table, config);
    log_ledger_summary(&trades);

    ledger.replace_trades(&trades)?;
    info!("Stored {} trades", trades.len());

    let report = ledger.analytics()?;
    Ok(PipelineOutcome { trades, report })
}

fn log_ledger_summary(trades: &[Trade]) {
    let mut per_ticker: BTreeMap<&str, usize> = BTreeMap::new();
    for trade in trades {
        *per_ticker.entry(trade.ticker.as_str()).or_default() += 1;
    }
    for (ticker, count) in per_ticker {
        info!("  {}: {} trades", ticker, count);
    }
}

fn run_pipeline(
    config_path: Option<&Path>,
    tickers: Option<&str>,
    prices: Option<PathBuf>,
    db: Option<PathBuf>,
) -> Result<(), LedgerError> {
    let adapter = load_config(config_path)?;
    let mut config = build_pipeline_config(&adapter)?;
    apply_overrides(&mut config, tickers, prices, db)?;

    let data_port = open_market_data(&config.source)?;
    let ledger = open_ledger(&config)?;

    let outcome = execute_pipeline(data_port.as_ref(), ledger.as_ref(), &config)?;
    ConsoleReport.write(&outcome.report)
}

fn run_report(config_path: Option<&Path>, db: Option<PathBuf>) -> Result<(), LedgerError> {
    let adapter = load_config(config_path)?;
    let mut config = build_pipeline_config(&adapter)?;
    apply_overrides(&mut config, None, None, db)?;

    if config.storage == StorageBackend::Memory {
        return Err(LedgerError::config_invalid(
            "storage",
            "backend",
            "report reads a stored ledger and needs the sqlite backend",
        ));
    }

    let ledger = open_ledger(&config)?;
    let report = ledger.analytics()?;
    ConsoleReport.write(&report)
}

fn run_validate(config_path: &Path) -> Result<(), LedgerError> {
    let adapter = load_config(Some(config_path))?;
    let config = build_pipeline_config(&adapter)?;

    let source = match &config.source {
        DataSource::Yahoo => "yahoo".to_string(),
        DataSource::Csv(path) => format!("csv ({})", path.display()),
    };
    let storage = match config.storage {
        StorageBackend::Sqlite => format!("sqlite ({})", config.db_path.display()),
        StorageBackend::Memory => "memory".to_string(),
    };

    println!("tickers:    {}", config.tickers.join(", "));
    println!("source:     {}", source);
    println!("lookback:   {}", config.lookback);
    println!("interval:   {}", config.interval);
    println!("window:     {}", config.window);
    println!("quantity:   {}", config.trade.quantity);
    println!("commission: {:.2}", config.trade.commission);
    println!("storage:    {}", storage);
    info!("Configuration is valid");
    Ok(())
}
