//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::address_view::QuerySession;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::explorer::{ExplorerAdapter, ExplorerConfig};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_report_adapter::SvgReportAdapter;
use crate::adapters::text_report;
use crate::adapters::yahoo_adapter::{DEFAULT_YAHOO_URL, YahooAdapter};
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    optional_f64, optional_i64, parse_date, required_f64, validate_backtest_config, validate_data_source,
    validate_strategy_config,
};
use crate::domain::error::CoinlensError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::explorer_port::TransactionSource;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_CHART_PATH: &str = "backtest.svg";
const DEFAULT_DATA_TIMEOUT_SECS: i64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "coinlens",
    about = "Crypto address lookup and RSI/LSR strategy backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up BTC or ETH addresses; reads one per line from stdin when none are given
    Query {
        addresses: Vec<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the sent/received chart of the latest query as SVG
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Read prices from this CSV instead of the configured source
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Query {
            addresses,
            config,
            chart,
        } => run_query(addresses, config.as_deref(), chart.as_deref()),
        Command::Backtest {
            config,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, data.as_deref(), output.as_deref())
            } else {
                run_backtest(&config, data.as_deref(), output.as_deref())
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &CoinlensError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CoinlensError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn build_explorer_config(path: Option<&Path>) -> Result<ExplorerConfig, CoinlensError> {
    match path {
        Some(p) => Ok(ExplorerConfig::from_config(&load_config(p)?)),
        None => Ok(ExplorerConfig::from_config(&FileConfigAdapter::empty())),
    }
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, CoinlensError> {
    let start_str = adapter.get_string("backtest", "start_date");
    let end_str = adapter.get_string("backtest", "end_date");

    Ok(BacktestConfig {
        symbol: adapter.get_string_or("backtest", "symbol", "BTC-USD"),
        start_date: parse_date(start_str.as_deref(), "backtest", "start_date")?,
        end_date: parse_date(end_str.as_deref(), "backtest", "end_date")?,
        initial_capital: optional_f64(adapter, "backtest", "initial_capital", 100_000.0)?,
        commission_pct: optional_f64(adapter, "backtest", "commission_pct", 0.0)?,
        risk_free_rate: optional_f64(adapter, "backtest", "risk_free_rate", 0.01)?,
    })
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> Result<StrategyParams, CoinlensError> {
    let period = |key: &str| -> Result<usize, CoinlensError> {
        let value = optional_i64(adapter, "strategy", key, 4)?;
        usize::try_from(value)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| CoinlensError::ConfigInvalid {
                section: "strategy".into(),
                key: key.into(),
                reason: format!("{} must be at least 1", key),
            })
    };

    Ok(StrategyParams {
        rsi_period: period("rsi_period")?,
        lsr_period: period("lsr_period")?,
        rsi_oversold: required_f64(adapter, "strategy", "rsi_oversold")?,
        rsi_overbought: required_f64(adapter, "strategy", "rsi_overbought")?,
        lsr_high: required_f64(adapter, "strategy", "lsr_high")?,
        lsr_low: required_f64(adapter, "strategy", "lsr_low")?,
        stop_loss: required_f64(adapter, "strategy", "stop_loss")?,
        take_profit: required_f64(adapter, "strategy", "take_profit")?,
        position_fraction: optional_f64(adapter, "strategy", "position_fraction", 0.8)?,
        signal_exit: adapter.get_bool("strategy", "signal_exit", false),
    })
}

/// Pick the price source: an explicit CSV path wins over `[data]`.
pub fn resolve_data_port(
    adapter: &dyn ConfigPort,
    csv_override: Option<&Path>,
) -> Result<Box<dyn DataPort>, CoinlensError> {
    if let Some(path) = csv_override {
        info!(path = %path.display(), "using CSV price data");
        return Ok(Box::new(CsvAdapter::new(path.to_path_buf())));
    }

    match adapter.get_string_or("data", "source", "yahoo").to_lowercase().as_str() {
        "csv" => {
            let path = adapter
                .get_string("data", "csv_path")
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| CoinlensError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_path".into(),
                })?;
            info!(%path, "using CSV price data");
            Ok(Box::new(CsvAdapter::new(PathBuf::from(path.trim()))))
        }
        "yahoo" => {
            let url = adapter.get_string_or("data", "yahoo_url", DEFAULT_YAHOO_URL);
            let timeout = adapter.get_int("data", "timeout_secs", DEFAULT_DATA_TIMEOUT_SECS);
            let timeout = u64::try_from(timeout).ok().filter(|t| *t > 0).unwrap_or(30);
            info!(%url, "using Yahoo Finance price data");
            Ok(Box::new(YahooAdapter::new(&url, timeout)?))
        }
        other => Err(CoinlensError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source '{}', expected yahoo or csv", other),
        }),
    }
}

pub fn resolve_chart_path(adapter: &dyn ConfigPort, output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(adapter.get_string_or("report", "chart_path", DEFAULT_CHART_PATH)))
}

fn validate_all(adapter: &dyn ConfigPort, csv_override: bool) -> Result<(), CoinlensError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;
    validate_data_source(adapter, csv_override)?;
    Ok(())
}

/// Answer each address in turn, printing the view to `out`. A failed
/// lookup prints its user-facing message and does not stop the rest.
/// Returns the last failure, if any.
pub fn run_queries<I, W>(
    source: &dyn TransactionSource,
    inputs: I,
    chart_path: Option<&Path>,
    out: &mut W,
) -> io::Result<Option<CoinlensError>>
where
    I: IntoIterator<Item = String>,
    W: Write,
{
    let mut session = QuerySession::new();
    let mut last_error = None;

    for input in inputs {
        let input = input.trim_end_matches(['\r', '\n']);
        if input.is_empty() {
            continue;
        }
        match session.submit(source, input) {
            Ok(view) => {
                write!(out, "{}", view)?;
                out.flush()?;
                if let Some(path) = chart_path {
                    if let Err(e) = fs::write(path, view.chart_svg()) {
                        warn!(path = %path.display(), error = %e, "failed to write chart");
                        last_error = Some(CoinlensError::Io(e));
                    }
                }
            }
            Err(e) => {
                warn!(%input, error = %e, "query failed");
                eprintln!("error: {}", e.user_message());
                last_error = Some(e);
            }
        }
    }

    Ok(last_error)
}

fn run_query(addresses: Vec<String>, config_path: Option<&Path>, chart: Option<&Path>) -> ExitCode {
    let explorer_config = match build_explorer_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let explorer = match ExplorerAdapter::new(explorer_config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = if addresses.is_empty() {
        let lines = io::stdin().lock().lines().map_while(Result::ok);
        run_queries(&explorer, lines, chart, &mut out)
    } else {
        run_queries(&explorer, addresses, chart, &mut out)
    };

    match outcome {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(e)) => (&e).into(),
        Err(e) => fail(&CoinlensError::Io(e)),
    }
}

/// Fetch, simulate, report. Returns the console report text.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    params: &StrategyParams,
    bt_config: &BacktestConfig,
    chart_path: &Path,
) -> Result<String, CoinlensError> {
    let bars = data_port.fetch_bars(&bt_config.symbol, bt_config.start_date, bt_config.end_date)?;
    info!(
        symbol = %bt_config.symbol,
        bars = bars.len(),
        start = %bt_config.start_date,
        end = %bt_config.end_date,
        "running backtest"
    );
    backtest_engine::check_bars(&bt_config.symbol, &bars, params)?;

    let result = backtest_engine::run_backtest(&bars, params, bt_config)?;
    let metrics = Metrics::compute(&result.ledger, bt_config.risk_free_rate);

    report_port.write(&bars, &result, chart_path)?;
    Ok(text_report::render_report(&bt_config.symbol, &metrics, &result.ledger))
}

fn run_backtest(config_path: &Path, csv_override: Option<&Path>, output: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_all(&adapter, csv_override.is_some()) {
        return fail(&e);
    }

    let outcome = build_backtest_config(&adapter).and_then(|bt_config| {
        let params = build_strategy_params(&adapter)?;
        let data_port = resolve_data_port(&adapter, csv_override)?;
        let chart_path = resolve_chart_path(&adapter, output);
        let report = run_backtest_pipeline(
            data_port.as_ref(),
            &SvgReportAdapter::new(),
            &params,
            &bt_config,
            &chart_path,
        )?;
        Ok((report, chart_path))
    });

    match outcome {
        Ok((report, chart_path)) => {
            print!("{}", report);
            println!("\nChart written to: {}", chart_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Resolved parameters as printed by `--dry-run`.
pub fn describe_run(bt_config: &BacktestConfig, params: &StrategyParams, chart_path: &Path) -> String {
    let mut out = String::new();
    out.push_str(&format!("Symbol:            {}\n", bt_config.symbol));
    out.push_str(&format!(
        "Date range:        {} to {}\n",
        bt_config.start_date, bt_config.end_date
    ));
    out.push_str(&format!("Initial capital:   {:.2}\n", bt_config.initial_capital));
    out.push_str(&format!("Commission:        {}%\n", bt_config.commission_pct));
    out.push_str(&format!("Risk-free rate:    {}\n", bt_config.risk_free_rate));
    out.push_str(&format!(
        "Entry:             RSI({}) < {} and LSR({}) > {}\n",
        params.rsi_period, params.rsi_oversold, params.lsr_period, params.lsr_high
    ));
    out.push_str(&format!(
        "Exit:              take profit {}, stop loss {}\n",
        params.take_profit, params.stop_loss
    ));
    if params.signal_exit {
        out.push_str(&format!(
            "Signal exit:       RSI > {} and LSR < {}\n",
            params.rsi_overbought, params.lsr_low
        ));
    }
    out.push_str(&format!("Position fraction: {}\n", params.position_fraction));
    out.push_str(&format!("Chart:             {}\n", chart_path.display()));
    out
}

/// Validate the config and resolve everything a run would use, without
/// fetching data.
pub fn dry_run(
    config_path: &Path,
    csv_override: Option<&Path>,
    output: Option<&Path>,
) -> Result<String, CoinlensError> {
    let adapter = load_config(config_path)?;
    validate_all(&adapter, csv_override.is_some())?;
    let bt_config = build_backtest_config(&adapter)?;
    let params = build_strategy_params(&adapter)?;
    Ok(describe_run(&bt_config, &params, &resolve_chart_path(&adapter, output)))
}

fn run_dry_run(config_path: &Path, csv_override: Option<&Path>, output: Option<&Path>) -> ExitCode {
    match dry_run(config_path, csv_override, output) {
        Ok(description) => {
            println!("Config validated successfully");
            print!("{}", description);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

pub fn validate(config_path: &Path) -> Result<(), CoinlensError> {
    let adapter = load_config(config_path)?;
    validate_all(&adapter, false)
}

fn run_validate(config_path: &Path) -> ExitCode {
    match validate(config_path) {
        Ok(()) => {
            println!("Config is valid");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
