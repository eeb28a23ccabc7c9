//! Configuration validation.
//!
//! Validates all config fields before a backtest runs. The six strategy
//! thresholds have no defaults: a missing or non-numeric value is an error.

use crate::domain::error::CoinlensError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const STRATEGY_THRESHOLDS: [&str; 6] = [
    "rsi_oversold",
    "rsi_overbought",
    "lsr_high",
    "lsr_low",
    "stop_loss",
    "take_profit",
];

pub const DATA_SOURCES: [&str; 2] = ["yahoo", "csv"];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    validate_symbol(config)?;
    validate_initial_capital(config)?;
    validate_commission(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    for key in STRATEGY_THRESHOLDS {
        required_f64(config, "strategy", key)?;
    }
    validate_rsi_thresholds(config)?;
    validate_lsr_thresholds(config)?;
    validate_exits(config)?;
    validate_periods(config)?;
    validate_position_fraction(config)?;
    Ok(())
}

/// `csv_override` is set when the caller supplies a CSV path directly,
/// which makes `[data]` irrelevant.
pub fn validate_data_source(config: &dyn ConfigPort, csv_override: bool) -> Result<(), CoinlensError> {
    if csv_override {
        return Ok(());
    }
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "yahoo".to_string())
        .to_lowercase();
    if !DATA_SOURCES.contains(&source.as_str()) {
        return Err(invalid(
            "data",
            "source",
            format!("unknown data source '{}', expected yahoo or csv", source),
        ));
    }
    if source == "csv" {
        match config.get_string("data", "csv_path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => return Err(missing("data", "csv_path")),
        }
    }
    Ok(())
}

/// Read a required floating-point value.
pub fn required_f64(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, CoinlensError> {
    let raw = config
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing(section, key))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, format!("'{}' is not a number", raw.trim())))?;
    if !value.is_finite() {
        return Err(invalid(section, key, "value must be finite".to_string()));
    }
    Ok(value)
}

/// Read an optional floating-point value. Absent or blank falls back to
/// `default`; a present value that does not parse is an error.
pub fn optional_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, CoinlensError> {
    match config.get_string(section, key).filter(|s| !s.trim().is_empty()) {
        None => Ok(default),
        Some(_) => required_f64(config, section, key),
    }
}

/// Integer counterpart of [`optional_f64`].
pub fn optional_i64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, CoinlensError> {
    match config.get_string(section, key).filter(|s| !s.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(section, key, format!("'{}' is not an integer", raw.trim()))),
    }
}

pub fn parse_date(value: Option<&str>, section: &str, field: &str) -> Result<NaiveDate, CoinlensError> {
    match value {
        None => Err(missing(section, field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                section,
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn missing(section: &str, key: &str) -> CoinlensError {
    CoinlensError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> CoinlensError {
    CoinlensError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if s.trim().is_empty() => Err(invalid(
            "backtest",
            "symbol",
            "symbol must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let value = optional_f64(config, "backtest", "initial_capital", 100_000.0)?;
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let pct = optional_f64(config, "backtest", "commission_pct", 0.0)?;
    if pct < 0.0 {
        return Err(invalid(
            "backtest",
            "commission_pct",
            "commission_pct must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let value = optional_f64(config, "backtest", "risk_free_rate", 0.01)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "backtest", "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "backtest", "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date".to_string(),
        ));
    }
    Ok(())
}

fn validate_rsi_thresholds(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let oversold = required_f64(config, "strategy", "rsi_oversold")?;
    let overbought = required_f64(config, "strategy", "rsi_overbought")?;
    if !(0.0..=100.0).contains(&oversold) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be between 0 and 100".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "rsi_overbought",
            "rsi_overbought must be between 0 and 100".to_string(),
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought".to_string(),
        ));
    }
    Ok(())
}

fn validate_lsr_thresholds(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let high = required_f64(config, "strategy", "lsr_high")?;
    let low = required_f64(config, "strategy", "lsr_low")?;
    if low < 0.0 {
        return Err(invalid(
            "strategy",
            "lsr_low",
            "lsr_low must be non-negative".to_string(),
        ));
    }
    if low > high {
        return Err(invalid(
            "strategy",
            "lsr_low",
            "lsr_low must not exceed lsr_high".to_string(),
        ));
    }
    Ok(())
}

fn validate_exits(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let stop_loss = required_f64(config, "strategy", "stop_loss")?;
    if stop_loss <= 0.0 || stop_loss >= 1.0 {
        return Err(invalid(
            "strategy",
            "stop_loss",
            "stop_loss must be a fraction between 0 and 1 (e.g. 0.05)".to_string(),
        ));
    }
    let take_profit = required_f64(config, "strategy", "take_profit")?;
    if take_profit <= 0.0 {
        return Err(invalid(
            "strategy",
            "take_profit",
            "take_profit must be positive (e.g. 0.10)".to_string(),
        ));
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    for key in ["rsi_period", "lsr_period"] {
        if optional_i64(config, "strategy", key, 4)? < 1 {
            return Err(invalid(
                "strategy",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    Ok(())
}

fn validate_position_fraction(config: &dyn ConfigPort) -> Result<(), CoinlensError> {
    let value = optional_f64(config, "strategy", "position_fraction", 0.8)?;
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(
            "strategy",
            "position_fraction",
            "position_fraction must be in (0, 1]".to_string(),
        ));
    }
    Ok(())
}
