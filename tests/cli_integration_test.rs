//! CLI integration tests for configuration handling and command wiring.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config, build_strategy_params)
//! - Explorer config with and without a file
//! - Data source and chart path resolution
//! - Dry-run and validate with real INI files on disk
//! - Argument parsing for every subcommand

mod common;

use clap::Parser;
use common::*;
use coinlens::adapters::explorer::DEFAULT_ETHERSCAN_URL;
use coinlens::adapters::file_config_adapter::FileConfigAdapter;
use coinlens::cli::{self, Cli, Command};
use coinlens::domain::error::CoinlensError;
use std::io::Write;
use std::path::{Path, PathBuf};

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[explorer]
etherscan_api_key = ETHKEY
blockchain_info_api_key = BTCKEY
timeout_secs = 12

[data]
source = csv
csv_path = /data/BTC-USD.csv

[backtest]
symbol = BTC-USD
start_date = 2021-01-01
end_date = 2023-12-31
initial_capital = 50000
commission_pct = 0.1
risk_free_rate = 0.02

[strategy]
rsi_oversold = 30
rsi_overbought = 70
lsr_high = 1.5
lsr_low = 0.5
stop_loss = 0.05
take_profit = 0.10

[report]
chart_path = charts/btc.svg
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();

        assert_eq!(config.symbol, "BTC-USD");
        assert_eq!(config.start_date, date(2021, 1, 1));
        assert_eq!(config.end_date, date(2023, 12, 31));
        assert!((config.initial_capital - 50_000.0).abs() < f64::EPSILON);
        assert!((config.commission_pct - 0.1).abs() < f64::EPSILON);
        assert!((config.risk_free_rate - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let ini = "[backtest]\nstart_date = 2020-01-01\nend_date = 2020-06-30\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let config = cli::build_backtest_config(&adapter).unwrap();

        assert_eq!(config.symbol, "BTC-USD");
        assert!((config.initial_capital - 100_000.0).abs() < f64::EPSILON);
        assert_eq!(config.commission_pct, 0.0);
        assert!((config.risk_free_rate - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn build_backtest_config_missing_start_date() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nend_date = 2020-01-01\n").unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            CoinlensError::ConfigMissing { ref key, .. } if key == "start_date"
        ));
    }

    #[test]
    fn build_backtest_config_bad_date() {
        let ini = "[backtest]\nstart_date = 01/01/2020\nend_date = 2020-06-30\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(err, CoinlensError::ConfigInvalid { .. }));
    }

    #[test]
    fn build_strategy_params_reads_thresholds_and_defaults() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let params = cli::build_strategy_params(&adapter).unwrap();

        assert_eq!(params, sample_params());
    }

    #[test]
    fn build_strategy_params_overrides() {
        let ini = VALID_INI.replace(
            "[strategy]\n",
            "[strategy]\nrsi_period = 14\nlsr_period = 7\nposition_fraction = 0.5\nsignal_exit = true\n",
        );
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let params = cli::build_strategy_params(&adapter).unwrap();

        assert_eq!(params.rsi_period, 14);
        assert_eq!(params.lsr_period, 7);
        assert!((params.position_fraction - 0.5).abs() < f64::EPSILON);
        assert!(params.signal_exit);
    }

    #[test]
    fn missing_threshold_is_an_error() {
        let ini = VALID_INI.replace("lsr_high = 1.5\n", "");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = cli::build_strategy_params(&adapter).unwrap_err();
        assert!(matches!(
            err,
            CoinlensError::ConfigMissing { ref key, .. } if key == "lsr_high"
        ));
    }

    #[test]
    fn non_numeric_threshold_is_an_error() {
        let ini = VALID_INI.replace("stop_loss = 0.05", "stop_loss = five");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = cli::build_strategy_params(&adapter).unwrap_err();
        assert!(matches!(err, CoinlensError::ConfigInvalid { .. }));
    }

    #[test]
    fn unparsable_optional_numbers_are_errors() {
        let ini = VALID_INI.replace("initial_capital = 50000", "initial_capital = 10k");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = cli::build_backtest_config(&adapter).unwrap_err();
        assert!(matches!(
            err,
            CoinlensError::ConfigInvalid { ref key, .. } if key == "initial_capital"
        ));

        let ini = VALID_INI.replace("[strategy]\n", "[strategy]\nrsi_period = x\n");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        let err = cli::build_strategy_params(&adapter).unwrap_err();
        assert!(matches!(
            err,
            CoinlensError::ConfigInvalid { ref key, .. } if key == "rsi_period"
        ));
    }

    #[test]
    fn zero_period_is_an_error() {
        let ini = VALID_INI.replace("[strategy]\n", "[strategy]\nrsi_period = 0\n");
        let adapter = FileConfigAdapter::from_string(&ini).unwrap();
        assert!(cli::build_strategy_params(&adapter).is_err());
    }
}

mod explorer_config {
    use super::*;

    #[test]
    fn without_file_uses_defaults() {
        let config = cli::build_explorer_config(None).unwrap();
        assert_eq!(config.etherscan_api_key, "");
        assert_eq!(config.etherscan_url, DEFAULT_ETHERSCAN_URL);
    }

    #[test]
    fn from_file() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::build_explorer_config(Some(file.path())).unwrap();
        assert_eq!(config.etherscan_api_key, "ETHKEY");
        assert_eq!(config.blockchain_info_api_key, "BTCKEY");
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::build_explorer_config(Some(Path::new("/nonexistent/coinlens.ini"))).unwrap_err();
        assert!(matches!(err, CoinlensError::ConfigParse { .. }));
    }
}

mod resolution {
    use super::*;

    #[test]
    fn chart_path_precedence() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::resolve_chart_path(&adapter, None), PathBuf::from("charts/btc.svg"));
        assert_eq!(
            cli::resolve_chart_path(&adapter, Some(Path::new("x.svg"))),
            PathBuf::from("x.svg")
        );
        assert_eq!(
            cli::resolve_chart_path(&FileConfigAdapter::empty(), None),
            PathBuf::from(cli::DEFAULT_CHART_PATH)
        );
    }

    #[test]
    fn csv_override_reads_given_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(
            &path,
            "Date,Open,High,Low,Close,Adj Close,Volume\n2021-01-04,100,110,90,105,105,1000\n",
        )
        .unwrap();
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();

        let port = cli::resolve_data_port(&adapter, Some(path.as_path())).unwrap();
        let bars = port.fetch_bars("BTC-USD", date(2021, 1, 1), date(2021, 12, 31)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 105.0);
    }

    #[test]
    fn csv_source_without_path_is_missing() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource = csv\n").unwrap();
        let err = cli::resolve_data_port(&adapter, None).err().unwrap();
        assert!(matches!(
            err,
            CoinlensError::ConfigMissing { ref key, .. } if key == "csv_path"
        ));
    }

    #[test]
    fn unknown_source_is_invalid() {
        let adapter = FileConfigAdapter::from_string("[data]\nsource = bloomberg\n").unwrap();
        let err = cli::resolve_data_port(&adapter, None).err().unwrap();
        assert!(matches!(err, CoinlensError::ConfigInvalid { .. }));
    }

    #[test]
    fn yahoo_is_default_source() {
        assert!(cli::resolve_data_port(&FileConfigAdapter::empty(), None).is_ok());
    }
}

mod commands {
    use super::*;

    #[test]
    fn dry_run_succeeds_on_valid_config() {
        let file = write_temp_ini(VALID_INI);
        let text = cli::dry_run(file.path(), None, None).unwrap();
        assert!(text.contains("2021-01-01 to 2023-12-31"));
        assert!(text.contains("charts/btc.svg"));
    }

    #[test]
    fn dry_run_fails_on_missing_threshold() {
        let file = write_temp_ini(&VALID_INI.replace("take_profit = 0.10\n", ""));
        let err = cli::dry_run(file.path(), None, None).unwrap_err();
        assert!(matches!(
            err,
            CoinlensError::ConfigMissing { ref key, .. } if key == "take_profit"
        ));
    }

    #[test]
    fn dry_run_missing_file() {
        let err = cli::dry_run(Path::new("/nonexistent/config.ini"), None, None).unwrap_err();
        assert!(matches!(err, CoinlensError::ConfigParse { .. }));
    }

    #[test]
    fn dry_run_csv_override_skips_data_section() {
        let ini = VALID_INI.replace("csv_path = /data/BTC-USD.csv\n", "");
        let file = write_temp_ini(&ini);
        assert!(cli::dry_run(file.path(), None, None).is_err());
        assert!(cli::dry_run(file.path(), Some(Path::new("prices.csv")), None).is_ok());
    }

    #[test]
    fn dry_run_reports_output_override() {
        let file = write_temp_ini(VALID_INI);
        let text = cli::dry_run(file.path(), None, Some(Path::new("out/run.svg"))).unwrap();
        assert!(text.contains("out/run.svg"));
        assert!(!text.contains("charts/btc.svg"));
    }

    #[test]
    fn validate_rejects_reversed_dates() {
        let ini = VALID_INI.replace("end_date = 2023-12-31", "end_date = 2020-12-31");
        let file = write_temp_ini(&ini);
        assert!(matches!(
            cli::validate(file.path()),
            Err(CoinlensError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn validate_accepts_valid_config() {
        let file = write_temp_ini(VALID_INI);
        assert!(cli::validate(file.path()).is_ok());
    }

    #[test]
    fn describe_run_lists_parameters() {
        let text = cli::describe_run(&sample_config(), &sample_params(), Path::new("out.svg"));
        assert!(text.contains("BTC-USD"));
        assert!(text.contains("RSI(4) < 30 and LSR(4) > 1.5"));
        assert!(text.contains("take profit 0.1, stop loss 0.05"));
        assert!(!text.contains("Signal exit"));
        assert!(text.contains("out.svg"));
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn query_with_addresses_and_chart() {
        let cli = Cli::parse_from(["coinlens", "query", BTC_ADDRESS, ETH_ADDRESS, "--chart", "q.svg"]);
        match cli.command {
            Command::Query {
                addresses,
                config,
                chart,
            } => {
                assert_eq!(addresses, vec![BTC_ADDRESS.to_string(), ETH_ADDRESS.to_string()]);
                assert!(config.is_none());
                assert_eq!(chart, Some(PathBuf::from("q.svg")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn query_without_addresses_reads_stdin() {
        let cli = Cli::parse_from(["coinlens", "query"]);
        assert!(matches!(cli.command, Command::Query { ref addresses, .. } if addresses.is_empty()));
    }

    #[test]
    fn backtest_flags() {
        let cli = Cli::parse_from([
            "coinlens", "backtest", "-c", "cfg.ini", "--data", "p.csv", "-o", "c.svg", "--dry-run",
        ]);
        match cli.command {
            Command::Backtest {
                config,
                data,
                output,
                dry_run,
            } => {
                assert_eq!(config, PathBuf::from("cfg.ini"));
                assert_eq!(data, Some(PathBuf::from("p.csv")));
                assert_eq!(output, Some(PathBuf::from("c.svg")));
                assert!(dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn backtest_requires_config() {
        assert!(Cli::try_parse_from(["coinlens", "backtest"]).is_err());
    }
}
