//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading from INI files on disk
//! - Adapter construction from the resolved config
//! - Offline runs over a CSV feed with the rule oracle
//! - The `validate` and `indicators` commands

mod common;

use clap::Parser;
use common::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

use evotrader::cli::{self, Cli};
use evotrader::domain::decision_loop::DecisionLoop;
use evotrader::domain::error::TraderError;
use evotrader::domain::indicator::IndicatorEngine;
use evotrader::domain::settings::{MarketSource, NewsSource, OracleProvider};

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn candles_csv(count: usize) -> String {
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for i in 0..count {
        let close = 100.0 + (i as f64 * 0.7).sin() * 3.0 + i as f64 * 0.1;
        text.push_str(&format!(
            "{},{:.2},{:.2},{:.2},{:.2},5\n",
            BASE_TS + i as i64 * FIVE_MIN_MS,
            close,
            close + 1.0,
            close - 1.0,
            close
        ));
    }
    text
}

fn offline_ini(csv_path: &Path) -> String {
    format!(
        r#"
[market]
symbol = BTC/USDT
timeframe = 5m
candle_limit = 60
source = csv
csv_path = {}

[account]
initial_balance = 10000
initial_score = 100

[loop]
poll_interval_secs = 0
retry_delay_secs = 0
lesson_context = 3

[news]
source = static
placeholder = No major news in the last hour.

[oracle]
provider = rule
"#,
        csv_path.display()
    )
}

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let csv = write_file(dir.path(), "candles.csv", &candles_csv(80));
    let ini = write_file(dir.path(), "trader.ini", &offline_ini(&csv));
    (dir, ini)
}

fn same_code(a: ExitCode, b: ExitCode) -> bool {
    format!("{a:?}") == format!("{b:?}")
}

mod config_loading {
    use super::*;

    #[test]
    fn loads_offline_config() {
        let (_dir, ini) = setup();
        let config = cli::load_config(&ini).unwrap();

        assert_eq!(config.candle_limit, 60);
        assert!(matches!(config.market_source, MarketSource::Csv { .. }));
        assert_eq!(config.news_source, NewsSource::Static);
        assert_eq!(config.oracle, OracleProvider::Rule);
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/trader.ini")).unwrap_err();
        assert!(matches!(err, TraderError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_value_is_reported() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(dir.path(), "bad.ini", "[market]\ncandle_limit = 500\n");
        let err = cli::load_config(&ini).unwrap_err();
        assert!(matches!(err, TraderError::ConfigInvalid { ref key, .. } if key == "candle_limit"));
    }

    #[test]
    fn settings_dump_shows_csv_source() {
        let (_dir, ini) = setup();
        let config = cli::load_config(&ini).unwrap();
        let text = cli::format_settings(&config);
        assert!(text.contains("Market source:   csv ("));
        assert!(text.contains("Oracle:          rule"));
    }
}

mod offline_run {
    use super::*;

    #[test]
    fn runs_requested_cycles_over_csv_feed() {
        let (_dir, ini) = setup();
        let config = cli::load_config(&ini).unwrap();
        let reporter = RecordingReporter::default();

        let mut trader = DecisionLoop::new(
            &config,
            cli::build_market(&config).unwrap(),
            cli::build_news(&config).unwrap(),
            cli::build_oracle(&config).unwrap(),
            Box::new(reporter.clone()),
        );
        let summary = trader.run(&AtomicBool::new(false), Some(3));

        assert_eq!(summary.cycles, 3);
        assert_eq!(summary.failures, 0);

        let reports = reporter.reports.borrow();
        assert_eq!(reports.len(), 3);
        // The file never changes, so every cycle sees the same last close.
        assert!(reports.iter().all(|r| r.price == reports[0].price));
        assert!(reports.iter().all(|r| r.indicators.is_complete()));
        assert!(reports.iter().all(|r| r.news == "No major news in the last hour."));
        assert!(trader.ledger().trade_history.is_empty());
        assert_eq!(trader.ledger().strategy_score, 100);
    }

    #[test]
    fn missing_csv_counts_as_failed_cycles() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(
            dir.path(),
            "trader.ini",
            &offline_ini(&dir.path().join("absent.csv")),
        );
        let config = cli::load_config(&ini).unwrap();
        let market = cli::build_market(&config).unwrap();

        let err = market
            .fetch_candles(&config.symbol, &config.timeframe, config.candle_limit)
            .unwrap_err();
        assert!(matches!(err, TraderError::DataUnavailable { .. }));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_succeeds_on_good_config() {
        let (_dir, ini) = setup();
        let code = cli::run(Cli::parse_from([
            "evotrader",
            "validate",
            "--config",
            ini.to_str().unwrap(),
        ]));
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn validate_maps_config_errors_to_exit_code_2() {
        let dir = TempDir::new().unwrap();
        let ini = write_file(dir.path(), "bad.ini", "[oracle]\nprovider = crystal_ball\n");
        let code = cli::run(Cli::parse_from([
            "evotrader",
            "validate",
            "--config",
            ini.to_str().unwrap(),
        ]));
        assert!(same_code(code, ExitCode::from(2)));
    }

    #[test]
    fn run_command_completes_bounded_cycles() {
        let (_dir, ini) = setup();
        let code = cli::run(Cli::parse_from([
            "evotrader",
            "run",
            "--config",
            ini.to_str().unwrap(),
            "--cycles",
            "2",
        ]));
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn indicator_table_marks_warmup_rows() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let rows = IndicatorEngine::new().compute(&series_from_closes(&closes));

        let table = cli::format_indicator_rows(&rows, 25);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 26);
        assert!(lines[0].contains("ema7"));
        assert!(lines[1].contains(" - "));
        assert!(!lines[25].contains(" - "));

        let tail = cli::format_indicator_rows(&rows, 5);
        assert_eq!(tail.lines().count(), 6);
    }
}
