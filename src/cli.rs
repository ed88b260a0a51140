//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::console_reporter::ConsoleReporter;
use crate::adapters::csv_candle_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::rule_oracle::RuleOracle;
use crate::adapters::static_news_adapter::StaticNewsAdapter;
use crate::domain::decision_loop::DecisionLoop;
use crate::domain::error::TraderError;
use crate::domain::indicator::{EnrichedCandle, IndicatorEngine};
use crate::domain::settings::{MarketSource, NewsSource, OracleProvider, TraderConfig};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::news_port::NewsPort;
use crate::ports::oracle_port::OraclePort;

/// Request timeout for the market and news feeds.
#[cfg(feature = "live")]
const FEED_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "evotrader", about = "Self-reflecting paper-trading agent")]
pub struct Cli {
    /// Debug logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the decision loop
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Stop after this many completed cycles
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        cycles: Option<u64>,
    },
    /// Load and validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Fetch candles once and print the latest indicator rows
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value_t = 10)]
        rows: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run { config, cycles } => run_trader(&config, cycles.map(|n| n as usize)),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators { config, rows } => run_indicators(&config, rows),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second install (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<TraderConfig, TraderError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    TraderConfig::from_config(&adapter)
}

#[cfg(not(feature = "live"))]
fn live_disabled(section: &str, key: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: "this build does not include the `live` feature".to_string(),
    }
}

pub fn build_market(config: &TraderConfig) -> Result<Box<dyn MarketDataPort>, TraderError> {
    match &config.market_source {
        MarketSource::Csv { path } => Ok(Box::new(CsvCandleAdapter::new(path))),
        #[cfg(feature = "live")]
        MarketSource::Okx { base_url } => Ok(Box::new(
            crate::adapters::okx_adapter::OkxAdapter::new(base_url.as_str(), FEED_TIMEOUT),
        )),
        #[cfg(not(feature = "live"))]
        MarketSource::Okx { .. } => Err(live_disabled("market", "source")),
    }
}

pub fn build_news(config: &TraderConfig) -> Result<Box<dyn NewsPort>, TraderError> {
    match &config.news_source {
        NewsSource::Static => Ok(Box::new(StaticNewsAdapter::new(
            config.news_placeholder.as_str(),
        ))),
        #[cfg(feature = "live")]
        NewsSource::Rss { url } => Ok(Box::new(
            crate::adapters::rss_news_adapter::RssNewsAdapter::new(
                url.as_str(),
                config.max_headlines,
                config.news_placeholder.as_str(),
                FEED_TIMEOUT,
            ),
        )),
        #[cfg(not(feature = "live"))]
        NewsSource::Rss { .. } => Err(live_disabled("news", "source")),
    }
}

pub fn build_oracle(config: &TraderConfig) -> Result<Box<dyn OraclePort>, TraderError> {
    match &config.oracle {
        OracleProvider::Rule => Ok(Box::new(RuleOracle::default())),
        #[cfg(feature = "live")]
        OracleProvider::Gemini { model, api_key_env } => Ok(Box::new(
            crate::adapters::gemini_oracle::GeminiOracle::from_env(
                api_key_env,
                model,
                config.oracle_timeout,
            )?,
        )),
        #[cfg(not(feature = "live"))]
        OracleProvider::Gemini { .. } => Err(live_disabled("oracle", "provider")),
    }
}

fn run_trader(config_path: &Path, cycles: Option<usize>) -> Result<(), TraderError> {
    info!(path = %config_path.display(), "loading config");
    let config = load_config(config_path)?;

    let market = build_market(&config)?;
    let news = build_news(&config)?;
    let oracle = build_oracle(&config)?;
    let reporter = Box::new(ConsoleReporter::stdout(config.clear_screen));

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    let mut trader = DecisionLoop::new(&config, market, news, oracle, reporter);
    let summary = trader.run(&stop, cycles);

    let ledger = trader.ledger();
    println!(
        "Stopped after {} cycles ({} failed). Balance: {:.2} U | Score: {} | Trades: {}",
        summary.cycles,
        summary.failures,
        ledger.balance,
        ledger.strategy_score,
        ledger.trade_history.len()
    );
    Ok(())
}

/// Human-readable dump of the resolved configuration.
pub fn format_settings(config: &TraderConfig) -> String {
    let market = match &config.market_source {
        MarketSource::Okx { base_url } => format!("okx ({base_url})"),
        MarketSource::Csv { path } => format!("csv ({path})"),
    };
    let news = match &config.news_source {
        NewsSource::Rss { url } => format!("rss ({url})"),
        NewsSource::Static => "static".to_string(),
    };
    let oracle = match &config.oracle {
        OracleProvider::Gemini { model, api_key_env } => {
            format!("gemini ({model}, key from ${api_key_env})")
        }
        OracleProvider::Rule => "rule".to_string(),
    };
    let l = &config.loop_settings;
    let max_lessons = match l.max_lessons {
        0 => "unbounded".to_string(),
        n => n.to_string(),
    };

    [
        format!("Symbol:          {} ({})", config.symbol, config.timeframe),
        format!("Candles:         {}", config.candle_limit),
        format!("Market source:   {market}"),
        format!("Initial balance: {:.2}", config.initial_balance),
        format!("Initial score:   {}", config.initial_score),
        format!("Poll interval:   {}s", l.poll_interval.as_secs()),
        format!("Retry delay:     {}s", l.retry_delay.as_secs()),
        format!("Lesson context:  {}", l.lesson_context),
        format!("Max lessons:     {max_lessons}"),
        format!("News source:     {news} (max {})", config.max_headlines),
        format!("Oracle:          {oracle}"),
        format!("Oracle timeout:  {}s", config.oracle_timeout.as_secs()),
    ]
    .join("\n")
}

fn run_validate(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    println!("{}", format_settings(&config));
    println!("Configuration OK");
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Table of the last `rows` enriched candles.
pub fn format_indicator_rows(rows: &[EnrichedCandle], count: usize) -> String {
    let mut lines = vec![format!(
        "{:<17} {:>10} {:>10} {:>10} {:>7} {:>10} {:>10} {:>10} {:>8}",
        "time", "close", "ema7", "ema25", "rsi", "sma20", "upper", "lower", "atr"
    )];
    let skip = rows.len().saturating_sub(count);
    for row in &rows[skip..] {
        let time = row
            .candle
            .datetime()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| row.candle.timestamp.to_string());
        let ind = &row.indicators;
        lines.push(format!(
            "{:<17} {:>10.2} {:>10} {:>10} {:>7} {:>10} {:>10} {:>10} {:>8}",
            time,
            row.candle.close,
            cell(ind.ema7),
            cell(ind.ema25),
            cell(ind.rsi),
            cell(ind.sma20),
            cell(ind.bollinger_upper),
            cell(ind.bollinger_lower),
            cell(ind.atr),
        ));
    }
    lines.join("\n")
}

fn run_indicators(config_path: &Path, rows: usize) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    let market = build_market(&config)?;
    let series = market.fetch_candles(&config.symbol, &config.timeframe, config.candle_limit)?;
    let enriched = IndicatorEngine::new().compute(&series);
    println!("{}", format_indicator_rows(&enriched, rows));
    Ok(())
}
