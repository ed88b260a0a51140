//! Validated runtime configuration.
//!
//! Built once from a [`ConfigPort`] and handed to the decision loop by
//! reference; nothing reads configuration from globals.

use std::time::Duration;

use crate::domain::candle::SERIES_CAPACITY;
use crate::domain::context::DEFAULT_LESSON_CONTEXT;
use crate::domain::error::TraderError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOL: &str = "BTC/USDT";
pub const DEFAULT_TIMEFRAME: &str = "5m";
pub const DEFAULT_OKX_URL: &str = "https://www.okx.com";
pub const DEFAULT_RSS_URL: &str = concat!(
    "https://news.google.com/rss/search",
    "?q=bitcoin+crypto+market+when:1h&hl=en-US&gl=US&ceid=US:en"
);
pub const NO_NEWS_PLACEHOLDER: &str = "No major news in the last hour.";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq)]
pub enum MarketSource {
    Okx { base_url: String },
    Csv { path: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsSource {
    Rss { url: String },
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OracleProvider {
    Gemini { model: String, api_key_env: String },
    Rule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    pub retry_delay: Duration,
    pub lesson_context: usize,
    /// 0 keeps every lesson.
    pub max_lessons: usize,
}

impl Default for LoopSettings {
    fn default() -> Self {
        LoopSettings {
            poll_interval: Duration::from_secs(60),
            retry_delay: Duration::from_secs(10),
            lesson_context: DEFAULT_LESSON_CONTEXT,
            max_lessons: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderConfig {
    pub symbol: String,
    pub timeframe: String,
    pub candle_limit: usize,
    pub market_source: MarketSource,
    pub initial_balance: f64,
    pub initial_score: i64,
    pub loop_settings: LoopSettings,
    pub news_source: NewsSource,
    pub max_headlines: usize,
    pub news_placeholder: String,
    pub oracle: OracleProvider,
    pub oracle_timeout: Duration,
    pub clear_screen: bool,
}

impl Default for TraderConfig {
    fn default() -> Self {
        TraderConfig {
            symbol: DEFAULT_SYMBOL.to_string(),
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            candle_limit: SERIES_CAPACITY,
            market_source: MarketSource::Okx {
                base_url: DEFAULT_OKX_URL.to_string(),
            },
            initial_balance: 10000.0,
            initial_score: 100,
            loop_settings: LoopSettings::default(),
            news_source: NewsSource::Rss {
                url: DEFAULT_RSS_URL.to_string(),
            },
            max_headlines: 3,
            news_placeholder: NO_NEWS_PLACEHOLDER.to_string(),
            oracle: OracleProvider::Gemini {
                model: DEFAULT_MODEL.to_string(),
                api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            },
            oracle_timeout: Duration::from_secs(30),
            clear_screen: false,
        }
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> TraderError {
    TraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<u64, TraderError> {
    let value = config.get_int(section, key, default);
    u64::try_from(value).map_err(|_| invalid(section, key, &format!("{key} must be non-negative")))
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl TraderConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TraderError> {
        let defaults = TraderConfig::default();

        let symbol = string_or(config, "market", "symbol", DEFAULT_SYMBOL);
        if !symbol.contains('/') {
            return Err(invalid("market", "symbol", "symbol must look like BASE/QUOTE"));
        }
        let timeframe = string_or(config, "market", "timeframe", DEFAULT_TIMEFRAME);

        let candle_limit =
            non_negative(config, "market", "candle_limit", SERIES_CAPACITY as i64)? as usize;
        if candle_limit == 0 || candle_limit > SERIES_CAPACITY {
            return Err(invalid(
                "market",
                "candle_limit",
                &format!("candle_limit must be between 1 and {SERIES_CAPACITY}"),
            ));
        }

        let market_kind = string_or(config, "market", "source", "okx").to_lowercase();
        let market_source = match market_kind.as_str() {
            "okx" => MarketSource::Okx {
                base_url: string_or(config, "market", "base_url", DEFAULT_OKX_URL),
            },
            "csv" => MarketSource::Csv {
                path: config
                    .get_string("market", "csv_path")
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| missing("market", "csv_path"))?,
            },
            other => {
                let reason = format!("unknown market source `{other}`");
                return Err(invalid("market", "source", &reason));
            }
        };

        let initial_balance =
            config.get_double("account", "initial_balance", defaults.initial_balance);
        if initial_balance <= 0.0 || !initial_balance.is_finite() {
            return Err(invalid("account", "initial_balance", "initial_balance must be positive"));
        }
        let initial_score = config.get_int("account", "initial_score", defaults.initial_score);

        let loop_settings = LoopSettings {
            poll_interval: Duration::from_secs(non_negative(
                config,
                "loop",
                "poll_interval_secs",
                60,
            )?),
            retry_delay: Duration::from_secs(non_negative(config, "loop", "retry_delay_secs", 10)?),
            lesson_context: non_negative(
                config,
                "loop",
                "lesson_context",
                DEFAULT_LESSON_CONTEXT as i64,
            )? as usize,
            max_lessons: non_negative(config, "loop", "max_lessons", 0)? as usize,
        };

        let news_kind = string_or(config, "news", "source", "rss").to_lowercase();
        let news_source = match news_kind.as_str() {
            "rss" => NewsSource::Rss {
                url: string_or(config, "news", "rss_url", DEFAULT_RSS_URL),
            },
            "static" => NewsSource::Static,
            other => {
                return Err(invalid("news", "source", &format!("unknown news source `{other}`")));
            }
        };
        let max_headlines = non_negative(config, "news", "max_headlines", 3)? as usize;
        let news_placeholder = string_or(config, "news", "placeholder", NO_NEWS_PLACEHOLDER);

        let provider = string_or(config, "oracle", "provider", "gemini").to_lowercase();
        let oracle = match provider.as_str() {
            "gemini" => OracleProvider::Gemini {
                model: string_or(config, "oracle", "model", DEFAULT_MODEL),
                api_key_env: string_or(config, "oracle", "api_key_env", DEFAULT_API_KEY_ENV),
            },
            "rule" => OracleProvider::Rule,
            other => {
                let reason = format!("unknown oracle provider `{other}`");
                return Err(invalid("oracle", "provider", &reason));
            }
        };
        let oracle_timeout =
            Duration::from_secs(non_negative(config, "oracle", "timeout_secs", 30)?);

        let clear_screen = config.get_bool("display", "clear_screen", false);

        Ok(TraderConfig {
            symbol,
            timeframe,
            candle_limit,
            market_source,
            initial_balance,
            initial_score,
            loop_settings,
            news_source,
            max_headlines,
            news_placeholder,
            oracle,
            oracle_timeout,
            clear_screen,
        })
    }
}
