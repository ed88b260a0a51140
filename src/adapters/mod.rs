//! Concrete adapter implementations for ports.

pub mod console_reporter;
pub mod csv_candle_adapter;
pub mod file_config_adapter;
#[cfg(feature = "live")]
pub mod gemini_oracle;
#[cfg(feature = "live")]
pub mod okx_adapter;
#[cfg(feature = "live")]
pub mod rss_news_adapter;
pub mod rule_oracle;
pub mod static_news_adapter;
