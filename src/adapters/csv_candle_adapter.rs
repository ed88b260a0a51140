//! CSV file candle feed.
//!
//! Reads `timestamp,open,high,low,close,volume` rows (timestamp in epoch
//! milliseconds) from a file that another process keeps appending to, and
//! serves the most recent `limit` of them on every fetch.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::domain::candle::{Candle, CandleSeries};
use crate::domain::error::TraderError;
use crate::ports::market_data_port::MarketDataPort;

pub struct CsvCandleAdapter {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CsvCandleAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> TraderError {
        TraderError::DataUnavailable {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

impl MarketDataPort for CsvCandleAdapter {
    fn fetch_candles(
        &self,
        _symbol: &str,
        _timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, TraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut candles = Vec::new();
        for result in rdr.deserialize::<CsvRow>() {
            let row = result.map_err(|e| self.unavailable(format!("CSV parse error: {e}")))?;
            candles.push(Candle {
                timestamp: row.timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        if candles.is_empty() {
            return Err(self.unavailable("no candles"));
        }

        candles.sort_by_key(|c| c.timestamp);
        let skip = candles.len().saturating_sub(limit);
        Ok(CandleSeries::from_candles(candles.into_iter().skip(skip)))
    }
}
