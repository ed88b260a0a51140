//! OHLCV candle and the bounded sliding window the indicators run over.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Maximum number of candles a series retains.
pub const SERIES_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// Open time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// high - low, with no previous-close gap term.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Oldest-first window of at most [`SERIES_CAPACITY`] candles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self {
            candles: VecDeque::with_capacity(SERIES_CAPACITY),
        }
    }

    /// Builds a series from oldest-first candles, keeping only the most recent
    /// [`SERIES_CAPACITY`].
    pub fn from_candles(candles: impl IntoIterator<Item = Candle>) -> Self {
        let mut series = Self::new();
        for candle in candles {
            series.push(candle);
        }
        series
    }

    /// Appends a candle, evicting the oldest once the window is full.
    pub fn push(&mut self, candle: Candle) {
        if self.candles.len() == SERIES_CAPACITY {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn ranges(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::range).collect()
    }
}
