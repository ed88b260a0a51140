//! Market data port trait.

use crate::domain::candle::CandleSeries;
use crate::domain::error::TraderError;

pub trait MarketDataPort {
    /// Most recent `limit` candles, oldest first.
    ///
    /// Any failure, including an empty answer, is reported as
    /// [`TraderError::DataUnavailable`].
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<CandleSeries, TraderError>;
}
