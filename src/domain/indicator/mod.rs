//! Technical indicator pipeline.
//!
//! [`IndicatorEngine`] turns a [`CandleSeries`] into one [`IndicatorSnapshot`]
//! per candle. Values that are still inside their warmup window are `None`;
//! the engine never fabricates a number and never fails on short input.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rsi;

use serde::Serialize;
use std::fmt;

use crate::domain::candle::{Candle, CandleSeries};

pub const EMA_FAST_SPAN: usize = 7;
pub const EMA_SLOW_SPAN: usize = 25;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub ema7: Option<f64>,
    pub ema25: Option<f64>,
    pub rsi: Option<f64>,
    pub sma20: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorSnapshot {
    /// True once every indicator has left its warmup window.
    pub fn is_complete(&self) -> bool {
        self.ema7.is_some()
            && self.ema25.is_some()
            && self.rsi.is_some()
            && self.sma20.is_some()
            && self.bollinger_upper.is_some()
            && self.bollinger_lower.is_some()
            && self.atr.is_some()
    }

    /// Where `price` sits relative to the Bollinger envelope.
    pub fn band_position(&self, price: f64) -> BandPosition {
        match (self.bollinger_upper, self.bollinger_lower) {
            (Some(upper), _) if price > upper => BandPosition::BreakoutUp,
            (_, Some(lower)) if price < lower => BandPosition::BreakoutDown,
            (Some(_), Some(_)) => BandPosition::Inside,
            _ => BandPosition::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BandPosition {
    BreakoutUp,
    BreakoutDown,
    Inside,
    Unknown,
}

impl fmt::Display for BandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandPosition::BreakoutUp => write!(f, "Breakout Up"),
            BandPosition::BreakoutDown => write!(f, "Breakout Down"),
            BandPosition::Inside => write!(f, "Inside"),
            BandPosition::Unknown => write!(f, "n/a"),
        }
    }
}

/// A candle paired with the indicators computed up to and including it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCandle {
    pub candle: Candle,
    pub indicators: IndicatorSnapshot,
}

/// Stateless indicator calculator; every call depends only on its input window.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        IndicatorEngine
    }

    pub fn compute(&self, series: &CandleSeries) -> Vec<EnrichedCandle> {
        let closes = series.closes();
        let ema7 = ema::calculate_ema(&closes, EMA_FAST_SPAN);
        let ema25 = ema::calculate_ema(&closes, EMA_SLOW_SPAN);
        let rsi = rsi::calculate_rsi(&closes, RSI_PERIOD);
        let bands = bollinger::calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_MULT);
        let atr = atr::calculate_atr(series.iter(), ATR_PERIOD);

        series
            .iter()
            .enumerate()
            .map(|(i, candle)| EnrichedCandle {
                candle: candle.clone(),
                indicators: IndicatorSnapshot {
                    ema7: ema7[i],
                    ema25: ema25[i],
                    rsi: rsi[i],
                    sma20: bands[i].map(|b| b.middle),
                    bollinger_upper: bands[i].map(|b| b.upper),
                    bollinger_lower: bands[i].map(|b| b.lower),
                    atr: atr[i],
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series(closes: &[f64]) -> CandleSeries {
        CandleSeries::from_candles(closes.iter().enumerate().map(|(i, &close)| Candle {
            timestamp: i as i64 * 60_000,
            open: close,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 1.0,
        }))
    }

    #[test]
    fn ten_candles_only_ema_defined() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let rows = IndicatorEngine::new().compute(&make_series(&closes));

        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert!(row.indicators.ema7.is_some());
            assert!(row.indicators.ema25.is_some());
            assert!(row.indicators.rsi.is_none());
            assert!(row.indicators.sma20.is_none());
            assert!(row.indicators.bollinger_upper.is_none());
            assert!(row.indicators.bollinger_lower.is_none());
            assert!(row.indicators.atr.is_none());
            assert!(!row.indicators.is_complete());
        }
    }

    #[test]
    fn warmup_boundaries() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let rows = IndicatorEngine::new().compute(&make_series(&closes));

        assert!(rows[12].indicators.atr.is_none());
        assert!(rows[13].indicators.atr.is_some());
        assert!(rows[13].indicators.rsi.is_none());
        assert!(rows[14].indicators.rsi.is_some());
        assert!(rows[18].indicators.sma20.is_none());
        assert!(rows[19].indicators.sma20.is_some());
        assert!(rows[19].indicators.is_complete());
    }

    #[test]
    fn atr_uses_high_low_range() {
        let closes = vec![50.0; 20];
        let rows = IndicatorEngine::new().compute(&make_series(&closes));
        assert!((rows[19].indicators.atr.unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn empty_series_yields_no_rows() {
        assert!(IndicatorEngine::new().compute(&CandleSeries::new()).is_empty());
    }

    #[test]
    fn band_position_classification() {
        let snapshot = IndicatorSnapshot {
            bollinger_upper: Some(110.0),
            bollinger_lower: Some(90.0),
            ..Default::default()
        };
        assert_eq!(snapshot.band_position(111.0), BandPosition::BreakoutUp);
        assert_eq!(snapshot.band_position(89.0), BandPosition::BreakoutDown);
        assert_eq!(snapshot.band_position(100.0), BandPosition::Inside);
        assert_eq!(
            IndicatorSnapshot::default().band_position(100.0),
            BandPosition::Unknown
        );
    }

    #[test]
    fn band_position_display() {
        assert_eq!(BandPosition::BreakoutUp.to_string(), "Breakout Up");
        assert_eq!(BandPosition::Inside.to_string(), "Inside");
    }
}
