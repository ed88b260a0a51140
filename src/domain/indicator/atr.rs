//! Simplified Average True Range.
//!
//! True range here is just high - low; the previous-close gap terms of the
//! textbook definition are deliberately left out. ATR is the plain rolling
//! mean of that range.
//!
//! Warmup: first (period-1) rows are undefined.

use crate::domain::candle::Candle;

pub fn calculate_atr<'a, I>(candles: I, period: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = &'a Candle>,
{
    let ranges: Vec<f64> = candles.into_iter().map(Candle::range).collect();
    if period == 0 {
        return vec![None; ranges.len()];
    }

    let mut values = Vec::with_capacity(ranges.len());
    let mut window_sum = 0.0;

    for i in 0..ranges.len() {
        window_sum += ranges[i];
        if i >= period {
            window_sum -= ranges[i - period];
        }

        if i + 1 < period {
            values.push(None);
        } else {
            values.push(Some(window_sum / period as f64));
        }
    }

    values
}
