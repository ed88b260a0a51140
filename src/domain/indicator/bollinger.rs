//! Bollinger Bands.
//!
//! - Middle: Simple Moving Average (SMA) over n closes
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) rows are undefined.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, mult: f64) -> Vec<Option<BollingerBand>> {
    if period < 2 {
        return vec![None; closes.len()];
    }

    let mut values = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i + 1 < period {
            values.push(None);
            continue;
        }

        let window = &closes[i + 1 - period..=i];
        let middle = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|c| {
                let diff = c - middle;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;
        let stddev = variance.sqrt();

        values.push(Some(BollingerBand {
            upper: middle + mult * stddev,
            middle,
            lower: middle - mult * stddev,
        }));
    }

    values
}
