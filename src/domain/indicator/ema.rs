//! Exponential Moving Average.
//!
//! k = 2/(span+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: every row is defined.

pub fn calculate_ema(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; closes.len()];
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut values = Vec::with_capacity(closes.len());
    let mut ema = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        ema = if i == 0 {
            close
        } else {
            close * k + ema * (1.0 - k)
        };
        values.push(Some(ema));
    }

    values
}
