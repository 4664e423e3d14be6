//! Exponential Moving Average.
//!
//! k = 2/(period+1); seeded with the SMA of the first `period` values, then
//! EMA[i] = value[i]*k + EMA[i-1]*(1-k).
//! Output length: len - period + 1; empty when len < period.

/// Rolling exponential moving average over `values`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out.push(seed);

    let mut current = seed;
    for &value in &values[period..] {
        current = value * k + current * (1.0 - k);
        out.push(current);
    }

    out
}
