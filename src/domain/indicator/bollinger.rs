//! Bollinger Bands.
//!
//! Middle = SMA(period); upper/lower = middle ± mult × population stddev
//! (divides by N, not N-1) over the same window.
//! Output length: len - period + 1; empty when len < period.

use serde::Serialize;

use crate::domain::indicator::{mean, sma};

#[derive(Debug, Clone, Serialize)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger(values: &[f64], period: usize, mult: f64) -> BollingerBands {
    let middle = sma(values, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (band_idx, &mid) in middle.iter().enumerate() {
        let window = &values[band_idx..band_idx + period];
        let m = mean(window);
        let variance = window.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / period as f64;
        let stddev = variance.sqrt();

        upper.push(mid + mult * stddev);
        lower.push(mid - mult * stddev);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
