//! MACD (Moving Average Convergence Divergence).
//!
//! MACD line = EMA(fast) - EMA(slow), aligned on the slow warmup.
//! Signal line = EMA(signal) of the MACD line.
//! Histogram = MACD line - signal line, aligned on the signal warmup.
//!
//! Default parameters: fast=12, slow=26, signal=9.

use serde::Serialize;

use crate::domain::indicator::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// MACD output. The three series have different warmups: `signal` and
/// `histogram` start `signal_period - 1` steps after `macd`.
#[derive(Debug, Clone, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow {
        return MacdSeries {
            macd: Vec::new(),
            signal: Vec::new(),
            histogram: Vec::new(),
        };
    }

    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);

    // Both EMAs end at the last bar; the fast one starts earlier. Drop its
    // head so the subtraction lines up bar-for-bar.
    let offset = slow - fast;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, &slow_v)| ema_fast[i + offset] - slow_v)
        .collect();

    let signal_line = ema(&macd_line, signal_period);

    let hist_offset = signal_period - 1;
    let histogram: Vec<f64> = signal_line
        .iter()
        .enumerate()
        .map(|(i, &sig)| macd_line[i + hist_offset] - sig)
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}
