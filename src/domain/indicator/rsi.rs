//! RSI (Relative Strength Index).
//!
//! Windowed variant: for each step, average gain and average loss are the
//! simple means of the trailing `period` price changes, and
//! RSI = 100 - 100/(1 + avg_gain/avg_loss).
//! If avg_loss == 0, RS is pinned to the sentinel 100 (not infinity).
//!
//! The window ends at the previous change, so the output lags the newest
//! change by one step. Output length: (len - 1) - period; empty when the
//! series has fewer than period + 2 values.

use crate::domain::indicator::mean;

/// Rolling RSI over `values`. Results are always within [0, 100].
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < 2 {
        return Vec::new();
    }

    let changes = values.len() - 1;
    let mut gains = Vec::with_capacity(changes);
    let mut losses = Vec::with_capacity(changes);

    for pair in values.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    if changes <= period {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(changes - period);
    for i in period..changes {
        let avg_gain = mean(&gains[i - period..i]);
        let avg_loss = mean(&losses[i - period..i]);

        let rs = if avg_loss == 0.0 {
            100.0
        } else {
            avg_gain / avg_loss
        };
        out.push(100.0 - 100.0 / (1.0 + rs));
    }

    out
}
