//! Livermore trend-following evaluator.
//!
//! Long when price rides above both moving averages with momentum, expanding
//! volume and a breakout past the recent high; short on the mirrored
//! breakdown. Stops at 5%, targets at 15%.

use std::collections::BTreeMap;

use crate::domain::candles::CandleSeries;
use crate::domain::indicator::{mean, sma};
use crate::domain::signal::{Action, Signal};
use crate::domain::strategy::{clamp_confidence, ratio_or_zero};

pub(crate) const MIN_BARS: usize = 50;

const LOOKBACK: usize = 20;
const CONFIDENCE_CAP: f64 = 0.95;
const MOMENTUM_THRESHOLD: f64 = 0.05;
const VOLUME_THRESHOLD: f64 = 1.2;
const STOP_PCT: f64 = 0.05;
const TARGET_PCT: f64 = 0.15;

pub(crate) fn evaluate(candles: &CandleSeries) -> Signal {
    let n = candles.len();
    if n < MIN_BARS {
        return Signal::insufficient_data("Insufficient data");
    }

    let closes = &candles.closes;
    let price = closes[n - 1];

    let sma20_series = sma(closes, 20);
    let sma50_series = sma(closes, 50);
    let (Some(&sma20), Some(&sma50)) = (sma20_series.last(), sma50_series.last()) else {
        return Signal::insufficient_data("Insufficient data");
    };

    let base = closes[n - LOOKBACK];
    let price_change = ratio_or_zero(price - base, base);

    let volume_ratio = ratio_or_zero(
        candles.volumes[n - 1],
        mean(&candles.volumes[n - LOOKBACK..]),
    );

    let recent_high = candles.highs[n - LOOKBACK..]
        .iter()
        .cloned()
        .fold(f64::MIN, f64::max);
    let recent_low = candles.lows[n - LOOKBACK..]
        .iter()
        .cloned()
        .fold(f64::MAX, f64::min);

    let mut indicators = BTreeMap::new();
    indicators.insert("sma20".to_string(), sma20);
    indicators.insert("sma50".to_string(), sma50);
    indicators.insert("price_change".to_string(), price_change);
    indicators.insert("volume_ratio".to_string(), volume_ratio);

    let uptrend = price > sma20 && sma20 > sma50;
    let downtrend = price < sma20 && sma20 < sma50;

    if uptrend
        && price_change > MOMENTUM_THRESHOLD
        && volume_ratio > VOLUME_THRESHOLD
        && price > recent_high * 0.98
    {
        let confidence = clamp_confidence(
            0.7 + price_change + (volume_ratio - 1.0) * 0.1,
            CONFIDENCE_CAP,
        );
        return Signal {
            action: Action::Buy,
            confidence,
            reasoning: "Strong uptrend with volume confirmation and breakout".to_string(),
            entry_price: Some(price),
            stop_loss: Some(price * (1.0 - STOP_PCT)),
            target_price: Some(price * (1.0 + TARGET_PCT)),
            indicators,
        };
    }

    if downtrend && price_change < -MOMENTUM_THRESHOLD && price < recent_low * 1.02 {
        let confidence = clamp_confidence(
            0.7 + price_change.abs() + (volume_ratio - 1.0) * 0.1,
            CONFIDENCE_CAP,
        );
        return Signal {
            action: Action::Sell,
            confidence,
            reasoning: "Downtrend confirmed with breakdown below support".to_string(),
            entry_price: Some(price),
            stop_loss: Some(price * (1.0 + STOP_PCT)),
            target_price: Some(price * (1.0 - TARGET_PCT)),
            indicators,
        };
    }

    Signal {
        action: Action::Hold,
        confidence: 0.0,
        reasoning: "No trend-following setup".to_string(),
        entry_price: None,
        stop_loss: None,
        target_price: None,
        indicators,
    }
}
