//! Williams short-term momentum evaluator.
//!
//! Fades extremes: buys oversold readings (%R below -80, RSI below 35) once
//! 3-bar momentum turns up, sells overbought readings on the mirror
//! conditions. Tight 3% stops and 5% targets.

use std::collections::BTreeMap;

use crate::domain::candles::CandleSeries;
use crate::domain::indicator::{rsi, williams_r, DEFAULT_RSI_PERIOD};
use crate::domain::signal::{Action, Signal};
use crate::domain::strategy::{clamp_confidence, ratio_or_zero};

pub(crate) const MIN_BARS: usize = 20;

const WILLIAMS_PERIOD: usize = 10;
const CONFIDENCE_CAP: f64 = 0.9;
const OVERSOLD_WR: f64 = -80.0;
const OVERBOUGHT_WR: f64 = -20.0;
const OVERSOLD_RSI: f64 = 35.0;
const OVERBOUGHT_RSI: f64 = 65.0;
const STOP_PCT: f64 = 0.03;
const TARGET_PCT: f64 = 0.05;

pub(crate) fn evaluate(candles: &CandleSeries) -> Signal {
    let n = candles.len();
    if n < MIN_BARS {
        return Signal::insufficient_data("Insufficient data");
    }

    let closes = &candles.closes;
    let price = closes[n - 1];

    let wr_series = williams_r(&candles.highs, &candles.lows, closes, WILLIAMS_PERIOD);
    let rsi_series = rsi(closes, DEFAULT_RSI_PERIOD);
    let (Some(&wr), Some(&current_rsi)) = (wr_series.last(), rsi_series.last()) else {
        return Signal::insufficient_data("Insufficient data");
    };

    let momentum3 = ratio_or_zero(price - closes[n - 4], closes[n - 4]);
    let momentum5 = ratio_or_zero(price - closes[n - 6], closes[n - 6]);

    let mut indicators = BTreeMap::new();
    indicators.insert("williams_r".to_string(), wr);
    indicators.insert("rsi".to_string(), current_rsi);
    indicators.insert("momentum3".to_string(), momentum3);
    indicators.insert("momentum5".to_string(), momentum5);

    if wr < OVERSOLD_WR && current_rsi < OVERSOLD_RSI && momentum3 > 0.0 {
        let confidence =
            clamp_confidence(0.6 + (wr - OVERSOLD_WR).abs() / 20.0 * 0.3, CONFIDENCE_CAP);
        return Signal {
            action: Action::Buy,
            confidence,
            reasoning: "Oversold bounce setup with positive momentum".to_string(),
            entry_price: Some(price),
            stop_loss: Some(price * (1.0 - STOP_PCT)),
            target_price: Some(price * (1.0 + TARGET_PCT)),
            indicators,
        };
    }

    if wr > OVERBOUGHT_WR && current_rsi > OVERBOUGHT_RSI && momentum3 < 0.0 {
        let confidence =
            clamp_confidence(0.6 + (wr - OVERBOUGHT_WR).abs() / 20.0 * 0.3, CONFIDENCE_CAP);
        return Signal {
            action: Action::Sell,
            confidence,
            reasoning: "Overbought reversal setup with negative momentum".to_string(),
            entry_price: Some(price),
            stop_loss: Some(price * (1.0 + STOP_PCT)),
            target_price: Some(price * (1.0 - TARGET_PCT)),
            indicators,
        };
    }

    Signal {
        action: Action::Hold,
        confidence: 0.0,
        reasoning: "No momentum extreme".to_string(),
        entry_price: None,
        stop_loss: None,
        target_price: None,
        indicators,
    }
}
