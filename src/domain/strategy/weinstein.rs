//! Weinstein stage-analysis evaluator.
//!
//! Classifies the market into one of four stages around the 30-week
//! (150-bar) moving average, buys early Stage 2 breakouts on expanding
//! volume and sells Stage 3/4 breakdowns. Stops sit below the MA (or 8%),
//! targets at 25%.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::candles::CandleSeries;
use crate::domain::indicator::{mean, sma};
use crate::domain::signal::{Action, Signal};
use crate::domain::strategy::{clamp_confidence, ratio_or_zero};

pub(crate) const MIN_BARS: usize = 150;

/// Bars between the two MA-150 samples used for the slope.
const SLOPE_LOOKBACK: usize = 10;
const BUY_CONFIDENCE_CAP: f64 = 0.95;
const SELL_CONFIDENCE_CAP: f64 = 0.9;
const VOLUME_THRESHOLD: f64 = 1.3;

/// Weinstein market stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Accumulation,
    Advancing,
    Distribution,
    Declining,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Accumulation => 1,
            Stage::Advancing => 2,
            Stage::Distribution => 3,
            Stage::Declining => 4,
        }
    }

    /// Classification in priority order; anything unclassified is Stage 1.
    fn classify(price: f64, sma150: f64, sma50: f64, slope: f64) -> Self {
        if price > sma150 && slope > 0.02 && price > sma50 {
            Stage::Advancing
        } else if price > sma150 && slope < 0.01 && price < sma50 {
            Stage::Distribution
        } else if price < sma150 && slope < -0.02 {
            Stage::Declining
        } else {
            Stage::Accumulation
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

pub(crate) fn evaluate(candles: &CandleSeries) -> Signal {
    let n = candles.len();
    if n < MIN_BARS {
        return Signal::insufficient_data("Insufficient data for stage analysis");
    }

    let closes = &candles.closes;
    let price = closes[n - 1];

    let sma150_series = sma(closes, 150);
    // The slope needs a tenth MA-150 sample; without it the lookback would
    // run off the front of the series.
    if sma150_series.len() < SLOPE_LOOKBACK {
        return Signal::insufficient_data("Insufficient data for stage analysis");
    }

    let sma150 = sma150_series[sma150_series.len() - 1];
    let slope_base = sma150_series[sma150_series.len() - SLOPE_LOOKBACK];
    let slope = ratio_or_zero(sma150 - slope_base, slope_base);

    let sma50_series = sma(closes, 50);
    let Some(&sma50) = sma50_series.last() else {
        return Signal::insufficient_data("Insufficient data for stage analysis");
    };

    let recent_volume = mean(&candles.volumes[n - 10..]);
    let base_volume = mean(&candles.volumes[n - 50..]);
    let volume_increase = ratio_or_zero(recent_volume, base_volume);

    let stage = Stage::classify(price, sma150, sma50, slope);

    let mut indicators = BTreeMap::new();
    indicators.insert("stage".to_string(), stage.number() as f64);
    indicators.insert("sma150".to_string(), sma150);
    indicators.insert("sma50".to_string(), sma50);
    indicators.insert("ma150_slope".to_string(), slope);
    indicators.insert("volume_increase".to_string(), volume_increase);

    if stage == Stage::Advancing && price > sma150 * 1.02 && volume_increase > VOLUME_THRESHOLD {
        let confidence = clamp_confidence(
            0.7 + slope * 5.0 + (volume_increase - 1.0) * 0.2,
            BUY_CONFIDENCE_CAP,
        );
        return Signal {
            action: Action::Buy,
            confidence,
            reasoning: "Stage 2 breakout with volume confirmation".to_string(),
            entry_price: Some(price),
            stop_loss: Some((price * 0.92).min(sma150 * 0.98)),
            target_price: Some(price * 1.25),
            indicators,
        };
    }

    if matches!(stage, Stage::Distribution | Stage::Declining) && price < sma150 * 0.98 {
        let confidence = clamp_confidence(0.7 + slope.abs() * 5.0, SELL_CONFIDENCE_CAP);
        return Signal {
            action: Action::Sell,
            confidence,
            reasoning: format!("Stage {} - Distribution/Decline phase", stage),
            entry_price: Some(price),
            stop_loss: Some((price * 1.08).max(sma150 * 1.02)),
            target_price: Some(price * 0.75),
            indicators,
        };
    }

    Signal {
        action: Action::Hold,
        confidence: 0.0,
        reasoning: format!("Stage {} - no entry or exit condition", stage),
        entry_price: None,
        stop_loss: None,
        target_price: None,
        indicators,
    }
}
