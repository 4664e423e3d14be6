//! Strategy signal evaluators.
//!
//! One evaluator interface with three variants selected by tag. Every
//! variant consumes an OHLCV series and produces a [`Signal`]; below its
//! minimum history it returns the insufficient-data hold instead of failing.

pub mod livermore;
pub mod weinstein;
pub mod williams;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::candles::CandleSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Trend following with volume-confirmed breakouts.
    Livermore,
    /// Short-term momentum on oversold/overbought extremes.
    Williams,
    /// Stage analysis around the 30-week moving average.
    Weinstein,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Livermore,
        StrategyKind::Williams,
        StrategyKind::Weinstein,
    ];

    /// Minimum number of bars the variant needs before it will trade.
    pub fn min_history(&self) -> usize {
        match self {
            StrategyKind::Livermore => livermore::MIN_BARS,
            StrategyKind::Williams => williams::MIN_BARS,
            StrategyKind::Weinstein => weinstein::MIN_BARS,
        }
    }

    pub fn evaluate(&self, candles: &CandleSeries) -> Signal {
        match self {
            StrategyKind::Livermore => livermore::evaluate(candles),
            StrategyKind::Williams => williams::evaluate(candles),
            StrategyKind::Weinstein => weinstein::evaluate(candles),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Livermore => write!(f, "livermore"),
            StrategyKind::Williams => write!(f, "williams"),
            StrategyKind::Weinstein => write!(f, "weinstein"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy: {0}")]
pub struct UnknownStrategy(String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    /// Accepts both the short tags and the legacy full names
    /// (`jesse_livermore`, `larry_williams`, `stan_weinstein`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "livermore" | "jesse_livermore" => Ok(StrategyKind::Livermore),
            "williams" | "larry_williams" => Ok(StrategyKind::Williams),
            "weinstein" | "stan_weinstein" => Ok(StrategyKind::Weinstein),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Clamp a raw confidence formula into [0, cap]. The formulas can overshoot
/// the cap and, on extreme inputs, go negative; the bound is applied
/// unconditionally.
pub(crate) fn clamp_confidence(raw: f64, cap: f64) -> f64 {
    raw.clamp(0.0, cap)
}

/// `numerator / denominator`, with a zero denominator defined as 0.0 so no
/// NaN or infinity leaks into signal output.
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
