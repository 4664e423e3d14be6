//! Technical indicator implementations.
//!
//! Each indicator is a pure function over price slices: same input, same
//! output, no hidden state. Outputs are shorter than the input by the warmup
//! length; a series shorter than the period yields an empty result rather
//! than an error.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod williams_r;

pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema;
pub use macd::{macd, MacdSeries};
pub use rsi::rsi;
pub use sma::sma;
pub use williams_r::williams_r;

use serde::Serialize;
use std::fmt;

use crate::domain::candles::CandleSeries;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_BOLLINGER_MULT: f64 = 2.0;

/// Arithmetic mean of a slice; 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Indicator identity + parameters, used to select a computation by tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    WilliamsR(usize),
    Macd,
    Bollinger(usize),
}

impl IndicatorKind {
    pub fn from_name(name: &str, period: usize) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sma" => Some(IndicatorKind::Sma(period)),
            "ema" => Some(IndicatorKind::Ema(period)),
            "rsi" => Some(IndicatorKind::Rsi(period)),
            "williams" => Some(IndicatorKind::WilliamsR(period)),
            "macd" => Some(IndicatorKind::Macd),
            "bollinger" => Some(IndicatorKind::Bollinger(period)),
            _ => None,
        }
    }

    pub fn compute(&self, candles: &CandleSeries) -> IndicatorOutput {
        match *self {
            IndicatorKind::Sma(period) => IndicatorOutput::Series(sma(&candles.closes, period)),
            IndicatorKind::Ema(period) => IndicatorOutput::Series(ema(&candles.closes, period)),
            IndicatorKind::Rsi(period) => IndicatorOutput::Series(rsi(&candles.closes, period)),
            IndicatorKind::WilliamsR(period) => IndicatorOutput::Series(williams_r(
                &candles.highs,
                &candles.lows,
                &candles.closes,
                period,
            )),
            IndicatorKind::Macd => IndicatorOutput::Macd(macd(
                &candles.closes,
                macd::DEFAULT_FAST,
                macd::DEFAULT_SLOW,
                macd::DEFAULT_SIGNAL,
            )),
            IndicatorKind::Bollinger(period) => IndicatorOutput::Bollinger(bollinger(
                &candles.closes,
                period,
                DEFAULT_BOLLINGER_MULT,
            )),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(period) => write!(f, "SMA({})", period),
            IndicatorKind::Ema(period) => write!(f, "EMA({})", period),
            IndicatorKind::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorKind::WilliamsR(period) => write!(f, "WILLIAMS%R({})", period),
            IndicatorKind::Macd => write!(
                f,
                "MACD({},{},{})",
                macd::DEFAULT_FAST,
                macd::DEFAULT_SLOW,
                macd::DEFAULT_SIGNAL
            ),
            IndicatorKind::Bollinger(period) => {
                write!(f, "BOLLINGER({},{})", period, DEFAULT_BOLLINGER_MULT)
            }
        }
    }
}

/// Output of an indicator computation, shaped by indicator family.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IndicatorOutput {
    Series(Vec<f64>),
    Macd(MacdSeries),
    Bollinger(BollingerBands),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_series(n: usize) -> CandleSeries {
        CandleSeries::new(
            vec![100.0; n],
            vec![101.0; n],
            vec![99.0; n],
            vec![100.0; n],
            vec![1000.0; n],
        )
        .unwrap()
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_name_recognizes_families() {
        assert_eq!(
            IndicatorKind::from_name("sma", 20),
            Some(IndicatorKind::Sma(20))
        );
        assert_eq!(
            IndicatorKind::from_name("WILLIAMS", 10),
            Some(IndicatorKind::WilliamsR(10))
        );
        assert_eq!(
            IndicatorKind::from_name("macd", 0),
            Some(IndicatorKind::Macd)
        );
        assert_eq!(IndicatorKind::from_name("vwap", 20), None);
    }

    #[test]
    fn compute_dispatches_series_shape() {
        let candles = flat_series(30);
        match IndicatorKind::Sma(20).compute(&candles) {
            IndicatorOutput::Series(values) => assert_eq!(values.len(), 11),
            other => panic!("expected series output, got {:?}", other),
        }
    }

    #[test]
    fn compute_dispatches_bollinger_shape() {
        let candles = flat_series(25);
        match IndicatorKind::Bollinger(20).compute(&candles) {
            IndicatorOutput::Bollinger(bands) => {
                assert_eq!(bands.middle.len(), 6);
                assert_eq!(bands.upper.len(), bands.lower.len());
            }
            other => panic!("expected bollinger output, got {:?}", other),
        }
    }

    #[test]
    fn display_formats() {
        assert_eq!(IndicatorKind::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorKind::Macd.to_string(), "MACD(12,26,9)");
        assert_eq!(IndicatorKind::Bollinger(20).to_string(), "BOLLINGER(20,2)");
    }
}
