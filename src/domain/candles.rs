//! OHLCV candle series representation.
//!
//! Candles arrive from the quote provider as parallel arrays indexed by time,
//! ascending. `CandleSeries` validates the equal-length invariant once at
//! construction; everything downstream can index freely. `close[i]` is the
//! canonical price at step `i`.

use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl CandleSeries {
    pub fn new(
        opens: Vec<f64>,
        highs: Vec<f64>,
        lows: Vec<f64>,
        closes: Vec<f64>,
        volumes: Vec<f64>,
    ) -> Result<Self, EngineError> {
        let n = closes.len();
        if opens.len() != n || highs.len() != n || lows.len() != n || volumes.len() != n {
            return Err(EngineError::SeriesMismatch {
                reason: format!(
                    "o={} h={} l={} c={} v={}",
                    opens.len(),
                    highs.len(),
                    lows.len(),
                    n,
                    volumes.len()
                ),
            });
        }
        Ok(CandleSeries {
            opens,
            highs,
            lows,
            closes,
            volumes,
        })
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Close of the most recent bar.
    pub fn latest_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

/// Candle payload as returned by the quote provider.
///
/// `s` is the provider status ("ok" or "no_data"); `t` carries bar timestamps
/// when the provider supplies them. A non-"ok" status or empty arrays mean
/// "insufficient data", not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleResponse {
    pub s: String,
    #[serde(default)]
    pub o: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Vec<i64>>,
}

impl CandleResponse {
    /// Convert the wire payload into a validated series.
    ///
    /// Returns `None` when the provider reported no data or the arrays are
    /// unusable; callers treat that as an insufficient-data outcome.
    pub fn into_series(self) -> Option<CandleSeries> {
        if self.s != "ok" || self.c.is_empty() {
            return None;
        }
        CandleSeries::new(self.o, self.h, self.l, self.c, self.v).ok()
    }
}
