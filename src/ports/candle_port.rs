//! Candle data access port trait.

use crate::domain::candles::CandleResponse;
use crate::domain::error::EngineError;

/// Parameters of a candle fetch: bar resolution plus an inclusive epoch-second
/// window, matching the upstream provider's query shape.
#[derive(Debug, Clone)]
pub struct CandleRequest {
    pub resolution: String,
    pub from: i64,
    pub to: i64,
}

impl CandleRequest {
    /// Daily bars covering roughly the trailing year ending at `now`.
    pub fn daily_last_year(now: i64) -> Self {
        CandleRequest {
            resolution: "D".to_string(),
            from: now - 365 * 24 * 60 * 60,
            to: now,
        }
    }
}

pub trait CandlePort {
    /// Fetch candles for a symbol. A provider-side "no data" outcome is a
    /// successful response with a non-"ok" status, not an `Err`.
    fn fetch_candles(
        &self,
        symbol: &str,
        request: &CandleRequest,
    ) -> Result<CandleResponse, EngineError>;
}
