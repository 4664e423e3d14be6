//! Domain error types.

/// Top-level error type for tradesignal.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("no quote available for {symbol}")]
    QuoteUnavailable { symbol: String },

    #[error("candle series length mismatch: {reason}")]
    SeriesMismatch { reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("position notional {notional:.2} exceeds per-position limit {max_allowed:.2}")]
    PositionTooLarge { notional: f64, max_allowed: f64 },

    #[error("position notional {notional:.2} exceeds available exposure {available:.2}")]
    ExposureExceeded { notional: f64, available: f64 },

    #[error("invalid position: {reason}")]
    InvalidPosition { reason: String },

    #[error("position {id} not found")]
    PositionNotFound { id: u64 },

    #[error("position {id} is already closed")]
    AlreadyClosed { id: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EngineError> for std::process::ExitCode {
    fn from(err: &EngineError) -> Self {
        let code: u8 = match err {
            EngineError::Io(_) => 1,
            EngineError::ConfigParse { .. }
            | EngineError::ConfigMissing { .. }
            | EngineError::ConfigInvalid { .. } => 2,
            EngineError::MarketData { .. } | EngineError::QuoteUnavailable { .. } => 3,
            EngineError::SeriesMismatch { .. } | EngineError::InsufficientData { .. } => 4,
            EngineError::PositionTooLarge { .. }
            | EngineError::ExposureExceeded { .. }
            | EngineError::InvalidPosition { .. }
            | EngineError::PositionNotFound { .. }
            | EngineError::AlreadyClosed { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = EngineError::InsufficientData {
            symbol: "AAPL".into(),
            bars: 30,
            minimum: 50,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for AAPL: have 30 bars, need 50"
        );
    }

    #[test]
    fn already_closed_message() {
        let err = EngineError::AlreadyClosed { id: 7 };
        assert_eq!(err.to_string(), "position 7 is already closed");
    }

    #[test]
    fn risk_errors_share_exit_code() {
        let too_large = EngineError::PositionTooLarge {
            notional: 1100.0,
            max_allowed: 1000.0,
        };
        let exposure = EngineError::ExposureExceeded {
            notional: 500.0,
            available: 200.0,
        };
        assert_eq!(
            std::process::ExitCode::from(&too_large),
            std::process::ExitCode::from(&exposure)
        );
    }
}
