//! Quote lookup port trait.

use crate::domain::error::EngineError;

pub trait QuotePort {
    /// Latest trade price for a symbol.
    fn quote(&self, symbol: &str) -> Result<f64, EngineError>;
}
