//! Multi-symbol signal evaluation.
//!
//! Runs one strategy across a symbol list, skipping symbols whose data is
//! missing or too short. A failure on one symbol never aborts the rest of
//! the batch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::config::EngineConfig;
use crate::domain::signal::{Recommendation, Signal};
use crate::domain::strategy::StrategyKind;
use crate::ports::candle_port::{CandlePort, CandleRequest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse a comma-separated symbol list: trimmed, uppercased, no duplicates.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if seen.contains(&symbol) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        seen.insert(symbol.clone());
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    FetchFailed { detail: String },
    NoData,
    InsufficientBars { bars: usize, minimum: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolSignal {
    pub symbol: String,
    pub signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub strategy: StrategyKind,
    pub signals: Vec<SymbolSignal>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Evaluate `strategy` for every symbol, one candle fetch each. Actionable
/// signals carry a recommendation stamped at `now`.
pub fn evaluate_symbols(
    port: &dyn CandlePort,
    symbols: &[String],
    strategy: StrategyKind,
    request: &CandleRequest,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> BatchOutcome {
    let mut signals = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let response = match port.fetch_candles(symbol, request) {
            Ok(response) => response,
            Err(e) => {
                warn!(%symbol, error = %e, "skipping symbol: candle fetch failed");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::FetchFailed {
                        detail: e.to_string(),
                    },
                });
                continue;
            }
        };

        let Some(series) = response.into_series() else {
            warn!(%symbol, "skipping symbol: no candle data");
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::NoData,
            });
            continue;
        };

        let minimum = strategy.min_history();
        if series.len() < minimum {
            warn!(
                %symbol,
                bars = series.len(),
                minimum,
                "skipping symbol: insufficient history"
            );
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason: SkipReason::InsufficientBars {
                    bars: series.len(),
                    minimum,
                },
            });
            continue;
        }

        let signal = strategy.evaluate(&series);
        let recommendation = Recommendation::from_signal(
            symbol,
            strategy,
            &signal,
            config.actionable_confidence,
            now,
        );
        signals.push(SymbolSignal {
            symbol: symbol.clone(),
            signal,
            recommendation,
        });
    }

    if !skipped.is_empty() {
        info!(
            evaluated = signals.len(),
            skipped = skipped.len(),
            %strategy,
            "batch evaluation finished with skips"
        );
    }

    BatchOutcome {
        strategy,
        signals,
        skipped,
    }
}
