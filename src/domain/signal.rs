//! Trading signal and recommendation types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::strategy::StrategyKind;

/// How long a persisted recommendation stays valid.
pub const RECOMMENDATION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
            Action::Hold => write!(f, "hold"),
        }
    }
}

/// Output of a strategy evaluation. Immutable once returned; price fields are
/// absent for a hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub action: Action,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    pub indicators: BTreeMap<String, f64>,
}

impl Signal {
    /// The no-trade signal returned whenever a strategy lacks history.
    pub fn insufficient_data(reasoning: &str) -> Self {
        Signal {
            action: Action::Hold,
            confidence: 0.0,
            reasoning: reasoning.to_string(),
            entry_price: None,
            stop_loss: None,
            target_price: None,
            indicators: BTreeMap::new(),
        }
    }

    /// A signal is actionable when it calls for a trade with confidence at or
    /// above `threshold`. Only actionable signals become recommendations.
    pub fn is_actionable(&self, threshold: f64) -> bool {
        self.action != Action::Hold && self.confidence >= threshold
    }
}

/// An actionable signal snapshotted for persistence, valid for 24 hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub action: Action,
    pub confidence: f64,
    pub reasoning: String,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub target_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Recommendation {
    /// Build a recommendation from an actionable signal; `None` otherwise.
    pub fn from_signal(
        symbol: &str,
        strategy: StrategyKind,
        signal: &Signal,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if !signal.is_actionable(threshold) {
            return None;
        }
        Some(Recommendation {
            symbol: symbol.to_string(),
            strategy,
            action: signal.action,
            confidence: signal.confidence,
            reasoning: signal.reasoning.clone(),
            entry_price: signal.entry_price,
            stop_loss: signal.stop_loss,
            target_price: signal.target_price,
            created_at: now,
            expires_at: now + Duration::hours(RECOMMENDATION_TTL_HOURS),
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
