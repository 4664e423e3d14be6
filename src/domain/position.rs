//! Position lifecycle and P&L.
//!
//! A position is created open, mutated exactly once by a close (exit price
//! and realized P&L are set together), and never reopened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;

/// Round-trip commission rate applied on close (10 bps of combined notional).
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;

const DEFAULT_STOP_PCT: f64 = 0.05;
const DEFAULT_TAKE_PROFIT_PCT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown side: {0}")]
pub struct UnknownSide(String);

impl std::str::FromStr for Side {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            other => Err(UnknownSide(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub status: PositionStatus,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub opened_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<f64>,
}

/// What a caller asks the portfolio to open. Stops left unset get the
/// 5%/15% defaults for the side.
#[derive(Debug, Clone)]
pub struct PositionRequest {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// Summary returned by a successful close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseReceipt {
    pub id: u64,
    pub exit_price: f64,
    pub realized_pnl: f64,
    pub commission: f64,
}

impl Position {
    pub(crate) fn open(id: u64, request: PositionRequest, opened_at: DateTime<Utc>) -> Self {
        let entry = request.entry_price;
        let (default_stop, default_take) = match request.side {
            Side::Long => (
                entry * (1.0 - DEFAULT_STOP_PCT),
                entry * (1.0 + DEFAULT_TAKE_PROFIT_PCT),
            ),
            Side::Short => (
                entry * (1.0 + DEFAULT_STOP_PCT),
                entry * (1.0 - DEFAULT_TAKE_PROFIT_PCT),
            ),
        };

        Position {
            id,
            symbol: request.symbol,
            side: request.side,
            quantity: request.quantity,
            entry_price: entry,
            status: PositionStatus::Open,
            stop_loss: request.stop_loss.or(Some(default_stop)),
            take_profit: request.take_profit.or(Some(default_take)),
            opened_at,
            exit_price: None,
            closed_at: None,
            realized_pnl: None,
            commission: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Dollar exposure at entry.
    pub fn notional(&self) -> f64 {
        self.entry_price * self.quantity
    }

    /// P&L of the position at `current_price`, before commission.
    pub fn pnl(&self, current_price: f64) -> f64 {
        match self.side {
            Side::Long => (current_price - self.entry_price) * self.quantity,
            Side::Short => (self.entry_price - current_price) * self.quantity,
        }
    }

    /// Close at `exit_price`, deducting the round-trip commission.
    ///
    /// Rejects with `AlreadyClosed` (leaving the position untouched) if the
    /// position has already been closed.
    pub fn close(
        &mut self,
        exit_price: f64,
        closed_at: DateTime<Utc>,
        commission_rate: f64,
    ) -> Result<CloseReceipt, EngineError> {
        if !self.is_open() {
            return Err(EngineError::AlreadyClosed { id: self.id });
        }

        let commission =
            (self.entry_price * self.quantity + exit_price * self.quantity) * commission_rate;
        let realized = self.pnl(exit_price) - commission;

        self.status = PositionStatus::Closed;
        self.exit_price = Some(exit_price);
        self.closed_at = Some(closed_at);
        self.realized_pnl = Some(realized);
        self.commission = Some(commission);

        Ok(CloseReceipt {
            id: self.id,
            exit_price,
            realized_pnl: realized,
            commission,
        })
    }

    /// Holding time in (fractional) days; `None` while the position is open.
    pub fn holding_days(&self) -> Option<f64> {
        let closed_at = self.closed_at?;
        let held = closed_at.signed_duration_since(self.opened_at);
        Some(held.num_milliseconds() as f64 / (1000.0 * 60.0 * 60.0 * 24.0))
    }
}
