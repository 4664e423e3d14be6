//! Portfolio state: position ownership, risk gating, rebalancing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::config::RiskLimits;
use crate::domain::error::EngineError;
use crate::domain::position::{CloseReceipt, Position, PositionRequest};
use crate::ports::quote_port::QuotePort;

#[derive(Debug, Clone)]
pub struct Portfolio {
    pub initial_capital: f64,
    positions: Vec<Position>,
    next_id: u64,
}

/// One leg of an equal-weight rebalancing plan.
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceRecommendation {
    pub symbol: String,
    pub current_weight: f64,
    pub target_weight: f64,
    pub action: RebalanceAction,
    pub adjustment_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceAction {
    Buy,
    Sell,
}

/// Only rebalance a position whose weight drifts more than this.
const REBALANCE_DRIFT_THRESHOLD: f64 = 0.05;

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            positions: Vec::new(),
            next_id: 1,
        }
    }

    /// Open a position, subject to the risk gate: a single position may not
    /// exceed `max_position_pct` of initial capital, and total open notional
    /// may not exceed `max_exposure_pct`. Rejections are hard; the caller
    /// must resize or drop the request.
    pub fn open_position(
        &mut self,
        request: PositionRequest,
        limits: &RiskLimits,
        opened_at: DateTime<Utc>,
    ) -> Result<&Position, EngineError> {
        if !(request.quantity > 0.0) {
            return Err(EngineError::InvalidPosition {
                reason: format!("quantity must be positive, got {}", request.quantity),
            });
        }
        if !(request.entry_price > 0.0) {
            return Err(EngineError::InvalidPosition {
                reason: format!("entry price must be positive, got {}", request.entry_price),
            });
        }

        let notional = request.entry_price * request.quantity;
        let max_position = self.initial_capital * limits.max_position_pct;
        if notional > max_position {
            return Err(EngineError::PositionTooLarge {
                notional,
                max_allowed: max_position,
            });
        }

        let exposure = self.open_exposure();
        let max_exposure = self.initial_capital * limits.max_exposure_pct;
        if exposure + notional > max_exposure {
            return Err(EngineError::ExposureExceeded {
                notional,
                available: max_exposure - exposure,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        let idx = self.positions.len();
        self.positions.push(Position::open(id, request, opened_at));
        Ok(&self.positions[idx])
    }

    /// Close the position with the given id at `exit_price`.
    pub fn close_position(
        &mut self,
        id: u64,
        exit_price: f64,
        closed_at: DateTime<Utc>,
        commission_rate: f64,
    ) -> Result<CloseReceipt, EngineError> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::PositionNotFound { id })?;
        position.close(exit_price, closed_at, commission_rate)
    }

    /// Close at the current market price. Unlike the performance report,
    /// a close has a real side effect, so a failed quote aborts it.
    pub fn close_at_market(
        &mut self,
        id: u64,
        quotes: &dyn QuotePort,
        closed_at: DateTime<Utc>,
        commission_rate: f64,
    ) -> Result<CloseReceipt, EngineError> {
        let position = self
            .positions
            .iter()
            .find(|p| p.id == id)
            .ok_or(EngineError::PositionNotFound { id })?;
        let exit_price = quotes.quote(&position.symbol)?;
        self.close_position(id, exit_price, closed_at, commission_rate)
    }

    pub fn position(&self, id: u64) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_open())
    }

    pub fn closed_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| !p.is_open())
    }

    /// Combined entry notional of all open positions.
    pub fn open_exposure(&self) -> f64 {
        self.open_positions().map(|p| p.notional()).sum()
    }

    /// Equal-weight rebalancing plan over open positions. Weights are
    /// measured against initial capital; positions within the drift
    /// threshold are left alone.
    pub fn rebalance_plan(&self) -> Vec<RebalanceRecommendation> {
        let open: Vec<&Position> = self.open_positions().collect();
        if open.is_empty() {
            return Vec::new();
        }

        let target_weight = 1.0 / open.len() as f64;
        let mut plan = Vec::new();

        for position in open {
            let current_weight = position.notional() / self.initial_capital;
            let adjustment = target_weight - current_weight;
            if adjustment.abs() > REBALANCE_DRIFT_THRESHOLD {
                plan.push(RebalanceRecommendation {
                    symbol: position.symbol.clone(),
                    current_weight,
                    target_weight,
                    action: if adjustment > 0.0 {
                        RebalanceAction::Buy
                    } else {
                        RebalanceAction::Sell
                    },
                    adjustment_percent: adjustment * 100.0,
                });
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Side;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()
    }

    fn request(symbol: &str, quantity: f64, entry_price: f64) -> PositionRequest {
        PositionRequest {
            symbol: symbol.into(),
            side: Side::Long,
            quantity,
            entry_price,
            stop_loss: None,
            take_profit: None,
        }
    }

    #[test]
    fn risk_gate_rejects_oversized_position() {
        // $1,100 notional on a $10,000 portfolio: over the 10% limit.
        let mut portfolio = Portfolio::new(10_000.0);
        let result = portfolio.open_position(request("AAPL", 11.0, 100.0), &RiskLimits::default(), ts(1));
        assert!(matches!(
            result,
            Err(EngineError::PositionTooLarge { .. })
        ));
        assert_eq!(portfolio.positions().len(), 0);
    }

    #[test]
    fn risk_gate_accepts_within_limit() {
        // $900 notional on a $10,000 portfolio: fine.
        let mut portfolio = Portfolio::new(10_000.0);
        let position = portfolio
            .open_position(request("AAPL", 9.0, 100.0), &RiskLimits::default(), ts(1))
            .unwrap();
        assert_eq!(position.id, 1);
        assert_relative_eq!(position.notional(), 900.0);
    }

    #[test]
    fn risk_gate_boundary_is_exclusive() {
        // Exactly 10% is allowed; the gate only rejects above it.
        let mut portfolio = Portfolio::new(10_000.0);
        assert!(portfolio
            .open_position(request("AAPL", 10.0, 100.0), &RiskLimits::default(), ts(1))
            .is_ok());
    }

    #[test]
    fn risk_gate_rejects_exposure_overflow() {
        let mut portfolio = Portfolio::new(10_000.0);
        let limits = RiskLimits {
            max_position_pct: 1.0,
            max_exposure_pct: 1.0,
        };
        portfolio
            .open_position(request("AAPL", 95.0, 100.0), &limits, ts(1))
            .unwrap();
        let result = portfolio.open_position(request("MSFT", 10.0, 100.0), &limits, ts(2));
        assert!(matches!(
            result,
            Err(EngineError::ExposureExceeded { available, .. }) if (available - 500.0).abs() < 1e-9
        ));
    }

    #[test]
    fn closed_positions_free_exposure() {
        let mut portfolio = Portfolio::new(10_000.0);
        let limits = RiskLimits {
            max_position_pct: 1.0,
            max_exposure_pct: 1.0,
        };
        let id = portfolio
            .open_position(request("AAPL", 95.0, 100.0), &limits, ts(1))
            .unwrap()
            .id;
        portfolio.close_position(id, 105.0, ts(5), 0.001).unwrap();

        assert_relative_eq!(portfolio.open_exposure(), 0.0);
        assert!(portfolio
            .open_position(request("MSFT", 90.0, 100.0), &limits, ts(6))
            .is_ok());
    }

    #[test]
    fn invalid_quantity_rejected() {
        let mut portfolio = Portfolio::new(10_000.0);
        let result = portfolio.open_position(request("AAPL", 0.0, 100.0), &RiskLimits::default(), ts(1));
        assert!(matches!(result, Err(EngineError::InvalidPosition { .. })));
    }

    #[test]
    fn close_unknown_position() {
        let mut portfolio = Portfolio::new(10_000.0);
        let result = portfolio.close_position(42, 100.0, ts(1), 0.001);
        assert!(matches!(
            result,
            Err(EngineError::PositionNotFound { id: 42 })
        ));
    }

    #[test]
    fn double_close_through_portfolio() {
        let mut portfolio = Portfolio::new(10_000.0);
        let id = portfolio
            .open_position(request("AAPL", 9.0, 100.0), &RiskLimits::default(), ts(1))
            .unwrap()
            .id;
        portfolio.close_position(id, 110.0, ts(5), 0.001).unwrap();
        let second = portfolio.close_position(id, 120.0, ts(6), 0.001);
        assert!(matches!(second, Err(EngineError::AlreadyClosed { .. })));
    }

    #[test]
    fn close_at_market_uses_quote() {
        struct OneQuote;
        impl QuotePort for OneQuote {
            fn quote(&self, symbol: &str) -> Result<f64, EngineError> {
                if symbol == "AAPL" {
                    Ok(112.0)
                } else {
                    Err(EngineError::QuoteUnavailable {
                        symbol: symbol.to_string(),
                    })
                }
            }
        }

        let mut portfolio = Portfolio::new(10_000.0);
        let id = portfolio
            .open_position(request("AAPL", 9.0, 100.0), &RiskLimits::default(), ts(1))
            .unwrap()
            .id;
        let receipt = portfolio
            .close_at_market(id, &OneQuote, ts(5), 0.0)
            .unwrap();
        assert_relative_eq!(receipt.exit_price, 112.0);
        assert_relative_eq!(receipt.realized_pnl, 108.0);
    }

    #[test]
    fn close_at_market_aborts_without_quote() {
        struct NoQuotes;
        impl QuotePort for NoQuotes {
            fn quote(&self, symbol: &str) -> Result<f64, EngineError> {
                Err(EngineError::QuoteUnavailable {
                    symbol: symbol.to_string(),
                })
            }
        }

        let mut portfolio = Portfolio::new(10_000.0);
        let id = portfolio
            .open_position(request("AAPL", 9.0, 100.0), &RiskLimits::default(), ts(1))
            .unwrap()
            .id;
        let result = portfolio.close_at_market(id, &NoQuotes, ts(5), 0.0);
        assert!(matches!(
            result,
            Err(EngineError::QuoteUnavailable { .. })
        ));
        // Position stays open and untouched.
        assert!(portfolio.position(id).unwrap().is_open());
    }

    #[test]
    fn rebalance_plan_flags_drifted_positions() {
        let mut portfolio = Portfolio::new(10_000.0);
        let limits = RiskLimits {
            max_position_pct: 1.0,
            max_exposure_pct: 1.0,
        };
        // 40% and 5% weights against an equal-weight target of 50%.
        portfolio
            .open_position(request("AAPL", 40.0, 100.0), &limits, ts(1))
            .unwrap();
        portfolio
            .open_position(request("MSFT", 5.0, 100.0), &limits, ts(2))
            .unwrap();

        let plan = portfolio.rebalance_plan();
        assert_eq!(plan.len(), 2);

        let aapl = plan.iter().find(|r| r.symbol == "AAPL").unwrap();
        assert_eq!(aapl.action, RebalanceAction::Buy);
        assert_relative_eq!(aapl.current_weight, 0.40);
        assert_relative_eq!(aapl.target_weight, 0.50);

        let msft = plan.iter().find(|r| r.symbol == "MSFT").unwrap();
        assert_eq!(msft.action, RebalanceAction::Buy);
        assert_relative_eq!(msft.adjustment_percent, 45.0);
    }

    #[test]
    fn rebalance_plan_skips_small_drift() {
        let mut portfolio = Portfolio::new(10_000.0);
        let limits = RiskLimits {
            max_position_pct: 1.0,
            max_exposure_pct: 1.0,
        };
        // 48% and 52%: both within the 5% drift band around 50%.
        portfolio
            .open_position(request("AAPL", 48.0, 100.0), &limits, ts(1))
            .unwrap();
        portfolio
            .open_position(request("MSFT", 52.0, 100.0), &limits, ts(2))
            .unwrap();

        assert!(portfolio.rebalance_plan().is_empty());
    }

    #[test]
    fn rebalance_plan_empty_portfolio() {
        let portfolio = Portfolio::new(10_000.0);
        assert!(portfolio.rebalance_plan().is_empty());
    }
}
