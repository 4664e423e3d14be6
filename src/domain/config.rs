//! Typed engine configuration and validation.
//!
//! Values come from a [`ConfigPort`]; anything absent falls back to the
//! built-in defaults (10% per position, 100% total exposure, 10 bps
//! round-trip commission, 0.7 actionable threshold).

use crate::domain::error::EngineError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLimits {
    /// Max notional of a single position, as a fraction of initial capital.
    pub max_position_pct: f64,
    /// Max combined open notional, as a fraction of initial capital.
    pub max_exposure_pct: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        RiskLimits {
            max_position_pct: 0.10,
            max_exposure_pct: 1.00,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub risk: RiskLimits,
    pub commission_rate: f64,
    /// Minimum confidence for a non-hold signal to become a recommendation.
    pub actionable_confidence: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            risk: RiskLimits::default(),
            commission_rate: 0.001,
            actionable_confidence: 0.7,
        }
    }
}

impl EngineConfig {
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self, EngineError> {
        let defaults = EngineConfig::default();
        let config = EngineConfig {
            risk: RiskLimits {
                max_position_pct: port.get_double(
                    "risk",
                    "max_position_pct",
                    defaults.risk.max_position_pct,
                ),
                max_exposure_pct: port.get_double(
                    "risk",
                    "max_exposure_pct",
                    defaults.risk.max_exposure_pct,
                ),
            },
            commission_rate: port.get_double("trading", "commission_rate", defaults.commission_rate),
            actionable_confidence: port.get_double(
                "trading",
                "actionable_confidence",
                defaults.actionable_confidence,
            ),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.risk.max_position_pct > 0.0 && self.risk.max_position_pct <= 1.0) {
            return Err(EngineError::ConfigInvalid {
                section: "risk".into(),
                key: "max_position_pct".into(),
                reason: format!("must be in (0, 1], got {}", self.risk.max_position_pct),
            });
        }
        if !(self.risk.max_exposure_pct > 0.0 && self.risk.max_exposure_pct <= 2.0) {
            return Err(EngineError::ConfigInvalid {
                section: "risk".into(),
                key: "max_exposure_pct".into(),
                reason: format!("must be in (0, 2], got {}", self.risk.max_exposure_pct),
            });
        }
        if self.risk.max_position_pct > self.risk.max_exposure_pct {
            return Err(EngineError::ConfigInvalid {
                section: "risk".into(),
                key: "max_position_pct".into(),
                reason: "per-position limit cannot exceed total exposure limit".into(),
            });
        }
        if !(0.0..0.1).contains(&self.commission_rate) {
            return Err(EngineError::ConfigInvalid {
                section: "trading".into(),
                key: "commission_rate".into(),
                reason: format!("must be in [0, 0.1), got {}", self.commission_rate),
            });
        }
        if !(0.0..=1.0).contains(&self.actionable_confidence) {
            return Err(EngineError::ConfigInvalid {
                section: "trading".into(),
                key: "actionable_confidence".into(),
                reason: format!("must be in [0, 1], got {}", self.actionable_confidence),
            });
        }
        Ok(())
    }
}
