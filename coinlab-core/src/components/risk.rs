//! Risk overlay: take-profit, stop-loss and trailing-stop exits.
//!
//! Rules are checked in a fixed order and at most one fires per bar:
//! 1. Take-profit: price >= entry * (1 + tp)
//! 2. Stop-loss: price <= entry * (1 - sl)
//! 3. Trailing stop: price <= highest_since_entry * (1 - trail)
//!
//! The overlay holds no state. The simulation loop ratchets
//! `PositionState::highest_price` before asking for a verdict.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PositionState, TradeReason};

/// Risk parameters as fractions (0.05 = 5%). Every rule is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("stop_loss must be in (0, 1), got {0}")]
    StopLoss(f64),
    #[error("take_profit must be positive and finite, got {0}")]
    TakeProfit(f64),
    #[error("trailing_stop must be in (0, 1), got {0}")]
    TrailingStop(f64),
}

/// Which rule closed the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskExit {
    TakeProfit,
    StopLoss,
    TrailingStop,
}

impl RiskExit {
    pub fn reason(self) -> TradeReason {
        match self {
            RiskExit::TakeProfit => TradeReason::TakeProfit,
            RiskExit::StopLoss => TradeReason::StopLoss,
            RiskExit::TrailingStop => TradeReason::TrailingStop,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskOverlay {
    config: RiskConfig,
}

impl RiskOverlay {
    pub fn new(config: RiskConfig) -> Result<Self, RiskError> {
        if let Some(sl) = config.stop_loss {
            if !(sl > 0.0 && sl < 1.0) {
                return Err(RiskError::StopLoss(sl));
            }
        }
        if let Some(tp) = config.take_profit {
            if !(tp > 0.0 && tp.is_finite()) {
                return Err(RiskError::TakeProfit(tp));
            }
        }
        if let Some(trail) = config.trailing_stop {
            if !(trail > 0.0 && trail < 1.0) {
                return Err(RiskError::TrailingStop(trail));
            }
        }
        Ok(Self { config })
    }

    /// An overlay with every rule disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.config.stop_loss.is_some()
            || self.config.take_profit.is_some()
            || self.config.trailing_stop.is_some()
    }

    /// Decide whether the open position must be closed at `price`.
    pub fn evaluate(&self, position: &PositionState, price: f64) -> Option<RiskExit> {
        if let Some(tp) = self.config.take_profit {
            if price >= position.entry_price * (1.0 + tp) {
                return Some(RiskExit::TakeProfit);
            }
        }
        if let Some(sl) = self.config.stop_loss {
            if price <= position.entry_price * (1.0 - sl) {
                return Some(RiskExit::StopLoss);
            }
        }
        if let Some(trail) = self.config.trailing_stop {
            if price <= position.highest_price * (1.0 - trail) {
                return Some(RiskExit::TrailingStop);
            }
        }
        None
    }
}
