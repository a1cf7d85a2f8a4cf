//! Engine configuration, mutable state, and run result types.

use thiserror::Error;

use crate::components::RiskOverlay;
use crate::domain::{Ledger, PositionState, SeriesError, Trade};
use crate::execution::CostModel;

/// Errors that reject a run before the first bar is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),
    #[error("initial capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
    #[error("signal count {signals} does not match bar count {bars}")]
    LengthMismatch { bars: usize, signals: usize },
    #[error("signal {index} is not aligned with its bar")]
    SignalMisaligned { index: usize },
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub cost_model: CostModel,
    pub risk: RiskOverlay,
}

impl EngineConfig {
    /// No costs and no risk rules.
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            cost_model: CostModel::frictionless(),
            risk: RiskOverlay::disabled(),
        }
    }

    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    pub fn with_risk(mut self, risk: RiskOverlay) -> Self {
        self.risk = risk;
        self
    }

    pub(crate) fn check(&self) -> Result<(), EngineError> {
        if self.initial_capital.is_finite() && self.initial_capital > 0.0 {
            Ok(())
        } else {
            Err(EngineError::InvalidCapital(self.initial_capital))
        }
    }
}

/// Mutable state threaded through the bar loop.
///
/// Owned by exactly one run; nothing here is shared between runs.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub cash: f64,
    pub position: Option<PositionState>,
    /// Value traded so far in this run; drives tiered fee discounts.
    pub cumulative_volume: f64,
    /// Last close that passed the tradable check, for marking skipped bars.
    pub last_valid_price: Option<f64>,
    pub trades: Vec<Trade>,
    pub ledger: Ledger,
    pub skipped_bars: Vec<usize>,
}

impl EngineState {
    pub fn new(initial_capital: f64, bar_count: usize) -> Self {
        Self {
            cash: initial_capital,
            position: None,
            cumulative_volume: 0.0,
            last_valid_price: None,
            trades: Vec::new(),
            ledger: Ledger::with_capacity(bar_count),
            skipped_bars: Vec::new(),
        }
    }

    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    /// Mark-to-market value of the open position at `price`.
    pub fn position_value(&self, price: f64) -> f64 {
        self.position
            .as_ref()
            .map_or(0.0, |pos| pos.market_value(price))
    }

    pub fn into_result(self, initial_capital: f64) -> RunResult {
        RunResult {
            initial_capital,
            trades: self.trades,
            ledger: self.ledger,
            skipped_bars: self.skipped_bars,
            open_position: self.position,
        }
    }
}

/// Output of a completed backtest run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub initial_capital: f64,
    pub trades: Vec<Trade>,
    pub ledger: Ledger,
    /// Bars whose reference price or volume was unusable.
    pub skipped_bars: Vec<usize>,
    /// Position still held after the last bar.
    pub open_position: Option<PositionState>,
}

impl RunResult {
    pub fn final_value(&self) -> f64 {
        self.ledger
            .last()
            .map_or(self.initial_capital, |e| e.total_value)
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}
