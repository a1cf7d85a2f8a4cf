//! Execution costs: fee schedules, slippage models and exchange profiles.

pub mod cost_model;
pub mod exchange;
pub mod fee;
pub mod slippage;

pub use cost_model::{apply_slippage, CostError, CostMode, CostModel, CostSpec, FeeValues, Quote};
pub use exchange::{volatility_coefficient, ExchangeProfile, ExchangeRegistry};
pub use fee::{FeeModel, FeeSchedule, OrderKind, VolumeTier};
pub use slippage::{SlippageModel, MAX_SLIPPAGE, SLIPPAGE_WINDOW};
