//! Strategy components: indicators, signal generators, the risk overlay and
//! the factory that builds generators from configuration.

pub mod factory;
pub mod indicator;
pub mod risk;
pub mod signal;

pub use factory::{create_signal, FactoryError, StrategySpec};
pub use indicator::{Indicator, IndicatorValues};
pub use risk::{RiskConfig, RiskError, RiskExit, RiskOverlay};
pub use signal::{Intent, Signal, SignalGenerator, Transition};
