//! Factory: converts a `StrategySpec` into a runtime signal generator.
//!
//! Parameters are validated here so generator constructors can keep their
//! asserts as programming-error guards.

use serde::{Deserialize, Serialize};

use super::signal::{BollingerReversion, MaCrossover, RsiReversion, SignalGenerator};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors that can occur during generator construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    #[error("invalid {strategy} parameters: {reason}")]
    InvalidParams {
        strategy: &'static str,
        reason: String,
    },
}

fn invalid(strategy: &'static str, reason: impl Into<String>) -> FactoryError {
    FactoryError::InvalidParams {
        strategy,
        reason: reason.into(),
    }
}

// ─── Strategy spec ───────────────────────────────────────────────────

/// Strategy kind plus its parameters.
///
/// Serialized adjacently tagged: `{ kind = "rsi", params = { period = 14, ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum StrategySpec {
    MaCross {
        #[serde(default = "default_short_window")]
        short_window: usize,
        #[serde(default = "default_long_window")]
        long_window: usize,
    },
    Rsi {
        #[serde(default = "default_rsi_period")]
        period: usize,
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
    Bollinger {
        #[serde(default = "default_bb_window")]
        window: usize,
        #[serde(default = "default_num_std")]
        num_std: f64,
    },
}

fn default_short_window() -> usize {
    20
}
fn default_long_window() -> usize {
    50
}
fn default_rsi_period() -> usize {
    14
}
fn default_oversold() -> f64 {
    30.0
}
fn default_overbought() -> f64 {
    70.0
}
fn default_bb_window() -> usize {
    20
}
fn default_num_std() -> f64 {
    2.0
}

impl Default for StrategySpec {
    fn default() -> Self {
        StrategySpec::MaCross {
            short_window: default_short_window(),
            long_window: default_long_window(),
        }
    }
}

impl StrategySpec {
    pub fn kind(&self) -> &'static str {
        match self {
            StrategySpec::MaCross { .. } => "ma_cross",
            StrategySpec::Rsi { .. } => "rsi",
            StrategySpec::Bollinger { .. } => "bollinger",
        }
    }

    /// Check parameter ranges without building anything.
    pub fn validate(&self) -> Result<(), FactoryError> {
        let kind = self.kind();
        match *self {
            StrategySpec::MaCross {
                short_window,
                long_window,
            } => {
                if short_window == 0 {
                    return Err(invalid(kind, "short_window must be >= 1"));
                }
                if long_window <= short_window {
                    return Err(invalid(
                        kind,
                        format!("long_window ({long_window}) must exceed short_window ({short_window})"),
                    ));
                }
            }
            StrategySpec::Rsi {
                period,
                oversold,
                overbought,
            } => {
                if period == 0 {
                    return Err(invalid(kind, "period must be >= 1"));
                }
                let in_range = |v: f64| (0.0..=100.0).contains(&v);
                if !in_range(oversold) || !in_range(overbought) {
                    return Err(invalid(kind, "thresholds must lie in [0, 100]"));
                }
                if oversold >= overbought {
                    return Err(invalid(
                        kind,
                        format!("oversold ({oversold}) must be below overbought ({overbought})"),
                    ));
                }
            }
            StrategySpec::Bollinger { window, num_std } => {
                if window < 2 {
                    return Err(invalid(kind, "window must be >= 2"));
                }
                if !(num_std > 0.0 && num_std.is_finite()) {
                    return Err(invalid(kind, "num_std must be positive"));
                }
            }
        }
        Ok(())
    }
}

// ─── Signal factory ──────────────────────────────────────────────────

/// Create a signal generator from a `StrategySpec`.
pub fn create_signal(spec: &StrategySpec) -> Result<Box<dyn SignalGenerator>, FactoryError> {
    spec.validate()?;
    let generator: Box<dyn SignalGenerator> = match *spec {
        StrategySpec::MaCross {
            short_window,
            long_window,
        } => Box::new(MaCrossover::new(short_window, long_window)),
        StrategySpec::Rsi {
            period,
            oversold,
            overbought,
        } => Box::new(RsiReversion::new(period, oversold, overbought)),
        StrategySpec::Bollinger { window, num_std } => {
            Box::new(BollingerReversion::new(window, num_std))
        }
    };
    Ok(generator)
}
