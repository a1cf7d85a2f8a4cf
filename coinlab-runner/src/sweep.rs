//! Parameter sweep over a grid of strategy parameters.
//!
//! Each grid point is an independent engine run over the same read-only bars,
//! so points run in parallel with rayon unless parallelism is switched off.

use std::cmp::Ordering;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use coinlab_core::components::StrategySpec;
use coinlab_core::domain::{validate_series, Bar};
use coinlab_core::engine::EngineError;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::metrics::{PerformanceSummary, TradeStats};
use crate::runner::{run_backtest_from_bars, RunError};

/// Parameter grid specification, one list per parameter.
///
/// ```toml
/// kind = "ma_cross"
/// short_window = [5, 10, 20]
/// long_window = [30, 50, 100]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamGrid {
    MaCross {
        short_window: Vec<usize>,
        long_window: Vec<usize>,
    },
    Rsi {
        period: Vec<usize>,
        oversold: Vec<f64>,
        overbought: Vec<f64>,
    },
    Bollinger {
        window: Vec<usize>,
        num_std: Vec<f64>,
    },
}

impl ParamGrid {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Number of raw combinations, invalid ones included.
    pub fn size(&self) -> usize {
        match self {
            ParamGrid::MaCross {
                short_window,
                long_window,
            } => short_window.len() * long_window.len(),
            ParamGrid::Rsi {
                period,
                oversold,
                overbought,
            } => period.len() * oversold.len() * overbought.len(),
            ParamGrid::Bollinger { window, num_std } => window.len() * num_std.len(),
        }
    }

    /// Cartesian product of the lists, skipping invalid combinations.
    pub fn expand(&self) -> Vec<StrategySpec> {
        let mut specs = Vec::with_capacity(self.size());
        match self {
            ParamGrid::MaCross {
                short_window,
                long_window,
            } => {
                for &short_window in short_window {
                    for &long_window in long_window {
                        specs.push(StrategySpec::MaCross {
                            short_window,
                            long_window,
                        });
                    }
                }
            }
            ParamGrid::Rsi {
                period,
                oversold,
                overbought,
            } => {
                for &period in period {
                    for &oversold in oversold {
                        for &overbought in overbought {
                            specs.push(StrategySpec::Rsi {
                                period,
                                oversold,
                                overbought,
                            });
                        }
                    }
                }
            }
            ParamGrid::Bollinger { window, num_std } => {
                for &window in window {
                    for &num_std in num_std {
                        specs.push(StrategySpec::Bollinger { window, num_std });
                    }
                }
            }
        }

        let total = specs.len();
        specs.retain(|spec| spec.validate().is_ok());
        if specs.len() < total {
            tracing::debug!(skipped = total - specs.len(), "dropped invalid grid points");
        }
        specs
    }
}

/// Outcome of one grid point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub strategy: StrategySpec,
    pub label: String,
    pub run_id: RunId,
    pub summary: PerformanceSummary,
    pub trade_stats: TradeStats,
}

/// Sweep results, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResults {
    pub entries: Vec<SweepEntry>,
}

impl SweepResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn top(&self, n: usize) -> &[SweepEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

/// Parameter sweep executor.
pub struct ParamSweep<'a> {
    bars: &'a [Bar],
    base: &'a BacktestConfig,
    parallel: bool,
}

impl<'a> ParamSweep<'a> {
    /// Sweep over `bars`; every point inherits everything but the strategy from `base`.
    pub fn new(bars: &'a [Bar], base: &'a BacktestConfig) -> Self {
        Self {
            bars,
            base,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every valid grid point, sorted by total return, then Sharpe, then label.
    pub fn sweep(&self, grid: &ParamGrid) -> Result<SweepResults, RunError> {
        validate_series(self.bars).map_err(EngineError::from)?;
        self.base.validate()?;

        let specs = grid.expand();
        tracing::info!(
            points = specs.len(),
            parallel = self.parallel,
            "starting parameter sweep"
        );

        let mut entries: Vec<SweepEntry> = if self.parallel {
            specs
                .par_iter()
                .map(|spec| self.run_point(spec))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            specs
                .iter()
                .map(|spec| self.run_point(spec))
                .collect::<Result<Vec<_>, _>>()?
        };
        entries.sort_by(rank);

        Ok(SweepResults { entries })
    }

    fn run_point(&self, spec: &StrategySpec) -> Result<SweepEntry, RunError> {
        let config = BacktestConfig {
            strategy: spec.clone(),
            ..self.base.clone()
        };
        let result = run_backtest_from_bars(&config, self.bars)?;
        Ok(SweepEntry {
            strategy: spec.clone(),
            label: result.strategy_label,
            run_id: result.run_id,
            summary: result.summary,
            trade_stats: result.trade_stats,
        })
    }
}

/// Higher return first, then higher Sharpe, then label.
fn rank(a: &SweepEntry, b: &SweepEntry) -> Ordering {
    b.summary
        .total_return_pct
        .total_cmp(&a.summary.total_return_pct)
        .then_with(|| b.summary.sharpe_ratio.total_cmp(&a.summary.sharpe_ratio))
        .then_with(|| a.label.cmp(&b.label))
}
