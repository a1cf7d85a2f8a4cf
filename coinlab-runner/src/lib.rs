//! CoinLab Runner: configuration, data loading, metrics, sweeps and export.
//!
//! This crate builds on `coinlab-core` to provide:
//! - TOML configuration bundle with a deterministic run id
//! - Bar loading from CSV and seeded synthetic data
//! - Single-backtest runner with trade pairing and performance metrics
//! - Parallel parameter sweeps
//! - CSV/JSON artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_bars_csv, read_bars, synthetic_bars, LoadError};
pub use export::{export_run, ArtifactPaths};
pub use metrics::{CostBreakdown, MonthlyReturn, PerformanceSummary, TradeStats};
pub use runner::{run_backtest_from_bars, BacktestResult, RunError};
pub use sweep::{ParamGrid, ParamSweep, SweepEntry, SweepResults};
