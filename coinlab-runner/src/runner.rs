//! Backtest runner: wires together configuration, engine and metrics.
//!
//! `run_backtest_from_bars()` takes pre-loaded bars and performs no I/O, so the
//! sweep can call it from many threads over the same read-only series.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coinlab_core::components::{create_signal, FactoryError};
use coinlab_core::domain::{Bar, Ledger, Trade};
use coinlab_core::engine::{pair_trades, run_backtest, EngineError, RoundTrip};

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::LoadError;
use crate::metrics::{monthly_returns, trade_stats, MonthlyReturn, PerformanceSummary, TradeStats};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub config: BacktestConfig,
    /// Strategy kind plus parameters, e.g. "rsi(period=14, oversold=30, overbought=70)".
    pub strategy_label: String,
    pub trades: Vec<Trade>,
    pub ledger: Ledger,
    /// FIFO-paired trades, including a virtual END_OF_PERIOD close if the run ended long.
    pub round_trips: Vec<RoundTrip>,
    pub summary: PerformanceSummary,
    pub trade_stats: TradeStats,
    pub monthly_returns: Vec<MonthlyReturn>,
    /// Bars whose close was unusable and were carried forward.
    pub skipped_bars: Vec<usize>,
    pub bar_count: usize,
}

impl BacktestResult {
    pub fn initial_capital(&self) -> f64 {
        self.config.initial_capital
    }

    pub fn final_value(&self) -> f64 {
        self.ledger
            .last()
            .map_or(self.config.initial_capital, |e| e.total_value)
    }
}

/// Run a backtest with pre-loaded bars: no I/O.
pub fn run_backtest_from_bars(
    config: &BacktestConfig,
    bars: &[Bar],
) -> Result<BacktestResult, RunError> {
    let engine_config = config.to_engine_config()?;
    let generator = create_signal(&config.strategy)?;
    let run_id = config.run_id()?;

    let run = run_backtest(bars, generator.as_ref(), &engine_config)?;
    let round_trips = pair_trades(&run.trades, bars);
    let summary = PerformanceSummary::compute(&run, &round_trips, config.risk_free_rate);
    let stats = trade_stats(&round_trips);
    let monthly = monthly_returns(&run.ledger);

    tracing::info!(
        run_id = %run_id,
        strategy = %generator.label(),
        trades = run.trades.len(),
        total_return_pct = summary.total_return_pct,
        "backtest complete"
    );

    Ok(BacktestResult {
        run_id,
        config: config.clone(),
        strategy_label: generator.label(),
        trades: run.trades,
        ledger: run.ledger,
        round_trips,
        summary,
        trade_stats: stats,
        monthly_returns: monthly,
        skipped_bars: run.skipped_bars,
        bar_count: bars.len(),
    })
}
