//! Backtesting engine: the bar loop and its post-processing.
//!
//! The engine consumes an ordered price series and one signal per bar, then
//! walks the bars as a FLAT/LONG state machine, consulting the cost model and
//! risk overlay. Output is the trade ledger and the per-bar account ledger.

pub mod loop_runner;
pub mod state;
pub mod trade_extraction;

pub use loop_runner::{run_backtest, simulate};
pub use state::{EngineConfig, EngineError, EngineState, RunResult};
pub use trade_extraction::{pair_trades, RoundTrip};
