//! Domain types: bars, trades, positions and the ledger.

pub mod bar;
pub mod ledger;
pub mod position;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use ledger::{Ledger, LedgerEntry, RECONCILE_TOLERANCE};
pub use position::PositionState;
pub use series::{validate_series, SeriesError};
pub use trade::{Side, Trade, TradeReason};
