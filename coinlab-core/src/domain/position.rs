//! Open-position state, owned by the simulation loop.

use serde::{Deserialize, Serialize};

/// A long position held with the full account balance.
///
/// Only exists while a position is open; the loop drops it on every exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    /// Effective (slippage-adjusted) buy price.
    pub entry_price: f64,
    /// Highest reference price seen since entry, starting at the entry bar's close.
    pub highest_price: f64,
    pub units: f64,
    /// Index of the opening BUY in the trade ledger.
    pub entry_trade: usize,
}

impl PositionState {
    pub fn open(
        entry_price: f64,
        reference_price: f64,
        units: f64,
        entry_trade: usize,
    ) -> Self {
        Self {
            entry_price,
            highest_price: reference_price,
            units,
            entry_trade,
        }
    }

    /// Ratchet the trailing high. Never moves down.
    pub fn observe(&mut self, price: f64) {
        if price > self.highest_price {
            self.highest_price = price;
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.units * price
    }
}
