//! Trade pairing: matches BUYs with SELLs into round trips.
//!
//! Post-processes the trade ledger after the bar loop completes. Pairing is a
//! FIFO queue: each SELL closes the oldest open BUY. A BUY still open at the
//! end is closed virtually at the last tradable close with reason
//! END_OF_PERIOD, no fee and no slippage. The virtual close never touches the
//! ledger.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Side, Trade, TradeReason};

/// A BUY and the SELL that closed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub entry: Trade,
    pub exit: Trade,
    /// `(exit.value - exit.fee) - (entry.value + entry.fee)`
    pub profit: f64,
}

impl RoundTrip {
    fn new(entry: Trade, exit: Trade) -> Self {
        let profit = exit.net_cash() - entry.net_cash();
        Self {
            entry,
            exit,
            profit,
        }
    }

    /// True when the exit was synthesized at the end of the run.
    pub fn is_virtual(&self) -> bool {
        self.exit.is_virtual()
    }

    pub fn bars_held(&self) -> usize {
        self.exit.bar_index.saturating_sub(self.entry.bar_index)
    }

    /// Profit relative to the cash committed at entry.
    pub fn return_pct(&self) -> f64 {
        let committed = self.entry.net_cash();
        if committed == 0.0 {
            return 0.0;
        }
        self.profit / committed * 100.0
    }

    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }
}

/// Pair `trades` first-in first-out, closing leftovers against `bars`.
pub fn pair_trades(trades: &[Trade], bars: &[Bar]) -> Vec<RoundTrip> {
    let mut open: VecDeque<&Trade> = VecDeque::new();
    let mut pairs = Vec::new();

    for trade in trades {
        match trade.side {
            Side::Buy => open.push_back(trade),
            Side::Sell => match open.pop_front() {
                Some(entry) => pairs.push(RoundTrip::new(entry.clone(), trade.clone())),
                None => tracing::warn!(
                    bar = trade.bar_index,
                    "SELL without an open BUY, ignored for pairing"
                ),
            },
        }
    }

    if open.is_empty() {
        return pairs;
    }

    let Some((index, mark)) = bars
        .iter()
        .enumerate()
        .rev()
        .find(|(_, b)| b.has_tradable_price())
    else {
        return pairs;
    };

    for entry in open {
        let exit = virtual_close(entry, index, mark);
        pairs.push(RoundTrip::new(entry.clone(), exit));
    }
    pairs
}

fn virtual_close(entry: &Trade, bar_index: usize, bar: &Bar) -> Trade {
    let price = bar.reference_price();
    let value = entry.units * price;
    Trade {
        bar_index,
        timestamp: bar.timestamp,
        side: Side::Sell,
        reference_price: price,
        effective_price: price,
        units: entry.units,
        value,
        notional_value: value,
        fee: 0.0,
        reason: TradeReason::EndOfPeriod,
        realized_profit: Some(value - entry.net_cash()),
    }
}
