//! Per-bar account ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relative tolerance for the `cash + position_value == total_value` identity.
pub const RECONCILE_TOLERANCE: f64 = 1e-9;

/// Account state at the close of one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub cash: f64,
    pub position_value: f64,
    pub total_value: f64,
}

impl LedgerEntry {
    pub fn new(bar_index: usize, timestamp: DateTime<Utc>, cash: f64, position_value: f64) -> Self {
        Self {
            bar_index,
            timestamp,
            cash,
            position_value,
            total_value: cash + position_value,
        }
    }

    /// True when cash and position value add up to the reported total.
    pub fn reconciles(&self) -> bool {
        let expected = self.cash + self.position_value;
        let scale = self.total_value.abs().max(expected.abs()).max(1.0);
        (self.total_value - expected).abs() <= RECONCILE_TOLERANCE * scale
    }
}

/// Append-only sequence of ledger entries, one per bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    /// Append an entry. Debug builds assert the reconciliation identity.
    pub fn push(&mut self, entry: LedgerEntry) {
        debug_assert!(
            entry.reconciles(),
            "ledger does not reconcile at bar {}: cash={} position={} total={}",
            entry.bar_index,
            entry.cash,
            entry.position_value,
            entry.total_value
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LedgerEntry> {
        self.entries.last()
    }

    /// The equity curve.
    pub fn totals(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.total_value).collect()
    }
}
