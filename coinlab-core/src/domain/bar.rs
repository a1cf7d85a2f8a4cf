//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle for a fixed interval.
///
/// The close is the reference price for every decision and execution the
/// engine makes on this bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Reference price used for signals, risk checks and fills.
    pub fn reference_price(&self) -> f64 {
        self.close
    }

    /// True when the close can be traded against: finite and strictly positive.
    pub fn has_tradable_price(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }

    /// True when the volume is finite and strictly positive.
    pub fn has_usable_volume(&self) -> bool {
        self.volume.is_finite() && self.volume > 0.0
    }

    /// Basic OHLC sanity check: high >= low and the body lies inside the range.
    pub fn is_sane(&self) -> bool {
        if !self.has_tradable_price() || self.open.is_nan() || self.high.is_nan() || self.low.is_nan()
        {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
