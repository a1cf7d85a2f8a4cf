//! Concrete indicator implementations.
//!
//! Each indicator implements the `Indicator` trait from `components::indicator`
//! and is computed once over the whole series before the simulation loop runs.
//! Multi-series indicators (Bollinger) are exposed as separate named instances
//! per band.

pub mod bollinger;
pub mod rsi;
pub mod sma;
pub mod stats;

pub use bollinger::{Bollinger, BollingerBand};
pub use rsi::Rsi;
pub use sma::Sma;

/// Create synthetic hourly bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high/low = body +/- 1.0,
/// volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
