//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! They are computed once over the whole series and then read by index.

use crate::domain::Bar;
use std::collections::{BTreeMap, HashMap};

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values should be `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Container for precomputed indicator values, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Compute `indicator` over `bars` and store it under `field`.
    pub fn compute_into(&mut self, field: &str, indicator: &dyn Indicator, bars: &[Bar]) {
        self.insert(field, indicator.compute(bars));
    }

    /// Get the indicator value at a specific bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Get the full series for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    /// Every field's value at one bar, in name order.
    pub fn snapshot(&self, bar_index: usize) -> BTreeMap<String, f64> {
        self.series
            .iter()
            .filter_map(|(name, values)| values.get(bar_index).map(|v| (name.clone(), *v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert("rsi", vec![f64::NAN, 40.0, 55.0]);
        assert_eq!(iv.get("rsi", 1), Some(40.0));
        assert_eq!(iv.get("rsi", 3), None);
        assert_eq!(iv.get("missing", 0), None);
        assert_eq!(iv.len(), 1);
    }

    #[test]
    fn snapshot_collects_every_field() {
        let mut iv = IndicatorValues::new();
        iv.insert("upper", vec![11.0, 12.0]);
        iv.insert("lower", vec![9.0, 8.0]);
        let snap = iv.snapshot(1);
        assert_eq!(snap.get("upper"), Some(&12.0));
        assert_eq!(snap.get("lower"), Some(&8.0));
        assert_eq!(snap.keys().next().map(String::as_str), Some("lower"));
    }
}
