//! Moving average crossover: long while the short mean sits above the long mean.
//!
//! Both means are partial-window SMAs of the close, defined from the first bar.
//! The first `short_window` bars are always FLAT.

use crate::components::indicator::IndicatorValues;
use crate::domain::Bar;
use crate::indicators::Sma;

use super::{Intent, SignalGenerator};

pub const SHORT_MA: &str = "short_ma";
pub const LONG_MA: &str = "long_ma";

#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

impl MaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        assert!(short_window >= 1, "short_window must be >= 1");
        assert!(
            long_window > short_window,
            "long_window must be > short_window"
        );
        Self {
            short_window,
            long_window,
        }
    }

    pub fn default_params() -> Self {
        Self::new(20, 50)
    }
}

impl SignalGenerator for MaCrossover {
    fn name(&self) -> &str {
        "ma_cross"
    }

    fn label(&self) -> String {
        format!(
            "ma_cross(short={}, long={})",
            self.short_window, self.long_window
        )
    }

    fn warmup_bars(&self) -> usize {
        self.short_window
    }

    fn indicators(&self, bars: &[Bar]) -> IndicatorValues {
        let mut iv = IndicatorValues::new();
        iv.compute_into(SHORT_MA, &Sma::partial(self.short_window), bars);
        iv.compute_into(LONG_MA, &Sma::partial(self.long_window), bars);
        iv
    }

    fn intent_at(&self, _bars: &[Bar], bar_index: usize, indicators: &IndicatorValues) -> Intent {
        if bar_index < self.warmup_bars() {
            return Intent::Flat;
        }
        let short = indicators.get(SHORT_MA, bar_index).unwrap_or(f64::NAN);
        let long = indicators.get(LONG_MA, bar_index).unwrap_or(f64::NAN);
        if short > long {
            Intent::Long
        } else {
            Intent::Flat
        }
    }
}
