//! Bollinger band reversion: long while the close is below the lower band.
//!
//! Like the RSI strategy this is evaluated bar by bar: a close back inside the
//! bands is FLAT, the same as a close above the upper band.

use crate::components::indicator::IndicatorValues;
use crate::domain::Bar;
use crate::indicators::Bollinger;

use super::{Intent, SignalGenerator};

pub const MIDDLE: &str = "middle";
pub const UPPER: &str = "upper";
pub const LOWER: &str = "lower";

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    pub window: usize,
    pub num_std: f64,
}

impl BollingerReversion {
    pub fn new(window: usize, num_std: f64) -> Self {
        assert!(window >= 2, "window must be >= 2");
        assert!(num_std > 0.0, "num_std must be positive");
        Self { window, num_std }
    }

    pub fn default_params() -> Self {
        Self::new(20, 2.0)
    }
}

impl SignalGenerator for BollingerReversion {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn label(&self) -> String {
        format!("bollinger(window={}, num_std={})", self.window, self.num_std)
    }

    fn warmup_bars(&self) -> usize {
        self.window - 1
    }

    fn indicators(&self, bars: &[Bar]) -> IndicatorValues {
        let mut iv = IndicatorValues::new();
        iv.compute_into(MIDDLE, &Bollinger::middle(self.window, self.num_std), bars);
        iv.compute_into(UPPER, &Bollinger::upper(self.window, self.num_std), bars);
        iv.compute_into(LOWER, &Bollinger::lower(self.window, self.num_std), bars);
        iv
    }

    fn intent_at(&self, bars: &[Bar], bar_index: usize, indicators: &IndicatorValues) -> Intent {
        let price = bars[bar_index].close;
        let lower = indicators.get(LOWER, bar_index).unwrap_or(f64::NAN);
        let upper = indicators.get(UPPER, bar_index).unwrap_or(f64::NAN);
        let mut intent = if price < lower {
            Intent::Long
        } else {
            Intent::Flat
        };
        if price > upper {
            intent = Intent::Flat;
        }
        intent
    }
}
