//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window. By default the first
//! `period - 1` values are NaN and any NaN in the window poisons the result.
//! `Sma::partial` instead averages whatever non-NaN closes the window holds,
//! so it is defined from the first bar (a minimum-periods-of-one rolling mean).

use crate::components::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    partial: bool,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            partial: false,
            name: format!("sma_{period}"),
        }
    }

    /// SMA that is defined over partial windows.
    pub fn partial(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            partial: true,
            name: format!("sma_partial_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        if self.partial {
            0
        } else {
            self.period.saturating_sub(1)
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for (i, slot) in result.iter_mut().enumerate() {
            let start = (i + 1).saturating_sub(self.period);
            let window = &bars[start..=i];

            if self.partial {
                let (sum, count) = window
                    .iter()
                    .filter(|b| !b.close.is_nan())
                    .fold((0.0, 0usize), |(s, c), b| (s + b.close, c + 1));
                if count > 0 {
                    *slot = sum / count as f64;
                }
            } else if window.len() == self.period && window.iter().all(|b| !b.close.is_nan()) {
                *slot = window.iter().map(|b| b.close).sum::<f64>() / self.period as f64;
            }
        }

        result
    }
}
