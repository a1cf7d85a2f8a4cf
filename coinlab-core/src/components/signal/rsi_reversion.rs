//! RSI mean reversion: long while RSI is oversold.
//!
//! Evaluated bar by bar with no memory: RSI below `oversold` is LONG, anything
//! else (including the band between the thresholds) is FLAT. With
//! `oversold < overbought` the overbought rule never changes the outcome.

use crate::components::indicator::IndicatorValues;
use crate::domain::Bar;
use crate::indicators::Rsi;

use super::{Intent, SignalGenerator};

pub const RSI: &str = "rsi";

#[derive(Debug, Clone)]
pub struct RsiReversion {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiReversion {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        assert!(period >= 1, "period must be >= 1");
        assert!(
            (0.0..=100.0).contains(&oversold) && (0.0..=100.0).contains(&overbought),
            "thresholds must lie in [0, 100]"
        );
        assert!(oversold < overbought, "oversold must be < overbought");
        Self {
            period,
            oversold,
            overbought,
        }
    }

    pub fn default_params() -> Self {
        Self::new(14, 30.0, 70.0)
    }
}

impl SignalGenerator for RsiReversion {
    fn name(&self) -> &str {
        "rsi"
    }

    fn label(&self) -> String {
        format!(
            "rsi(period={}, oversold={}, overbought={})",
            self.period, self.oversold, self.overbought
        )
    }

    fn warmup_bars(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn indicators(&self, bars: &[Bar]) -> IndicatorValues {
        let mut iv = IndicatorValues::new();
        iv.compute_into(RSI, &Rsi::new(self.period), bars);
        iv
    }

    fn intent_at(&self, _bars: &[Bar], bar_index: usize, indicators: &IndicatorValues) -> Intent {
        let rsi = indicators.get(RSI, bar_index).unwrap_or(f64::NAN);
        let mut intent = if rsi < self.oversold {
            Intent::Long
        } else {
            Intent::Flat
        };
        if rsi > self.overbought {
            intent = Intent::Flat;
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::Transition;
    use crate::indicators::make_bars;

    #[test]
    fn oversold_is_long() {
        // Steady decline then rebound; RSI(3) hits 0 on the way down.
        let closes = [10.0, 9.0, 8.0, 7.0, 6.0, 8.0, 10.0, 12.0];
        let signals = RsiReversion::new(3, 30.0, 70.0).generate(&make_bars(&closes));
        assert_eq!(signals[2].intent, Intent::Long);
        assert_eq!(signals[2].transition, Transition::Enter);
        assert_eq!(signals[7].intent, Intent::Flat);
    }

    #[test]
    fn between_thresholds_reverts_to_flat() {
        // window at index 3: [-1, +1, -1] → gain 1/3, loss 2/3 → RSI 33.3
        // window at index 2: [0, -1, +1] → RSI 50
        // window at index 4: [+1, -1, -2] → gain 1/3, loss 1 → RSI 25
        // window at index 5: [-1, -2, +2] → gain 2/3, loss 1 → RSI 40
        let closes = [10.0, 9.0, 10.0, 9.0, 7.0, 9.0];
        let signals = RsiReversion::new(3, 30.0, 70.0).generate(&make_bars(&closes));
        assert_eq!(signals[4].intent, Intent::Long);
        // RSI 40 sits between the thresholds: no hysteresis, back to FLAT.
        assert_eq!(signals[5].intent, Intent::Flat);
        assert_eq!(signals[5].transition, Transition::Exit);
    }

    #[test]
    fn undefined_rsi_is_flat() {
        let signals = RsiReversion::new(3, 30.0, 70.0).generate(&make_bars(&[5.0; 6]));
        assert!(signals.iter().all(|s| s.intent == Intent::Flat));
        assert!(signals[4].indicators.get(RSI).is_some_and(|v| v.is_nan()));
    }

    #[test]
    fn label_includes_params() {
        assert_eq!(
            RsiReversion::default_params().label(),
            "rsi(period=14, oversold=30, overbought=70)"
        );
    }
}
