//! Slippage models: fraction of the reference price lost on execution.
//!
//! Dynamic slippage scales an exchange base rate by the instrument's volatility
//! coefficient, then by how busy the current bar is relative to its trailing
//! window, then by the window's realized volatility band.

use crate::domain::Bar;
use crate::indicators::stats::{coefficient_of_variation, mean};

/// Trailing window, in bars, for the volume and volatility adjustments.
pub const SLIPPAGE_WINDOW: usize = 10;

/// Hard ceiling on any slippage rate.
pub const MAX_SLIPPAGE: f64 = 0.05;

/// Volume ratio above which a bar counts as liquid.
pub const HIGH_VOLUME_RATIO: f64 = 1.5;

/// Multiplier applied on liquid bars.
pub const HIGH_VOLUME_MULTIPLIER: f64 = 0.8;

/// Largest extra slippage added on thin bars (multiplier tops out at 1 + cap).
pub const LOW_VOLUME_CAP: f64 = 1.0;

/// Upper bounds of the first three volatility bands; the fourth is open-ended.
pub const VOLATILITY_BANDS: [f64; 3] = [0.01, 0.02, 0.04];

/// Multipliers for the four volatility bands, lowest band first.
pub const VOLATILITY_MULTIPLIERS: [f64; 4] = [1.0, 1.25, 1.5, 2.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlippageModel {
    /// Same rate on every bar.
    Fixed(f64),
    /// Market-condition dependent rate.
    Dynamic {
        base_rate: f64,
        coefficient: f64,
    },
}

impl SlippageModel {
    pub fn zero() -> Self {
        SlippageModel::Fixed(0.0)
    }

    /// Slippage rate for an execution at `bars[index]`.
    pub fn rate(&self, bars: &[Bar], index: usize) -> f64 {
        match *self {
            SlippageModel::Fixed(rate) => rate,
            SlippageModel::Dynamic {
                base_rate,
                coefficient,
            } => {
                let start = (index + 1).saturating_sub(SLIPPAGE_WINDOW);
                let window = &bars[start..=index];
                let ratio = volume_ratio(window, &bars[index]);
                let cv = close_volatility(window);
                let rate =
                    base_rate * coefficient * volume_multiplier(ratio) * volatility_multiplier(cv);
                rate.clamp(0.0, MAX_SLIPPAGE)
            }
        }
    }
}

/// Current bar volume over the window's mean volume. 1.0 when undefined.
fn volume_ratio(window: &[Bar], current: &Bar) -> f64 {
    if !current.has_usable_volume() {
        return 1.0;
    }
    let volumes: Vec<f64> = window
        .iter()
        .filter(|b| b.has_usable_volume())
        .map(|b| b.volume)
        .collect();
    let avg = mean(&volumes);
    if avg.is_finite() && avg > 0.0 {
        current.volume / avg
    } else {
        1.0
    }
}

/// Coefficient of variation of the window's tradable closes.
fn close_volatility(window: &[Bar]) -> f64 {
    let closes: Vec<f64> = window
        .iter()
        .filter(|b| b.has_tradable_price())
        .map(|b| b.close)
        .collect();
    coefficient_of_variation(&closes)
}

/// Thin bars raise slippage linearly up to the cap; liquid bars earn a flat discount.
pub fn volume_multiplier(ratio: f64) -> f64 {
    if !ratio.is_finite() {
        return 1.0;
    }
    if ratio < 1.0 {
        1.0 + (1.0 - ratio).min(LOW_VOLUME_CAP)
    } else if ratio > HIGH_VOLUME_RATIO {
        HIGH_VOLUME_MULTIPLIER
    } else {
        1.0
    }
}

/// Band multiplier for a realized volatility (std / mean). 1.0 when undefined.
pub fn volatility_multiplier(cv: f64) -> f64 {
    if !cv.is_finite() {
        return 1.0;
    }
    let band = VOLATILITY_BANDS
        .iter()
        .position(|&upper| cv < upper)
        .unwrap_or(VOLATILITY_BANDS.len());
    VOLATILITY_MULTIPLIERS[band]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn dynamic() -> SlippageModel {
        SlippageModel::Dynamic {
            base_rate: 0.001,
            coefficient: 1.0,
        }
    }

    #[test]
    fn fixed_rate_is_constant() {
        let bars = make_bars(&[100.0, 50.0, 200.0]);
        let model = SlippageModel::Fixed(0.002);
        assert_eq!(model.rate(&bars, 0), 0.002);
        assert_eq!(model.rate(&bars, 2), 0.002);
    }

    #[test]
    fn calm_steady_market_gets_base_rate() {
        let bars = make_bars(&[100.0; 12]);
        assert!((dynamic().rate(&bars, 11) - 0.001).abs() < 1e-15);
    }

    #[test]
    fn first_bar_has_no_adjustment() {
        let bars = make_bars(&[100.0]);
        assert!((dynamic().rate(&bars, 0) - 0.001).abs() < 1e-15);
    }

    #[test]
    fn thin_bar_raises_slippage() {
        let mut bars = make_bars(&[100.0; 10]);
        bars[9].volume = 100.0;
        // mean volume = (9 * 1000 + 100) / 10 = 910; ratio ≈ 0.11
        let expected = 0.001 * (1.0 + (1.0 - 100.0 / 910.0));
        assert!((dynamic().rate(&bars, 9) - expected).abs() < 1e-15);
    }

    #[test]
    fn liquid_bar_discounts_slippage() {
        let mut bars = make_bars(&[100.0; 10]);
        bars[9].volume = 10_000.0;
        assert!((dynamic().rate(&bars, 9) - 0.0008).abs() < 1e-15);
    }

    #[test]
    fn volume_multiplier_is_capped() {
        assert_eq!(volume_multiplier(0.0), 2.0);
        assert_eq!(volume_multiplier(0.5), 1.5);
        assert_eq!(volume_multiplier(1.2), 1.0);
        assert_eq!(volume_multiplier(3.0), 0.8);
        assert_eq!(volume_multiplier(f64::NAN), 1.0);
    }

    #[test]
    fn volatility_bands_are_monotonic() {
        let samples = [0.0, 0.005, 0.015, 0.03, 0.05, 0.5];
        let multipliers: Vec<f64> = samples.iter().map(|&cv| volatility_multiplier(cv)).collect();
        assert_eq!(multipliers, vec![1.0, 1.0, 1.25, 1.5, 2.0, 2.0]);
        assert!(multipliers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn volatile_window_raises_slippage() {
        let closes = [100.0, 110.0, 90.0, 105.0, 95.0, 100.0];
        let bars = make_bars(&closes);
        assert!((dynamic().rate(&bars, 5) - 0.002).abs() < 1e-15);
    }

    #[test]
    fn rate_is_clamped() {
        let model = SlippageModel::Dynamic {
            base_rate: 0.04,
            coefficient: 1.5,
        };
        let bars = make_bars(&[100.0; 3]);
        assert_eq!(model.rate(&bars, 2), MAX_SLIPPAGE);
    }
}
