//! Fee model: fixed rates or volume-tiered discounts off an exchange base rate.
//!
//! Discounts are multiplicative: `rate = base * (1 - discount)`. The schedule
//! is normalised on construction so the rate never rises with volume.

use serde::{Deserialize, Serialize};

use super::cost_model::CostError;

/// Maker (resting) or taker (crossing) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Maker,
    Taker,
}

/// Discount unlocked once cumulative traded volume reaches `min_volume`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTier {
    pub min_volume: f64,
    pub discount: f64,
}

/// Ordered tiers with non-decreasing discounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeSchedule {
    tiers: Vec<VolumeTier>,
}

impl FeeSchedule {
    /// Sort tiers by threshold and lift each discount to the running maximum.
    pub fn new(tiers: &[VolumeTier]) -> Result<Self, CostError> {
        for tier in tiers {
            if !(tier.min_volume.is_finite() && tier.min_volume >= 0.0) {
                return Err(CostError::TierThreshold(tier.min_volume));
            }
            if !(0.0..1.0).contains(&tier.discount) {
                return Err(CostError::TierDiscount(tier.discount));
            }
        }
        let mut sorted = tiers.to_vec();
        sorted.sort_by(|a, b| a.min_volume.total_cmp(&b.min_volume));
        let mut best = 0.0_f64;
        for tier in &mut sorted {
            best = best.max(tier.discount);
            tier.discount = best;
        }
        Ok(Self { tiers: sorted })
    }

    pub fn tiers(&self) -> &[VolumeTier] {
        &self.tiers
    }

    /// Discount of the highest tier reached at `volume`.
    pub fn discount_at(&self, volume: f64) -> f64 {
        self.tiers
            .iter()
            .take_while(|t| t.min_volume <= volume)
            .last()
            .map_or(0.0, |t| t.discount)
    }
}

/// Fee rate resolution, fixed or volume-tiered.
#[derive(Debug, Clone, PartialEq)]
pub enum FeeModel {
    Fixed { maker: f64, taker: f64 },
    Tiered {
        maker: f64,
        taker: f64,
        schedule: FeeSchedule,
    },
}

impl FeeModel {
    pub fn zero() -> Self {
        FeeModel::Fixed {
            maker: 0.0,
            taker: 0.0,
        }
    }

    /// Fee rate for an order of `kind` after `cumulative_volume` has traded.
    pub fn rate(&self, kind: OrderKind, cumulative_volume: f64) -> f64 {
        match self {
            FeeModel::Fixed { maker, taker } => match kind {
                OrderKind::Maker => *maker,
                OrderKind::Taker => *taker,
            },
            FeeModel::Tiered {
                maker,
                taker,
                schedule,
            } => {
                let base = match kind {
                    OrderKind::Maker => *maker,
                    OrderKind::Taker => *taker,
                };
                base * (1.0 - schedule.discount_at(cumulative_volume))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(min_volume: f64, discount: f64) -> VolumeTier {
        VolumeTier {
            min_volume,
            discount,
        }
    }

    #[test]
    fn fixed_ignores_volume() {
        let fee = FeeModel::Fixed {
            maker: 0.0002,
            taker: 0.0007,
        };
        assert_eq!(fee.rate(OrderKind::Taker, 0.0), 0.0007);
        assert_eq!(fee.rate(OrderKind::Taker, 1e12), 0.0007);
        assert_eq!(fee.rate(OrderKind::Maker, 5.0), 0.0002);
    }

    #[test]
    fn tiered_discount_is_multiplicative() {
        let fee = FeeModel::Tiered {
            maker: 0.001,
            taker: 0.002,
            schedule: FeeSchedule::new(&[tier(100.0, 0.25), tier(1000.0, 0.5)]).unwrap(),
        };
        assert_eq!(fee.rate(OrderKind::Taker, 99.0), 0.002);
        assert!((fee.rate(OrderKind::Taker, 100.0) - 0.0015).abs() < 1e-15);
        assert!((fee.rate(OrderKind::Taker, 5000.0) - 0.001).abs() < 1e-15);
        assert!((fee.rate(OrderKind::Maker, 5000.0) - 0.0005).abs() < 1e-15);
    }

    #[test]
    fn schedule_normalises_order_and_monotonicity() {
        let schedule =
            FeeSchedule::new(&[tier(1000.0, 0.1), tier(10.0, 0.3), tier(500.0, 0.2)]).unwrap();
        let discounts: Vec<f64> = schedule.tiers().iter().map(|t| t.discount).collect();
        assert_eq!(discounts, vec![0.3, 0.3, 0.3]);
        assert_eq!(schedule.discount_at(0.0), 0.0);
        assert_eq!(schedule.discount_at(10.0), 0.3);
    }

    #[test]
    fn schedule_rejects_bad_tiers() {
        assert!(FeeSchedule::new(&[tier(10.0, 1.0)]).is_err());
        assert!(FeeSchedule::new(&[tier(-1.0, 0.1)]).is_err());
        assert!(FeeSchedule::new(&[tier(f64::NAN, 0.1)]).is_err());
    }
}
