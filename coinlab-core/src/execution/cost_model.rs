//! Cost model: slippage-adjusted execution prices and fee rates.
//!
//! Slippage is directional: buyers pay more (higher price), sellers receive
//! less (lower price). Fees are a rate on traded value and always reduce cash.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, Side};

use super::exchange::{volatility_coefficient, ExchangeRegistry};
use super::fee::{FeeModel, FeeSchedule, OrderKind};
use super::slippage::{SlippageModel, MAX_SLIPPAGE};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("fee rate must be in [0, 1), got {0}")]
    FeeRate(f64),
    #[error("slippage must be in [0, 0.05], got {0}")]
    Slippage(f64),
    #[error("tier threshold must be finite and non-negative, got {0}")]
    TierThreshold(f64),
    #[error("tier discount must be in [0, 1), got {0}")]
    TierDiscount(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMode {
    #[default]
    Fixed,
    Dynamic,
}

/// Explicit maker/taker rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeeValues {
    pub maker: f64,
    pub taker: f64,
}

/// Everything needed to resolve a `CostModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSpec {
    pub exchange_id: String,
    pub instrument_symbol: String,
    #[serde(default)]
    pub fee_mode: CostMode,
    /// Fixed mode: the rates. Dynamic mode: base rates before tier discounts.
    /// Falls back to the exchange profile when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_values: Option<FeeValues>,
    #[serde(default)]
    pub slippage_mode: CostMode,
    /// Fixed mode: the rate. Dynamic mode: base rate before adjustments.
    /// Falls back to the exchange profile when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_value: Option<f64>,
}

impl Default for CostSpec {
    fn default() -> Self {
        Self {
            exchange_id: "binance".to_string(),
            instrument_symbol: "BTC/USDT".to_string(),
            fee_mode: CostMode::Fixed,
            fee_values: None,
            slippage_mode: CostMode::Fixed,
            slippage_value: None,
        }
    }
}

/// Priced execution for one order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub reference_price: f64,
    pub effective_price: f64,
    pub slippage_rate: f64,
    pub fee_rate: f64,
}

/// Resolved fee and slippage behaviour for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub exchange_id: String,
    /// False when `exchange_id` was not recognised and defaults were used.
    pub exchange_known: bool,
    pub fee: FeeModel,
    pub slippage: SlippageModel,
}

impl CostModel {
    pub fn new(fee: FeeModel, slippage: SlippageModel) -> Self {
        Self {
            exchange_id: "custom".to_string(),
            exchange_known: true,
            fee,
            slippage,
        }
    }

    /// No fees and no slippage.
    pub fn frictionless() -> Self {
        Self::new(FeeModel::zero(), SlippageModel::zero())
    }

    /// Flat taker fee, no slippage.
    pub fn with_taker_fee(taker: f64) -> Self {
        Self::new(
            FeeModel::Fixed {
                maker: taker,
                taker,
            },
            SlippageModel::zero(),
        )
    }

    /// Resolve `spec` against the registry. Unknown exchanges use the fallback profile.
    pub fn from_spec(spec: &CostSpec, registry: &ExchangeRegistry) -> Result<Self, CostError> {
        let (profile, exchange_known) = registry.resolve(&spec.exchange_id);
        if !exchange_known {
            tracing::warn!(
                exchange_id = %spec.exchange_id,
                "unknown exchange, using default fee and slippage rates"
            );
        }

        let (maker, taker) = match spec.fee_values {
            Some(values) => (values.maker, values.taker),
            None => (profile.maker, profile.taker),
        };
        for rate in [maker, taker] {
            if !(0.0..1.0).contains(&rate) {
                return Err(CostError::FeeRate(rate));
            }
        }
        let fee = match spec.fee_mode {
            CostMode::Fixed => FeeModel::Fixed { maker, taker },
            CostMode::Dynamic => FeeModel::Tiered {
                maker,
                taker,
                schedule: FeeSchedule::new(&profile.tiers)?,
            },
        };

        let base_slippage = spec.slippage_value.unwrap_or(profile.base_slippage);
        if !(0.0..=MAX_SLIPPAGE).contains(&base_slippage) {
            return Err(CostError::Slippage(base_slippage));
        }
        let slippage = match spec.slippage_mode {
            CostMode::Fixed => SlippageModel::Fixed(base_slippage),
            CostMode::Dynamic => SlippageModel::Dynamic {
                base_rate: base_slippage,
                coefficient: volatility_coefficient(&spec.instrument_symbol),
            },
        };

        Ok(Self {
            exchange_id: spec.exchange_id.clone(),
            exchange_known,
            fee,
            slippage,
        })
    }

    pub fn fee_rate(&self, kind: OrderKind, cumulative_volume: f64) -> f64 {
        self.fee.rate(kind, cumulative_volume)
    }

    pub fn slippage_rate(&self, bars: &[Bar], index: usize) -> f64 {
        self.slippage.rate(bars, index)
    }

    /// Price a market order at `bars[index]`'s close.
    pub fn quote(&self, side: Side, bars: &[Bar], index: usize, cumulative_volume: f64) -> Quote {
        let reference_price = bars[index].reference_price();
        let slippage_rate = self.slippage_rate(bars, index);
        let effective_price = apply_slippage(reference_price, side, slippage_rate);
        Quote {
            reference_price,
            effective_price,
            slippage_rate,
            fee_rate: self.fee_rate(OrderKind::Taker, cumulative_volume),
        }
    }
}

/// Move `price` against the trader by `rate`.
pub fn apply_slippage(price: f64, side: Side, rate: f64) -> f64 {
    match side {
        Side::Buy => price * (1.0 + rate),
        Side::Sell => price * (1.0 - rate),
    }
}
