//! Trade: one executed (or virtual) fill recorded in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Why a trade happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeReason {
    Signal,
    StopLoss,
    TakeProfit,
    TrailingStop,
    /// Virtual close synthesized for profit accounting when the run ends long.
    EndOfPeriod,
}

impl TradeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeReason::Signal => "SIGNAL",
            TradeReason::StopLoss => "STOP_LOSS",
            TradeReason::TakeProfit => "TAKE_PROFIT",
            TradeReason::TrailingStop => "TRAILING_STOP",
            TradeReason::EndOfPeriod => "END_OF_PERIOD",
        }
    }

    /// True for exits raised by the risk overlay rather than the strategy.
    pub fn is_risk_exit(&self) -> bool {
        matches!(
            self,
            TradeReason::StopLoss | TradeReason::TakeProfit | TradeReason::TrailingStop
        )
    }
}

/// Immutable record of a single execution.
///
/// `value` is the cash exchanged before fees (units at the effective price).
/// `notional_value` is units at the reference price and is the base for cost
/// attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub side: Side,
    pub reference_price: f64,
    pub effective_price: f64,
    pub units: f64,
    pub value: f64,
    pub notional_value: f64,
    pub fee: f64,
    pub reason: TradeReason,
    /// Set on the SELL that closes a position: `(sell.value - sell.fee) - (buy.value + buy.fee)`.
    pub realized_profit: Option<f64>,
}

impl Trade {
    /// Slippage paid on this trade, positive when the fill was worse than the reference.
    pub fn slippage_cost(&self) -> f64 {
        match self.side {
            Side::Buy => (self.effective_price - self.reference_price) * self.units,
            Side::Sell => (self.reference_price - self.effective_price) * self.units,
        }
    }

    /// Cash that left the account for a BUY, or arrived for a SELL, after fees.
    pub fn net_cash(&self) -> f64 {
        match self.side {
            Side::Buy => self.value + self.fee,
            Side::Sell => self.value - self.fee,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.reason == TradeReason::EndOfPeriod
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trade(side: Side, reference: f64, effective: f64, units: f64, fee: f64) -> Trade {
        Trade {
            bar_index: 0,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            side,
            reference_price: reference,
            effective_price: effective,
            units,
            value: units * effective,
            notional_value: units * reference,
            fee,
            reason: TradeReason::Signal,
            realized_profit: None,
        }
    }

    #[test]
    fn buy_slippage_is_positive_cost() {
        let t = trade(Side::Buy, 100.0, 100.5, 2.0, 0.0);
        assert!((t.slippage_cost() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sell_slippage_is_positive_cost() {
        let t = trade(Side::Sell, 100.0, 99.5, 2.0, 0.0);
        assert!((t.slippage_cost() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn net_cash_includes_fee_direction() {
        let buy = trade(Side::Buy, 100.0, 100.0, 1.0, 0.1);
        let sell = trade(Side::Sell, 100.0, 100.0, 1.0, 0.1);
        assert!((buy.net_cash() - 100.1).abs() < 1e-12);
        assert!((sell.net_cash() - 99.9).abs() < 1e-12);
    }

    #[test]
    fn reason_serializes_screaming_snake() {
        let json = serde_json::to_string(&TradeReason::TrailingStop).unwrap();
        assert_eq!(json, "\"TRAILING_STOP\"");
        assert!(TradeReason::StopLoss.is_risk_exit());
        assert!(!TradeReason::Signal.is_risk_exit());
    }
}
