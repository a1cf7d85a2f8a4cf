//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, value out.
//! Percentages are reported on a 0–100 scale.

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use coinlab_core::domain::{Ledger, Trade};
use coinlab_core::engine::{RoundTrip, RunResult};
use coinlab_core::indicators::stats::{mean, sample_std};

/// Bars per year used to annualise the Sharpe ratio.
pub const ANNUALIZATION_FACTOR: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_return_pct: f64,
    /// Non-positive: -25.0 means a 25% decline from the running peak.
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
    pub sharpe_ratio: f64,
    /// Time from the peak preceding the deepest trough to the trough.
    #[serde(with = "duration_secs")]
    pub max_drawdown_duration: Duration,
    pub max_drawdown_bars: usize,
    pub cost_breakdown: CostBreakdown,
    /// Executed trades, virtual closes excluded.
    pub trade_count: usize,
}

/// Fees and slippage paid, absolute and relative to traded notional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub total_fees: f64,
    pub total_slippage: f64,
    pub traded_notional: f64,
    pub fee_pct_of_notional: f64,
    pub slippage_pct_of_notional: f64,
}

/// Round-trip profit statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub round_trips: usize,
    pub total_profit: f64,
    /// Mean over round trips with non-zero profit.
    pub avg_profit: f64,
    /// Largest round-trip profit, floored at 0.
    pub max_profit: f64,
    /// Smallest round-trip profit, capped at 0.
    pub max_loss: f64,
}

/// Sum of per-bar returns within one calendar month (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: f64,
}

/// Location and depth of the deepest drawdown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Drawdown {
    /// Non-positive fraction, e.g. -0.25.
    pub depth: f64,
    pub peak_index: usize,
    pub trough_index: usize,
}

impl PerformanceSummary {
    /// The distinguished summary of a run that executed no trades.
    pub fn empty() -> Self {
        Self {
            total_return_pct: 0.0,
            max_drawdown_pct: 0.0,
            win_rate_pct: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown_duration: Duration::zero(),
            max_drawdown_bars: 0,
            cost_breakdown: CostBreakdown::default(),
            trade_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }

    /// Compute every metric from a finished run and its paired trades.
    pub fn compute(run: &RunResult, round_trips: &[RoundTrip], risk_free_rate: f64) -> Self {
        if run.trades.is_empty() {
            return Self::empty();
        }

        let totals = run.ledger.totals();
        let drawdown = max_drawdown(&totals);
        let entries = run.ledger.entries();
        let duration = match (entries.get(drawdown.peak_index), entries.get(drawdown.trough_index)) {
            (Some(peak), Some(trough)) => trough.timestamp - peak.timestamp,
            _ => Duration::zero(),
        };

        Self {
            total_return_pct: total_return_pct(run.initial_capital, run.final_value()),
            max_drawdown_pct: drawdown.depth * 100.0,
            win_rate_pct: win_rate_pct(round_trips),
            sharpe_ratio: sharpe_ratio(&per_bar_returns(&totals), risk_free_rate),
            max_drawdown_duration: duration,
            max_drawdown_bars: drawdown.trough_index - drawdown.peak_index,
            cost_breakdown: cost_breakdown(&run.trades),
            trade_count: run.trades.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// `(final / initial - 1) * 100`. Zero for a non-positive initial value.
pub fn total_return_pct(initial_capital: f64, final_value: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_value / initial_capital - 1.0) * 100.0
}

/// Simple returns between consecutive totals. A non-positive base yields 0.
pub fn per_bar_returns(totals: &[f64]) -> Vec<f64> {
    totals
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Annualised Sharpe ratio from per-bar returns.
///
/// Sharpe = mean(r - rf) / sample_std(r - rf) * sqrt(252).
/// Returns 0.0 with fewer than 2 returns or zero variance.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let std = sample_std(&excess);
    if !std.is_finite() || std < 1e-15 {
        return 0.0;
    }
    mean(&excess) / std * ANNUALIZATION_FACTOR.sqrt()
}

/// Deepest decline from a running peak.
///
/// The peak is the first bar at which the running maximum preceding the
/// trough was reached.
pub fn max_drawdown(totals: &[f64]) -> Drawdown {
    let mut result = Drawdown::default();
    let Some(&first) = totals.first() else {
        return result;
    };

    let mut peak = first;
    let mut peak_index = 0;
    for (i, &total) in totals.iter().enumerate() {
        if total > peak {
            peak = total;
            peak_index = i;
        }
        if peak > 0.0 {
            let depth = total / peak - 1.0;
            if depth < result.depth {
                result = Drawdown {
                    depth,
                    peak_index,
                    trough_index: i,
                };
            }
        }
    }
    result
}

/// Winners over round trips with non-zero profit, as a percentage.
pub fn win_rate_pct(round_trips: &[RoundTrip]) -> f64 {
    let decided = round_trips.iter().filter(|rt| rt.profit != 0.0).count();
    if decided == 0 {
        return 0.0;
    }
    let winners = round_trips.iter().filter(|rt| rt.is_winner()).count();
    winners as f64 / decided as f64 * 100.0
}

/// Fee and slippage attribution over executed trades.
pub fn cost_breakdown(trades: &[Trade]) -> CostBreakdown {
    let mut breakdown = CostBreakdown::default();
    for trade in trades.iter().filter(|t| !t.is_virtual()) {
        breakdown.total_fees += trade.fee;
        breakdown.total_slippage += trade.slippage_cost();
        breakdown.traded_notional += trade.notional_value;
    }
    if breakdown.traded_notional > 0.0 {
        breakdown.fee_pct_of_notional = breakdown.total_fees / breakdown.traded_notional * 100.0;
        breakdown.slippage_pct_of_notional =
            breakdown.total_slippage / breakdown.traded_notional * 100.0;
    }
    breakdown
}

pub fn trade_stats(round_trips: &[RoundTrip]) -> TradeStats {
    if round_trips.is_empty() {
        return TradeStats::default();
    }
    let profits: Vec<f64> = round_trips.iter().map(|rt| rt.profit).collect();
    let non_zero: Vec<f64> = profits.iter().copied().filter(|p| *p != 0.0).collect();
    TradeStats {
        round_trips: profits.len(),
        total_profit: profits.iter().sum(),
        avg_profit: if non_zero.is_empty() { 0.0 } else { mean(&non_zero) },
        max_profit: profits.iter().copied().fold(0.0, f64::max),
        max_loss: profits.iter().copied().fold(0.0, f64::min),
    }
}

/// Per-bar returns summed by calendar month, in chronological order.
pub fn monthly_returns(ledger: &Ledger) -> Vec<MonthlyReturn> {
    let entries = ledger.entries();
    let mut months: Vec<MonthlyReturn> = Vec::new();
    for pair in entries.windows(2) {
        let r = if pair[0].total_value > 0.0 {
            pair[1].total_value / pair[0].total_value - 1.0
        } else {
            0.0
        };
        let (year, month) = (pair[1].timestamp.year(), pair[1].timestamp.month());
        match months.last_mut() {
            Some(last) if last.year == year && last.month == month => last.return_pct += r * 100.0,
            _ => months.push(MonthlyReturn {
                year,
                month,
                return_pct: r * 100.0,
            }),
        }
    }
    months
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(d)?;
        Ok(Duration::seconds(secs))
    }
}
