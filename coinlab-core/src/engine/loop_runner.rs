//! Bar-by-bar simulation loop: the heart of the backtesting engine.
//!
//! Two states, FLAT and LONG. Each bar is fully settled before the next:
//! 1. Risk: while LONG, ratchet the trailing high and ask the risk overlay
//! 2. Signal: if no risk exit fired, act on the bar's ENTER/EXIT transition
//! 3. Ledger: record cash, position value and total for the bar

use crate::components::{Signal, SignalGenerator, Transition};
use crate::domain::{
    validate_series, Bar, LedgerEntry, PositionState, Side, Trade, TradeReason,
};

use super::state::{EngineConfig, EngineError, EngineState, RunResult};

/// Run a backtest: validate inputs, generate signals, simulate.
pub fn run_backtest(
    bars: &[Bar],
    generator: &dyn SignalGenerator,
    config: &EngineConfig,
) -> Result<RunResult, EngineError> {
    validate_series(bars)?;
    config.check()?;
    let signals = generator.generate(bars);
    simulate(bars, &signals, config)
}

/// Walk `bars` with precomputed `signals`.
///
/// `signals` must be aligned one-to-one with `bars`.
pub fn simulate(
    bars: &[Bar],
    signals: &[Signal],
    config: &EngineConfig,
) -> Result<RunResult, EngineError> {
    validate_series(bars)?;
    config.check()?;
    if signals.len() != bars.len() {
        return Err(EngineError::LengthMismatch {
            bars: bars.len(),
            signals: signals.len(),
        });
    }
    if let Some(index) = signals
        .iter()
        .zip(bars)
        .position(|(s, b)| s.timestamp != b.timestamp)
    {
        return Err(EngineError::SignalMisaligned { index });
    }

    let mut state = EngineState::new(config.initial_capital, bars.len());
    for (i, signal) in signals.iter().enumerate() {
        step(&mut state, bars, i, signal, config);
    }

    tracing::info!(
        bars = bars.len(),
        trades = state.trades.len(),
        skipped = state.skipped_bars.len(),
        "simulation complete"
    );
    Ok(state.into_result(config.initial_capital))
}

/// Settle bar `i` and append its ledger entry.
fn step(state: &mut EngineState, bars: &[Bar], i: usize, signal: &Signal, config: &EngineConfig) {
    let bar = &bars[i];

    if !bar.has_tradable_price() || !bar.has_usable_volume() {
        tracing::warn!(
            bar = i,
            timestamp = %bar.timestamp,
            close = bar.close,
            volume = bar.volume,
            "unusable price or volume, carrying state forward"
        );
        state.skipped_bars.push(i);
        // A valid close still marks the position even when volume is unusable.
        if bar.has_tradable_price() {
            state.last_valid_price = Some(bar.reference_price());
        }
        let mark = state.last_valid_price.unwrap_or(0.0);
        let entry = LedgerEntry::new(i, bar.timestamp, state.cash, state.position_value(mark));
        state.ledger.push(entry);
        return;
    }

    let price = bar.reference_price();
    state.last_valid_price = Some(price);

    // ─── Risk overlay ───
    let mut risk_exit = None;
    if let Some(pos) = state.position.as_mut() {
        pos.observe(price);
        if config.risk.is_active() {
            risk_exit = config.risk.evaluate(pos, price);
        }
    }

    // ─── Signal ───
    match risk_exit {
        Some(exit) => close_long(state, bars, i, config, exit.reason()),
        None => match signal.transition {
            Transition::Enter if !state.is_long() => open_long(state, bars, i, config),
            Transition::Exit if state.is_long() => {
                close_long(state, bars, i, config, TradeReason::Signal)
            }
            _ => {}
        },
    }

    // ─── Ledger ───
    let entry = LedgerEntry::new(i, bar.timestamp, state.cash, state.position_value(price));
    state.ledger.push(entry);
}

/// Spend all cash on the instrument at bar `i`.
fn open_long(state: &mut EngineState, bars: &[Bar], i: usize, config: &EngineConfig) {
    if state.cash <= 0.0 {
        tracing::warn!(bar = i, cash = state.cash, "no cash available, entry ignored");
        return;
    }

    let quote = config
        .cost_model
        .quote(Side::Buy, bars, i, state.cumulative_volume);
    let fee = state.cash * quote.fee_rate;
    let value = state.cash - fee;
    let units = value / quote.effective_price;

    let trade = Trade {
        bar_index: i,
        timestamp: bars[i].timestamp,
        side: Side::Buy,
        reference_price: quote.reference_price,
        effective_price: quote.effective_price,
        units,
        value,
        notional_value: units * quote.reference_price,
        fee,
        reason: TradeReason::Signal,
        realized_profit: None,
    };
    tracing::debug!(
        bar = i,
        price = quote.effective_price,
        units,
        fee,
        "BUY"
    );

    state.cash = 0.0;
    state.cumulative_volume += value;
    state.position = Some(PositionState::open(
        quote.effective_price,
        quote.reference_price,
        units,
        state.trades.len(),
    ));
    state.trades.push(trade);
}

/// Sell the whole position at bar `i`.
fn close_long(
    state: &mut EngineState,
    bars: &[Bar],
    i: usize,
    config: &EngineConfig,
    reason: TradeReason,
) {
    let Some(pos) = state.position.take() else {
        return;
    };

    let quote = config
        .cost_model
        .quote(Side::Sell, bars, i, state.cumulative_volume);
    let value = pos.units * quote.effective_price;
    let fee = value * quote.fee_rate;

    let realized_profit = state
        .trades
        .get(pos.entry_trade)
        .map(|entry| (value - fee) - entry.net_cash());

    let trade = Trade {
        bar_index: i,
        timestamp: bars[i].timestamp,
        side: Side::Sell,
        reference_price: quote.reference_price,
        effective_price: quote.effective_price,
        units: pos.units,
        value,
        notional_value: pos.units * quote.reference_price,
        fee,
        reason,
        realized_profit,
    };
    tracing::debug!(
        bar = i,
        price = quote.effective_price,
        units = pos.units,
        fee,
        reason = reason.as_str(),
        "SELL"
    );

    state.cash += value - fee;
    state.cumulative_volume += value;
    state.trades.push(trade);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::signal::{signals_from_intents, Intent};
    use crate::components::{RiskConfig, RiskOverlay};
    use crate::indicators::make_bars;

    fn intents(pattern: &str) -> Vec<Intent> {
        pattern
            .chars()
            .map(|c| if c == 'L' { Intent::Long } else { Intent::Flat })
            .collect()
    }

    #[test]
    fn flat_run_keeps_capital() {
        let bars = make_bars(&[100.0, 101.0, 99.0]);
        let signals = signals_from_intents(&bars, &intents("FFF"));
        let result = simulate(&bars, &signals, &EngineConfig::new(1000.0)).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.ledger.totals().iter().all(|&t| t == 1000.0));
    }

    #[test]
    fn enter_then_exit_round_trip() {
        let bars = make_bars(&[100.0, 100.0, 105.0, 110.0]);
        let signals = signals_from_intents(&bars, &intents("FLLF"));
        let result = simulate(&bars, &signals, &EngineConfig::new(1000.0)).unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].side, Side::Buy);
        assert_eq!(result.trades[1].side, Side::Sell);
        assert!((result.final_value() - 1100.0).abs() < 1e-9);
        assert_eq!(result.trades[1].realized_profit, Some(100.0));
        assert!(result.open_position.is_none());
    }

    #[test]
    fn ledger_marks_position_to_market() {
        let bars = make_bars(&[100.0, 100.0, 120.0]);
        let signals = signals_from_intents(&bars, &intents("FLL"));
        let result = simulate(&bars, &signals, &EngineConfig::new(1000.0)).unwrap();
        let last = result.ledger.last().unwrap();
        assert_eq!(last.cash, 0.0);
        assert!((last.position_value - 1200.0).abs() < 1e-9);
        assert!(result.open_position.is_some());
    }

    #[test]
    fn invalid_price_bar_is_skipped() {
        let mut bars = make_bars(&[100.0, 100.0, 100.0, 110.0]);
        bars[2].close = 0.0;
        let signals = signals_from_intents(&bars, &intents("FLLL"));
        let result = simulate(&bars, &signals, &EngineConfig::new(1000.0)).unwrap();
        assert_eq!(result.skipped_bars, vec![2]);
        // Position is carried at the last valid close.
        assert!((result.ledger.entries()[2].total_value - 1000.0).abs() < 1e-9);
        assert!((result.final_value() - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn entry_on_skipped_bar_is_lost() {
        let mut bars = make_bars(&[100.0, 100.0, 100.0]);
        bars[1].close = f64::NAN;
        let signals = signals_from_intents(&bars, &intents("FLL"));
        let result = simulate(&bars, &signals, &EngineConfig::new(1000.0)).unwrap();
        assert!(result.trades.is_empty());
    }

    #[test]
    fn risk_exit_suppresses_signal_exit() {
        let bars = make_bars(&[100.0, 100.0, 90.0]);
        let signals = signals_from_intents(&bars, &intents("FLF"));
        let risk = RiskOverlay::new(RiskConfig {
            stop_loss: Some(0.05),
            ..Default::default()
        })
        .unwrap();
        let config = EngineConfig::new(1000.0).with_risk(risk);
        let result = simulate(&bars, &signals, &config).unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[1].reason, TradeReason::StopLoss);
    }

    #[test]
    fn rejects_misaligned_signals() {
        let bars = make_bars(&[100.0, 101.0]);
        let signals = signals_from_intents(&bars[..1], &intents("F"));
        assert_eq!(
            simulate(&bars, &signals, &EngineConfig::new(1000.0)).unwrap_err(),
            EngineError::LengthMismatch { bars: 2, signals: 1 }
        );
    }

    #[test]
    fn rejects_non_positive_capital() {
        let bars = make_bars(&[100.0]);
        let signals = signals_from_intents(&bars, &intents("F"));
        assert!(matches!(
            simulate(&bars, &signals, &EngineConfig::new(0.0)),
            Err(EngineError::InvalidCapital(_))
        ));
    }
}
