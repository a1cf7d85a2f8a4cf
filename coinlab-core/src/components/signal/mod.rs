//! Signal generation: per-bar directional intent and the transitions between them.
//!
//! Signals are portfolio-agnostic: they see bar history and indicator values,
//! never cash or position state. A generator is a pure function of its inputs;
//! running it twice on the same bars yields identical output.

pub mod bollinger;
pub mod ma_crossover;
pub mod rsi_reversion;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

use super::indicator::IndicatorValues;

pub use bollinger::BollingerReversion;
pub use ma_crossover::MaCrossover;
pub use rsi_reversion::RsiReversion;

/// The strategy's desired exposure for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Flat,
    Long,
}

/// Change of intent relative to the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    None,
    Enter,
    Exit,
}

impl Transition {
    /// Derive the transition from the previous and current intent.
    pub fn between(previous: Intent, current: Intent) -> Self {
        match (previous, current) {
            (Intent::Flat, Intent::Long) => Transition::Enter,
            (Intent::Long, Intent::Flat) => Transition::Exit,
            _ => Transition::None,
        }
    }
}

/// One bar's worth of strategy output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Named indicator fields for this bar (NaN during warmup).
    pub indicators: BTreeMap<String, f64>,
    pub intent: Intent,
    pub transition: Transition,
}

/// Trait for signal generators.
///
/// Implementors decide the intent of one bar from precomputed indicators;
/// `generate` handles the series-wide bookkeeping.
///
/// # Architecture invariant
/// `intent_at` must only use data from `bars[0..=bar_index]` and must not
/// depend on the intent of earlier bars. Any comparison against NaN resolves
/// to `Intent::Flat`.
pub trait SignalGenerator: Send + Sync {
    /// Strategy kind, e.g. "ma_cross".
    fn name(&self) -> &str;

    /// Kind plus parameters, e.g. "ma_cross(short=20, long=50)".
    fn label(&self) -> String;

    /// Bars before the generator can ever report LONG.
    fn warmup_bars(&self) -> usize;

    /// Compute every indicator field the generator reads.
    fn indicators(&self, bars: &[Bar]) -> IndicatorValues;

    /// Decide the intent for a single bar.
    fn intent_at(&self, bars: &[Bar], bar_index: usize, indicators: &IndicatorValues) -> Intent;

    /// Produce one signal per bar, aligned by index with `bars`.
    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let indicators = self.indicators(bars);
        let intents: Vec<Intent> = (0..bars.len())
            .map(|i| self.intent_at(bars, i, &indicators))
            .collect();
        assemble_signals(bars, &intents, &indicators)
    }
}

/// Zip bars, intents and indicator values into signals, deriving transitions.
///
/// The first bar never carries a transition.
pub fn assemble_signals(bars: &[Bar], intents: &[Intent], indicators: &IndicatorValues) -> Vec<Signal> {
    debug_assert_eq!(bars.len(), intents.len());
    bars.iter()
        .zip(intents)
        .enumerate()
        .map(|(i, (bar, &intent))| {
            let transition = if i == 0 {
                Transition::None
            } else {
                Transition::between(intents[i - 1], intent)
            };
            Signal {
                bar_index: i,
                timestamp: bar.timestamp,
                price: bar.close,
                indicators: indicators.snapshot(i),
                intent,
                transition,
            }
        })
        .collect()
}

/// Build signals straight from an intent sequence, without indicator fields.
///
/// Useful for replaying externally computed positions through the engine.
pub fn signals_from_intents(bars: &[Bar], intents: &[Intent]) -> Vec<Signal> {
    assemble_signals(bars, intents, &IndicatorValues::new())
}
