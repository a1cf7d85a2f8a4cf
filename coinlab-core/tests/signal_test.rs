//! Signal generator contract tests.
//!
//! Every generator must be:
//! - aligned: one signal per bar, same timestamps and prices
//! - causal: the signal at bar t is identical on a series truncated after t
//! - deterministic: identical bars give identical signals
//! - consistent: a transition appears exactly where the intent changes

use chrono::{Duration, TimeZone, Utc};
use coinlab_core::components::signal::{Intent, Signal, Transition};
use coinlab_core::components::{create_signal, SignalGenerator, StrategySpec};
use coinlab_core::domain::Bar;

/// Deterministic pseudo-random walk with swings wide enough to trigger every rule.
fn make_walk(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut price = 100.0_f64;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let noise = ((seed >> 33) % 200) as f64 / 100.0 - 1.0;
            let swing = (i as f64 * 0.12).sin() * 1.5;
            price = (price + noise + swing).max(5.0);
            Bar {
                timestamp: base + Duration::hours(i as i64),
                open: price,
                high: price * 1.005,
                low: price * 0.995,
                close: price,
                volume: 500.0 + (i % 7) as f64 * 50.0,
            }
        })
        .collect()
}

fn all_generators() -> Vec<Box<dyn SignalGenerator>> {
    [
        StrategySpec::MaCross {
            short_window: 5,
            long_window: 20,
        },
        StrategySpec::Rsi {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        },
        StrategySpec::Bollinger {
            window: 20,
            num_std: 1.5,
        },
    ]
    .iter()
    .map(|spec| create_signal(spec).unwrap())
    .collect()
}

fn same_number(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

fn assert_same_signal(a: &Signal, b: &Signal, name: &str) {
    assert_eq!(a.bar_index, b.bar_index, "{name}: bar index");
    assert_eq!(a.timestamp, b.timestamp, "{name}: timestamp");
    assert_eq!(a.intent, b.intent, "{name}: intent at bar {}", a.bar_index);
    assert_eq!(a.transition, b.transition, "{name}: transition at bar {}", a.bar_index);
    assert_eq!(
        a.indicators.keys().collect::<Vec<_>>(),
        b.indicators.keys().collect::<Vec<_>>(),
        "{name}: indicator fields"
    );
    for (key, &value) in &a.indicators {
        assert!(
            same_number(value, b.indicators[key]),
            "{name}: {key} at bar {} differs: {value} vs {}",
            a.bar_index,
            b.indicators[key]
        );
    }
}

#[test]
fn one_signal_per_bar() {
    let bars = make_walk(150);
    for generator in all_generators() {
        let signals = generator.generate(&bars);
        assert_eq!(signals.len(), bars.len(), "{}", generator.name());
        for (signal, bar) in signals.iter().zip(&bars) {
            assert_eq!(signal.timestamp, bar.timestamp);
            assert_eq!(signal.price, bar.close);
        }
    }
}

#[test]
fn empty_series_yields_no_signals() {
    for generator in all_generators() {
        assert!(generator.generate(&[]).is_empty(), "{}", generator.name());
    }
}

#[test]
fn signals_never_look_ahead() {
    let full = make_walk(200);
    for generator in all_generators() {
        let name = generator.name().to_string();
        let full_signals = generator.generate(&full);
        for cut in [1, 2, 15, 21, 60, 137] {
            let truncated = generator.generate(&full[..cut]);
            assert_eq!(truncated.len(), cut);
            for (a, b) in truncated.iter().zip(&full_signals) {
                assert_same_signal(a, b, &name);
            }
        }
    }
}

#[test]
fn generation_is_deterministic() {
    let bars = make_walk(180);
    for generator in all_generators() {
        let first = generator.generate(&bars);
        let second = generator.generate(&bars);
        for (a, b) in first.iter().zip(&second) {
            assert_same_signal(a, b, generator.name());
        }
    }
}

#[test]
fn transitions_match_intent_changes() {
    let bars = make_walk(200);
    for generator in all_generators() {
        let signals = generator.generate(&bars);
        assert_eq!(signals[0].transition, Transition::None);
        for pair in signals.windows(2) {
            let expected = match (pair[0].intent, pair[1].intent) {
                (Intent::Flat, Intent::Long) => Transition::Enter,
                (Intent::Long, Intent::Flat) => Transition::Exit,
                _ => Transition::None,
            };
            assert_eq!(pair[1].transition, expected, "{}", generator.name());
        }
    }
}

#[test]
fn every_generator_changes_intent_on_a_swinging_series() {
    let bars = make_walk(300);
    for generator in all_generators() {
        let enters = generator
            .generate(&bars)
            .iter()
            .filter(|s| s.transition == Transition::Enter)
            .count();
        assert!(enters > 0, "{} never entered", generator.name());
    }
}

#[test]
fn warmup_bars_are_flat() {
    let bars = make_walk(100);
    for generator in all_generators() {
        let warmup = generator.warmup_bars().min(bars.len());
        let signals = generator.generate(&bars);
        assert!(
            signals[..warmup].iter().all(|s| s.intent == Intent::Flat),
            "{} reported LONG during warmup",
            generator.name()
        );
    }
}

#[test]
fn labels_carry_parameters() {
    let labels: Vec<String> = all_generators().iter().map(|g| g.label()).collect();
    assert!(labels[0].contains("short=5") && labels[0].contains("long=20"));
    assert!(labels[1].starts_with("rsi"));
    assert!(labels[2].starts_with("bollinger"));
}
