//! Criterion benchmarks for CoinLab hot paths.
//!
//! Benchmarks:
//! 1. Simulation loop (precomputed signals, frictionless vs full cost model)
//! 2. Signal generation per strategy
//! 3. Indicator compute (SMA, RSI, Bollinger)
//! 4. Dynamic slippage quote

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use coinlab_core::components::indicator::Indicator;
use coinlab_core::components::{create_signal, RiskConfig, RiskOverlay, StrategySpec};
use coinlab_core::domain::{Bar, Side};
use coinlab_core::engine::{run_backtest, simulate, EngineConfig};
use coinlab_core::execution::{CostMode, CostModel, CostSpec, ExchangeRegistry};
use coinlab_core::indicators::{Bollinger, Rsi, Sma};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar {
                timestamp: base + Duration::hours(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000.0 + (i % 500) as f64,
            }
        })
        .collect()
}

fn full_cost_config() -> EngineConfig {
    let spec = CostSpec {
        fee_mode: CostMode::Dynamic,
        slippage_mode: CostMode::Dynamic,
        ..CostSpec::default()
    };
    let cost = CostModel::from_spec(&spec, &ExchangeRegistry::builtin()).unwrap();
    let risk = RiskOverlay::new(RiskConfig {
        stop_loss: Some(0.05),
        take_profit: Some(0.1),
        trailing_stop: Some(0.03),
    })
    .unwrap();
    EngineConfig::new(10_000.0)
        .with_cost_model(cost)
        .with_risk(risk)
}

// ── 1. Simulation Loop ───────────────────────────────────────────────

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_loop");
    let generator = create_signal(&StrategySpec::default()).unwrap();

    for &bar_count in &[1_000, 8_760, 26_280] {
        let bars = make_bars(bar_count);
        let signals = generator.generate(&bars);
        let frictionless = EngineConfig::new(10_000.0);
        let full = full_cost_config();

        group.bench_with_input(
            BenchmarkId::new("frictionless", bar_count),
            &bar_count,
            |b, _| b.iter(|| simulate(black_box(&bars), black_box(&signals), &frictionless)),
        );
        group.bench_with_input(
            BenchmarkId::new("dynamic_costs_with_risk", bar_count),
            &bar_count,
            |b, _| b.iter(|| simulate(black_box(&bars), black_box(&signals), &full)),
        );
    }

    group.finish();
}

// ── 2. Signal Generation ─────────────────────────────────────────────

fn bench_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_generation");
    let bars = make_bars(8_760);
    let config = EngineConfig::new(10_000.0);

    for spec in [
        StrategySpec::default(),
        StrategySpec::Rsi {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        },
        StrategySpec::Bollinger {
            window: 20,
            num_std: 2.0,
        },
    ] {
        let generator = create_signal(&spec).unwrap();
        group.bench_function(BenchmarkId::new("generate", spec.kind()), |b| {
            b.iter(|| generator.generate(black_box(&bars)))
        });
        group.bench_function(BenchmarkId::new("end_to_end", spec.kind()), |b| {
            b.iter(|| run_backtest(black_box(&bars), generator.as_ref(), &config))
        });
    }

    group.finish();
}

// ── 3. Indicator Compute ─────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_compute");
    let bars = make_bars(8_760);

    let stack: Vec<(&str, Box<dyn Indicator>)> = vec![
        ("sma_partial_50", Box::new(Sma::partial(50))),
        ("rsi_14", Box::new(Rsi::new(14))),
        ("bollinger_lower_20", Box::new(Bollinger::lower(20, 2.0))),
    ];
    for (name, indicator) in &stack {
        group.bench_function(*name, |b| b.iter(|| indicator.compute(black_box(&bars))));
    }

    group.finish();
}

// ── 4. Dynamic Slippage Quote ────────────────────────────────────────

fn bench_quote(c: &mut Criterion) {
    let bars = make_bars(1_000);
    let config = full_cost_config();
    c.bench_function("dynamic_quote", |b| {
        b.iter(|| {
            config
                .cost_model
                .quote(Side::Buy, black_box(&bars), black_box(500), 25_000.0)
        })
    });
}

criterion_group!(
    benches,
    bench_simulation,
    bench_signals,
    bench_indicators,
    bench_quote,
);
criterion_main!(benches);
