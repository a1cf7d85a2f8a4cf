//! Exchange fee/slippage profiles and instrument volatility coefficients.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fee::VolumeTier;

/// Base rates and volume tiers for one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeProfile {
    pub maker: f64,
    pub taker: f64,
    pub base_slippage: f64,
    #[serde(default)]
    pub tiers: Vec<VolumeTier>,
}

impl ExchangeProfile {
    pub fn new(maker: f64, taker: f64, base_slippage: f64, tiers: &[(f64, f64)]) -> Self {
        Self {
            maker,
            taker,
            base_slippage,
            tiers: tiers
                .iter()
                .map(|&(min_volume, discount)| VolumeTier {
                    min_volume,
                    discount,
                })
                .collect(),
        }
    }

    /// Profile used for unrecognised exchange ids.
    pub fn fallback() -> Self {
        Self::new(0.001, 0.001, 0.0005, &[])
    }
}

/// Lookup table of exchange profiles, keyed by lowercase id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRegistry {
    profiles: HashMap<String, ExchangeProfile>,
}

impl Default for ExchangeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExchangeRegistry {
    /// Registry holding the built-in exchanges.
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            "binance".to_string(),
            ExchangeProfile::new(
                0.001,
                0.001,
                0.0005,
                &[(1e6, 0.10), (5e6, 0.20), (2e7, 0.30), (1e8, 0.40)],
            ),
        );
        profiles.insert(
            "bybit".to_string(),
            ExchangeProfile::new(0.001, 0.001, 0.0005, &[(1e6, 0.10), (1e7, 0.25), (5e7, 0.35)]),
        );
        profiles.insert(
            "okx".to_string(),
            ExchangeProfile::new(0.0008, 0.001, 0.0005, &[(5e6, 0.15), (1e7, 0.25), (1e8, 0.35)]),
        );
        profiles.insert(
            "upbit".to_string(),
            ExchangeProfile::new(0.0005, 0.0005, 0.0008, &[]),
        );
        Self { profiles }
    }

    /// Add or replace a profile.
    pub fn insert(&mut self, id: &str, profile: ExchangeProfile) {
        self.profiles.insert(id.to_ascii_lowercase(), profile);
    }

    pub fn get(&self, id: &str) -> Option<&ExchangeProfile> {
        self.profiles.get(&id.to_ascii_lowercase())
    }

    /// Resolve `id`, falling back to the default profile. The flag is false on fallback.
    pub fn resolve(&self, id: &str) -> (ExchangeProfile, bool) {
        match self.get(id) {
            Some(profile) => (profile.clone(), true),
            None => (ExchangeProfile::fallback(), false),
        }
    }
}

/// Volatility coefficient applied to the base slippage for an instrument.
///
/// Keyed by the base asset of a `BASE/QUOTE` symbol; unknown assets get 1.0.
pub fn volatility_coefficient(instrument: &str) -> f64 {
    let base = instrument
        .split(['/', '-', '_'])
        .next()
        .unwrap_or(instrument)
        .trim()
        .to_ascii_uppercase();
    match base.as_str() {
        "BTC" => 1.0,
        "ETH" => 1.2,
        "XRP" => 1.3,
        "ADA" => 1.4,
        "SOL" => 1.5,
        _ => 1.0,
    }
}
