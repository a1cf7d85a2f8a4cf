//! Serializable backtest configuration.
//!
//! A `BacktestConfig` is the full bundle needed to reproduce a run: strategy,
//! capital, cost settings, risk rules and any custom exchange profiles. It is
//! read from TOML and hashed through its JSON form for a stable run id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coinlab_core::components::{FactoryError, RiskConfig, RiskError, RiskOverlay, StrategySpec};
use coinlab_core::engine::EngineConfig;
use coinlab_core::execution::{
    CostError, CostMode, CostModel, CostSpec, ExchangeProfile, ExchangeRegistry, FeeValues,
};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("initial_capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
    #[error("risk_free_rate must be finite, got {0}")]
    InvalidRiskFreeRate(f64),
    #[error("strategy: {0}")]
    Strategy(#[from] FactoryError),
    #[error("risk: {0}")]
    Risk(#[from] RiskError),
    #[error("cost model: {0}")]
    Cost(#[from] CostError),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_exchange")]
    pub exchange_id: String,
    #[serde(default = "default_instrument")]
    pub instrument_symbol: String,
    /// Daily risk-free rate subtracted from per-bar returns in the Sharpe ratio.
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub fee_mode: CostMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_values: Option<FeeValues>,
    #[serde(default)]
    pub slippage_mode: CostMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_value: Option<f64>,
    #[serde(default)]
    pub strategy: StrategySpec,
    #[serde(default)]
    pub risk: RiskConfig,
    /// Custom exchange profiles; these replace built-ins with the same id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exchanges: BTreeMap<String, ExchangeProfile>,
}

fn default_capital() -> f64 {
    1000.0
}

fn default_exchange() -> String {
    "binance".to_string()
}

fn default_instrument() -> String {
    "BTC/USDT".to_string()
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_capital(),
            exchange_id: default_exchange(),
            instrument_symbol: default_instrument(),
            risk_free_rate: 0.0,
            fee_mode: CostMode::Fixed,
            fee_values: None,
            slippage_mode: CostMode::Fixed,
            slippage_value: None,
            strategy: StrategySpec::default(),
            risk: RiskConfig::default(),
            exchanges: BTreeMap::new(),
        }
    }
}

impl BacktestConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check everything that can be checked without building the cost model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::InvalidCapital(self.initial_capital));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::InvalidRiskFreeRate(self.risk_free_rate));
        }
        self.strategy.validate()?;
        RiskOverlay::new(self.risk)?;
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs share a run id.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }

    /// The cost-related subset of this configuration.
    pub fn cost_spec(&self) -> CostSpec {
        CostSpec {
            exchange_id: self.exchange_id.clone(),
            instrument_symbol: self.instrument_symbol.clone(),
            fee_mode: self.fee_mode,
            fee_values: self.fee_values,
            slippage_mode: self.slippage_mode,
            slippage_value: self.slippage_value,
        }
    }

    /// Built-in exchanges overlaid with the custom profiles.
    pub fn registry(&self) -> ExchangeRegistry {
        let mut registry = ExchangeRegistry::builtin();
        for (id, profile) in &self.exchanges {
            registry.insert(id, profile.clone());
        }
        registry
    }

    /// Validate and resolve into the engine's runtime configuration.
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        self.validate()?;
        let cost_model = CostModel::from_spec(&self.cost_spec(), &self.registry())?;
        let risk = RiskOverlay::new(self.risk)?;
        Ok(EngineConfig::new(self.initial_capital)
            .with_cost_model(cost_model)
            .with_risk(risk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinlab_core::execution::FeeModel;

    const FULL: &str = r#"
initial_capital = 5000.0
exchange_id = "okx"
instrument_symbol = "ETH/USDT"
risk_free_rate = 0.0001
fee_mode = "dynamic"
slippage_mode = "dynamic"

[fee_values]
maker = 0.0008
taker = 0.001

[strategy]
kind = "rsi"

[strategy.params]
period = 10
oversold = 25.0
overbought = 75.0

[risk]
stop_loss = 0.05
trailing_stop = 0.03
"#;

    #[test]
    fn empty_document_gives_defaults() {
        let config = BacktestConfig::from_toml_str("").unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.initial_capital, 1000.0);
        assert_eq!(config.exchange_id, "binance");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_full_document() {
        let config = BacktestConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.initial_capital, 5000.0);
        assert_eq!(config.fee_mode, CostMode::Dynamic);
        assert_eq!(
            config.strategy,
            StrategySpec::Rsi {
                period: 10,
                oversold: 25.0,
                overbought: 75.0
            }
        );
        assert_eq!(config.risk.stop_loss, Some(0.05));
        assert_eq!(config.risk.take_profit, None);
        assert!(config.to_engine_config().is_ok());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = BacktestConfig::from_toml_str("initial_captal = 10.0").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let config = BacktestConfig {
            initial_capital: 0.0,
            ..BacktestConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCapital(_))
        ));
    }

    #[test]
    fn invalid_strategy_is_rejected() {
        let config = BacktestConfig {
            strategy: StrategySpec::MaCross {
                short_window: 50,
                long_window: 20,
            },
            ..BacktestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Strategy(_))));
    }

    #[test]
    fn invalid_slippage_is_rejected_when_resolving() {
        let config = BacktestConfig {
            slippage_value: Some(0.2),
            ..BacktestConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.to_engine_config(),
            Err(ConfigError::Cost(CostError::Slippage(_)))
        ));
    }

    #[test]
    fn custom_exchange_overrides_builtin() {
        let toml = r#"
exchange_id = "Binance"
fee_mode = "dynamic"

[exchanges.binance]
maker = 0.002
taker = 0.003
base_slippage = 0.001
"#;
        let config = BacktestConfig::from_toml_str(toml).unwrap();
        let engine = config.to_engine_config().unwrap();
        match &engine.cost_model.fee {
            FeeModel::Tiered { taker, schedule, .. } => {
                assert_eq!(*taker, 0.003);
                assert!(schedule.tiers().is_empty());
            }
            other => panic!("expected tiered fee, got {other:?}"),
        }
    }

    #[test]
    fn run_id_is_deterministic() {
        let config = BacktestConfig::from_toml_str(FULL).unwrap();
        let id1 = config.run_id().unwrap();
        let id2 = config.clone().run_id().unwrap();
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 64);
    }

    #[test]
    fn run_id_changes_with_params() {
        let a = BacktestConfig::default();
        let mut b = a.clone();
        b.strategy = StrategySpec::MaCross {
            short_window: 10,
            long_window: 50,
        };
        assert_ne!(a.run_id().unwrap(), b.run_id().unwrap());
    }
}
