//! CoinLab Core: price series, strategies, costs, risk and the simulation loop.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (bars, trades, positions, ledger entries)
//! - Indicators and the three signal generators (MA cross, RSI, Bollinger)
//! - Cost model with exchange fee tiers and dynamic slippage
//! - Risk overlay (take-profit, stop-loss, trailing stop)
//! - Single-instrument FLAT/LONG simulation loop and FIFO trade pairing

pub mod components;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod indicators;
