//! Artifact export: trade tape, equity curve and the full result as JSON.
//!
//! A run directory holds:
//! - `trades.csv`: one row per executed trade
//! - `equity.csv`: one row per bar of the ledger
//! - `summary.json`: the complete `BacktestResult`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coinlab_core::domain::{Ledger, Side, Trade};

use crate::runner::BacktestResult;
use crate::sweep::SweepResults;

/// Files written by `export_run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
    pub summary_json: PathBuf,
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

pub fn import_json(json: &str) -> Result<BacktestResult> {
    serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: bar_index, timestamp, side, reason, reference_price,
/// effective_price, units, value, notional_value, fee, slippage_cost,
/// realized_profit
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "bar_index",
        "timestamp",
        "side",
        "reason",
        "reference_price",
        "effective_price",
        "units",
        "value",
        "notional_value",
        "fee",
        "slippage_cost",
        "realized_profit",
    ])?;

    for t in trades {
        let side = match t.side {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };
        wtr.write_record([
            t.bar_index.to_string(),
            t.timestamp.to_rfc3339(),
            side.to_string(),
            t.reason.as_str().to_string(),
            format!("{:.8}", t.reference_price),
            format!("{:.8}", t.effective_price),
            format!("{:.10}", t.units),
            format!("{:.8}", t.value),
            format!("{:.8}", t.notional_value),
            format!("{:.8}", t.fee),
            format!("{:.8}", t.slippage_cost()),
            t.realized_profit
                .map(|p| format!("{p:.8}"))
                .unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV is not valid UTF-8")
}

/// Columns: bar_index, timestamp, cash, position_value, total_value
pub fn export_equity_csv(ledger: &Ledger) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "timestamp", "cash", "position_value", "total_value"])?;
    for e in ledger.entries() {
        wtr.write_record([
            e.bar_index.to_string(),
            e.timestamp.to_rfc3339(),
            format!("{:.8}", e.cash),
            format!("{:.8}", e.position_value),
            format!("{:.8}", e.total_value),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV is not valid UTF-8")
}

/// Columns: rank, label, total_return_pct, max_drawdown_pct, win_rate_pct,
/// sharpe_ratio, trades, run_id
pub fn export_sweep_csv(results: &SweepResults) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "label",
        "total_return_pct",
        "max_drawdown_pct",
        "win_rate_pct",
        "sharpe_ratio",
        "trades",
        "run_id",
    ])?;
    for (i, entry) in results.entries.iter().enumerate() {
        let s = &entry.summary;
        wtr.write_record([
            (i + 1).to_string(),
            entry.label.clone(),
            format!("{:.4}", s.total_return_pct),
            format!("{:.4}", s.max_drawdown_pct),
            format!("{:.2}", s.win_rate_pct),
            format!("{:.4}", s.sharpe_ratio),
            s.trade_count.to_string(),
            entry.run_id.clone(),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush sweep CSV")?;
    String::from_utf8(bytes).context("sweep CSV is not valid UTF-8")
}

// ─── Directory export ───────────────────────────────────────────────

/// Write all artifacts for one run into `output_dir`, creating it if needed.
pub fn export_run(output_dir: &Path, result: &BacktestResult) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir {}", output_dir.display()))?;

    let paths = ArtifactPaths {
        trades_csv: output_dir.join("trades.csv"),
        equity_csv: output_dir.join("equity.csv"),
        summary_json: output_dir.join("summary.json"),
    };

    write_file(&paths.trades_csv, &export_trades_csv(&result.trades)?)?;
    write_file(&paths.equity_csv, &export_equity_csv(&result.ledger)?)?;
    write_file(&paths.summary_json, &export_json(result)?)?;

    tracing::info!(dir = %output_dir.display(), "artifacts written");
    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
