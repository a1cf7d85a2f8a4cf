//! CoinLab CLI: single backtests and parameter sweeps.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file
//! - `sweep`: run a parameter grid and print a ranked table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use coinlab_core::domain::Bar;
use coinlab_runner::export::{export_run, export_sweep_csv};
use coinlab_runner::{
    load_bars_csv, run_backtest_from_bars, synthetic_bars, BacktestConfig, BacktestResult,
    ParamGrid, ParamSweep, SweepResults,
};

#[derive(Parser)]
#[command(name = "coinlab", about = "CoinLab CLI: crypto strategy backtesting engine")]
struct Cli {
    /// Log filter when COINLAB_LOG is unset (e.g. "info", "coinlab_core=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format: "text" or "json".
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Write trades.csv, equity.csv and summary.json here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Sweep a parameter grid over one series.
    Sweep {
        /// Base TOML config; the grid replaces its strategy.
        #[arg(long)]
        config: PathBuf,

        /// TOML parameter grid.
        #[arg(long)]
        grid: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run grid points one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Print the full results as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write sweep.csv here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Where the bars come from.
#[derive(Args)]
struct InputArgs {
    /// CSV file with timestamp,open,high,low,close,volume.
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Number of synthetic bars when no --data is given.
    #[arg(long, default_value_t = 500)]
    synthetic: usize,

    /// Seed for synthetic bars.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl InputArgs {
    fn load(&self) -> Result<Vec<Bar>> {
        match &self.data {
            Some(path) => load_bars_csv(path)
                .with_context(|| format!("failed to load bars from {}", path.display())),
            None => {
                tracing::warn!(
                    bars = self.synthetic,
                    seed = self.seed,
                    "no --data given, using synthetic bars"
                );
                Ok(synthetic_bars(self.synthetic, self.seed))
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, &cli.log_format)?;

    match cli.command {
        Commands::Run {
            config,
            input,
            output_dir,
        } => run_backtest_cmd(&config, &input, output_dir.as_deref()),
        Commands::Sweep {
            config,
            grid,
            input,
            top,
            sequential,
            json,
            output_dir,
        } => run_sweep_cmd(
            &config,
            &grid,
            &input,
            top,
            sequential,
            json,
            output_dir.as_deref(),
        ),
    }
}

/// Filter from COINLAB_LOG, else `log_level`. JSON output with `--log-format json`.
fn init_tracing(log_level: &str, log_format: &str) -> Result<()> {
    let filter = std::env::var("COINLAB_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .with_context(|| format!("invalid log filter '{filter}'"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match log_format.trim().to_lowercase().as_str() {
        "json" => builder.json().init(),
        _ => builder.init(),
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<BacktestConfig> {
    BacktestConfig::load(path).with_context(|| format!("failed to read config {}", path.display()))
}

fn run_backtest_cmd(config_path: &Path, input: &InputArgs, output_dir: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let bars = input.load()?;
    let result = run_backtest_from_bars(&config, &bars)?;

    print_summary(&result);

    if let Some(dir) = output_dir {
        let paths = export_run(&dir.join(&result.run_id[..12]), &result)?;
        println!();
        println!("Artifacts saved to: {}", paths.summary_json.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_sweep_cmd(
    config_path: &Path,
    grid_path: &Path,
    input: &InputArgs,
    top: usize,
    sequential: bool,
    json: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let base = load_config(config_path)?;
    let grid = ParamGrid::load(grid_path)
        .with_context(|| format!("failed to read grid {}", grid_path.display()))?;
    let bars = input.load()?;

    let results = ParamSweep::new(&bars, &base)
        .with_parallelism(!sequential)
        .sweep(&grid)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_sweep(&results, top);
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;
        let path = dir.join("sweep.csv");
        std::fs::write(&path, export_sweep_csv(&results)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Sweep table saved to: {}", path.display());
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let s = &result.summary;
    let first = result.ledger.entries().first().map(|e| e.timestamp);
    let last = result.ledger.last().map(|e| e.timestamp);

    println!();
    println!("=== Backtest Result ===");
    println!("Run:            {}", &result.run_id[..12]);
    println!("Strategy:       {}", result.strategy_label);
    println!(
        "Market:         {} on {}",
        result.config.instrument_symbol, result.config.exchange_id
    );
    if let (Some(first), Some(last)) = (first, last) {
        println!("Period:         {first} to {last}");
    }
    println!(
        "Bars:           {} ({} skipped)",
        result.bar_count,
        result.skipped_bars.len()
    );
    println!("Trades:         {}", s.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", result.initial_capital());
    println!("Final:          {:.2}", result.final_value());
    println!("Total Return:   {:.2}%", s.total_return_pct);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown_pct);
    println!(
        "DD Duration:    {} ({} bars)",
        format_duration(s.max_drawdown_duration),
        s.max_drawdown_bars
    );
    println!("Win Rate:       {:.1}%", s.win_rate_pct);
    println!("Sharpe:         {:.3}", s.sharpe_ratio);
    println!();
    println!("--- Costs ---");
    let c = &s.cost_breakdown;
    println!("Fees:           {:.4} ({:.3}% of notional)", c.total_fees, c.fee_pct_of_notional);
    println!(
        "Slippage:       {:.4} ({:.3}% of notional)",
        c.total_slippage, c.slippage_pct_of_notional
    );
    println!();
    println!("--- Round Trips ---");
    let t = &result.trade_stats;
    println!("Count:          {}", t.round_trips);
    println!("Total Profit:   {:.4}", t.total_profit);
    println!("Avg Profit:     {:.4}", t.avg_profit);
    println!("Best / Worst:   {:.4} / {:.4}", t.max_profit, t.max_loss);
    if !result.round_trips.is_empty() {
        let held: usize = result.round_trips.iter().map(|rt| rt.bars_held()).sum();
        let best_pct = result
            .round_trips
            .iter()
            .map(|rt| rt.return_pct())
            .fold(f64::NEG_INFINITY, f64::max);
        println!(
            "Avg Hold:       {:.1} bars",
            held as f64 / result.round_trips.len() as f64
        );
        println!("Best Trade:     {best_pct:.2}%");
    }
    if s.is_empty() {
        println!();
        println!("No trades executed; all metrics are zero.");
    }
    if !result.monthly_returns.is_empty() {
        println!();
        println!("--- Monthly Returns ---");
        for m in &result.monthly_returns {
            println!("{}-{:02}:        {:>8.2}%", m.year, m.month, m.return_pct);
        }
    }
}

fn print_sweep(results: &SweepResults, top: usize) {
    println!();
    println!(
        "{:<4} {:<48} {:>10} {:>10} {:>8} {:>8} {:>7}",
        "#", "Strategy", "Return %", "MaxDD %", "Win %", "Sharpe", "Trades"
    );
    println!("{}", "-".repeat(101));
    for (i, entry) in results.top(top).iter().enumerate() {
        let s = &entry.summary;
        println!(
            "{:<4} {:<48} {:>10.2} {:>10.2} {:>8.1} {:>8.3} {:>7}",
            i + 1,
            entry.label,
            s.total_return_pct,
            s.max_drawdown_pct,
            s.win_rate_pct,
            s.sharpe_ratio,
            s.trade_count
        );
    }
    println!();
    println!("{} grid points evaluated", results.len());
    if let Some(best) = results.best() {
        println!("Best:           {} (run {})", best.label, &best.run_id[..12]);
    }
}

fn format_duration(d: Duration) -> String {
    let days = d.num_days();
    let hours = d.num_hours() - days * 24;
    if days > 0 {
        format!("{days}d {hours}h")
    } else {
        format!("{hours}h {}m", d.num_minutes() - d.num_hours() * 60)
    }
}
