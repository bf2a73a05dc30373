use analytics::{
    correlation_matrix, format_metrics, monthly_returns, yearly_returns, AnalyticsEngine, FormatRule,
    MetricKind, RollingWindows,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use core_types::{Objective, PriceMatrix};
use optimizer::{PortfolioOptimizer, PortfolioResult};
use screener::Screener;
use serde::Serialize;
use std::path::PathBuf;

mod loader;

use loader::{load_prices, load_universe, parse_asset, parse_key_value};

/// The main entry point for the Flux analytics application.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config(cli.config.as_deref())?;
    for (key, value) in &cli.overrides {
        settings.set(key, value)?;
    }
    settings.validate()?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = configuration::init_tracing(&settings.logging)?;
    tracing::info!(command = cli.command.name(), "Starting flux");

    // Execute the appropriate command
    match cli.command {
        Commands::Metrics(args) => handle_metrics(args, settings),
        Commands::Rolling(args) => handle_rolling(args, settings),
        Commands::Regime(args) => handle_regime(args, settings),
        Commands::Monthly(args) => handle_monthly(args),
        Commands::Correlation(args) => handle_correlation(args),
        Commands::Optimize(args) => handle_optimize(args, settings),
        Commands::Screen(args) => handle_screen(args, settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Quantitative analytics for daily price series stored as JSON bar files.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./flux.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override a configuration key, e.g. `--set risk_free_rate=0.03`.
    #[arg(long = "set", value_parser = parse_key_value, global = true)]
    overrides: Vec<(String, String)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the risk/return metric report of a price series.
    Metrics(MetricsArgs),
    /// Print rolling volatility, Sharpe and drawdown per date as JSON.
    Rolling(RollingArgs),
    /// Print the trend / volatility regime per date as JSON.
    Regime(FileArgs),
    /// Print monthly and yearly returns as JSON.
    Monthly(FileArgs),
    /// Print the return correlation matrix of several assets.
    Correlation(UniverseArgs),
    /// Optimize portfolio weights and compare them with equal weighting.
    Optimize(OptimizeArgs),
    /// Compute metrics for many assets in parallel and rank them.
    Screen(ScreenArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Metrics(_) => "metrics",
            Commands::Rolling(_) => "rolling",
            Commands::Regime(_) => "regime",
            Commands::Monthly(_) => "monthly",
            Commands::Correlation(_) => "correlation",
            Commands::Optimize(_) => "optimize",
            Commands::Screen(_) => "screen",
        }
    }
}

#[derive(Parser)]
struct FileArgs {
    /// JSON file with an array of daily bars.
    file: PathBuf,
}

#[derive(Parser)]
struct MetricsArgs {
    /// JSON file with an array of daily bars.
    file: PathBuf,

    /// Bar file of a benchmark; enables beta, alpha, tracking error and info ratio.
    #[arg(long)]
    benchmark: Option<PathBuf>,

    /// Annual risk-free rate (0.04 = 4%). Defaults to the configured rate.
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Print unformatted values as JSON instead of a table.
    #[arg(long)]
    raw: bool,
}

#[derive(Parser)]
struct RollingArgs {
    /// JSON file with an array of daily bars.
    file: PathBuf,

    #[arg(long)]
    vol_window: Option<usize>,

    #[arg(long)]
    sharpe_window: Option<usize>,
}

#[derive(Parser)]
struct UniverseArgs {
    /// An asset as NAME=FILE. Repeat for every asset.
    #[arg(long = "asset", value_parser = parse_asset, required = true)]
    assets: Vec<(String, PathBuf)>,
}

#[derive(Parser)]
struct OptimizeArgs {
    #[command(flatten)]
    universe: UniverseArgs,

    /// One of: sharpe, min-vol, max-return.
    #[arg(long, default_value = "sharpe")]
    objective: Objective,

    /// Annual risk-free rate (0.04 = 4%). Defaults to the configured rate.
    #[arg(long)]
    risk_free_rate: Option<f64>,
}

#[derive(Parser)]
struct ScreenArgs {
    #[command(flatten)]
    universe: UniverseArgs,

    /// Metric to rank by, e.g. sharpe_ratio or max_drawdown.
    #[arg(long, default_value = "sharpe_ratio")]
    sort_by: MetricKind,

    /// Rank smallest first.
    #[arg(long)]
    ascending: bool,

    /// Bar file of a benchmark for the relative metrics.
    #[arg(long)]
    benchmark: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_metrics(args: MetricsArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(rate) = args.risk_free_rate {
        settings.set_risk_free_rate(rate)?;
    }
    let engine = AnalyticsEngine::new(settings.analytics);

    let prices = load_prices(&args.file)?;
    let benchmark = args.benchmark.as_deref().map(load_prices).transpose()?;
    let report = engine
        .compute_metrics(&prices, benchmark.as_ref(), None)
        .with_context(|| format!("Failed to compute metrics for {}", args.file.display()))?;

    if args.raw {
        return print_json(&report);
    }

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (kind, value) in format_metrics(&report) {
        table.add_row(vec![kind.label().to_string(), value]);
    }
    println!("{table}");
    Ok(())
}

fn handle_rolling(args: RollingArgs, settings: Settings) -> anyhow::Result<()> {
    let engine = AnalyticsEngine::new(settings.analytics);
    let defaults = engine.default_windows();
    let windows = RollingWindows {
        volatility: args.vol_window.unwrap_or(defaults.volatility),
        sharpe: args.sharpe_window.unwrap_or(defaults.sharpe),
    };

    let prices = load_prices(&args.file)?;
    let frame = engine.compute_rolling_metrics_with(&prices, windows)?;
    print_json(&frame)
}

fn handle_regime(args: FileArgs, settings: Settings) -> anyhow::Result<()> {
    let engine = AnalyticsEngine::new(settings.analytics);
    let prices = load_prices(&args.file)?;
    let frame = engine.detect_regime(&prices)?;

    if let Some(latest) = frame.latest() {
        tracing::info!(
            date = %latest.date,
            trend = ?latest.trend,
            vol_regime = ?latest.volatility_regime,
            hurst = engine.hurst_exponent(&prices),
            "Current regime"
        );
    }
    print_json(&frame)
}

#[derive(Serialize)]
struct CalendarReturns {
    monthly: analytics::MonthlyReturns,
    yearly: std::collections::BTreeMap<i32, f64>,
}

fn handle_monthly(args: FileArgs) -> anyhow::Result<()> {
    let prices = load_prices(&args.file)?;
    print_json(&CalendarReturns {
        monthly: monthly_returns(&prices)?,
        yearly: yearly_returns(&prices)?,
    })
}

fn handle_correlation(args: UniverseArgs) -> anyhow::Result<()> {
    let matrix = PriceMatrix::align(load_universe(&args.assets)?)?;
    let corr = correlation_matrix(&matrix)?;

    let mut table = Table::new();
    let mut header = vec![String::new()];
    header.extend(corr.assets().iter().cloned());
    table.set_header(header);
    for (asset, row) in corr.assets().iter().zip(corr.values()) {
        let mut cells = vec![asset.clone()];
        cells.extend(row.iter().map(|v| FormatRule::Fixed.apply(*v)));
        table.add_row(cells);
    }
    println!("{table}");
    Ok(())
}

fn handle_optimize(args: OptimizeArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(rate) = args.risk_free_rate {
        settings.set_risk_free_rate(rate)?;
    }
    let optimizer = PortfolioOptimizer::from_settings(&settings);

    let matrix = PriceMatrix::align(load_universe(&args.universe.assets)?)?;
    tracing::info!(
        assets = matrix.n_assets(),
        dates = matrix.n_dates(),
        objective = %args.objective,
        "Optimizing portfolio"
    );
    let optimal = optimizer.optimize(&matrix, args.objective, None)?;
    let baseline = optimizer.equal_weight(&matrix, None)?;

    println!("{}", optimization_table(matrix.assets(), &optimal, &baseline, args.objective));
    Ok(())
}

fn optimization_table(
    assets: &[String],
    optimal: &PortfolioResult,
    baseline: &PortfolioResult,
    objective: Objective,
) -> Table {
    let percent = |v: f64| FormatRule::Percent.apply(v);
    let mut table = Table::new();
    table.set_header(vec![String::new(), objective.to_string(), "equal-weight".to_string()]);
    for asset in assets {
        table.add_row(vec![
            asset.clone(),
            optimal.weight(asset).map(percent).unwrap_or_default(),
            baseline.weight(asset).map(percent).unwrap_or_default(),
        ]);
    }
    table.add_row(vec![
        "Expected Return".to_string(),
        percent(optimal.expected_return),
        percent(baseline.expected_return),
    ]);
    table.add_row(vec![
        "Volatility".to_string(),
        percent(optimal.expected_volatility),
        percent(baseline.expected_volatility),
    ]);
    table.add_row(vec![
        "Sharpe Ratio".to_string(),
        FormatRule::Fixed.apply(optimal.sharpe_ratio),
        FormatRule::Fixed.apply(baseline.sharpe_ratio),
    ]);
    table
}

fn handle_screen(args: ScreenArgs, settings: Settings) -> anyhow::Result<()> {
    let universe = load_universe(&args.universe.assets)?;
    let benchmark = args.benchmark.as_deref().map(load_prices).transpose()?;

    let screener = Screener::new(AnalyticsEngine::new(settings.analytics));
    let ranked = screener.screen(&universe, benchmark.as_ref(), args.sort_by, args.ascending)?;

    let columns: Vec<MetricKind> = if benchmark.is_some() {
        MetricKind::all().collect()
    } else {
        MetricKind::BASE.to_vec()
    };
    let mut table = Table::new();
    let mut header = vec!["Ticker".to_string()];
    header.extend(columns.iter().map(|k| k.label().to_string()));
    table.set_header(header);
    for entry in &ranked {
        let formatted = format_metrics(&entry.report);
        let mut cells = vec![entry.ticker.clone()];
        cells.extend(columns.iter().map(|k| formatted.get(k).cloned().unwrap_or_default()));
        table.add_row(cells);
    }
    println!("{table}");
    Ok(())
}
