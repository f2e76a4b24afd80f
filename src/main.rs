use analytics::{calendar, composite_index, resample_month_end};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{Config, RunConfig};
use core_types::{Instrument, MonthEndSeries};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{FredClient, LiveProvider, SeriesProvider, YahooClient};
use reporting::{dual_momentum_summary, laa_summary, CsvReportWriter};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use strategies::{Candidate, DualMomentum, Laa};
use uuid::Uuid;

/// The main entry point for the Meridian signal engine.
#[tokio::main]
async fn main() {
    // Load environment variables (FRED_API_KEY) from an optional .env file.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match configuration::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, "starting signal run");

    // Execute the appropriate command
    let result = match cli.command {
        Commands::DualMomentum(args) => handle_dual_momentum(config, args).await,
        Commands::Laa(args) => handle_laa(config, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error during run: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Monthly retirement-portfolio signal engine: Dual Momentum and LAA timing.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the monthly Dual Momentum decision history.
    DualMomentum(RangeArgs),
    /// Compute the monthly LAA timing decision history.
    Laa(RangeArgs),
}

#[derive(Parser)]
struct RangeArgs {
    /// Override the configured first evaluation year.
    #[arg(long)]
    start_year: Option<i32>,

    /// Override the configured last evaluation year.
    #[arg(long)]
    end_year: Option<i32>,
}

// ==============================================================================
// Shared run plumbing
// ==============================================================================

/// The resolved date ranges of one run: what to fetch (including warm-up)
/// and what to evaluate.
struct RunRange {
    fetch_start: NaiveDate,
    eval_start: NaiveDate,
    eval_end: NaiveDate,
}

fn resolve_range(run: &RunConfig, args: &RangeArgs) -> anyhow::Result<RunRange> {
    let start_year = args.start_year.unwrap_or(run.start_year);
    let end_year = args.end_year.unwrap_or(run.end_year);
    if start_year > end_year {
        anyhow::bail!("start year {start_year} is after end year {end_year}");
    }

    let fetch_year = start_year - run.warmup_years as i32;
    let make = |year: i32, month: u32, day: u32| {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| anyhow::anyhow!("invalid date {year}-{month:02}-{day:02}"))
    };

    Ok(RunRange {
        fetch_start: make(fetch_year, 1, 1)?,
        eval_start: make(start_year, 1, 1)?,
        eval_end: make(end_year, 12, 31)?,
    })
}

fn fetch_progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(progress_bar)
}

// ==============================================================================
// Dual Momentum command
// ==============================================================================

async fn handle_dual_momentum(config: Config, args: RangeArgs) -> anyhow::Result<()> {
    use anyhow::Context;

    let range = resolve_range(&config.run, &args)?;
    println!(
        "Dual momentum run, evaluating {} through {}",
        range.eval_start, range.eval_end
    );

    let provider = LiveProvider::new(YahooClient::new()?, None, &config.provider);

    // One fetch per unique symbol across all candidate legs plus the bond.
    let mut symbols: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for leg in config
        .dual_momentum
        .candidates
        .iter()
        .flat_map(|c| c.legs.iter())
    {
        if seen.insert(leg.symbol.clone()) {
            symbols.push(leg.symbol.clone());
        }
    }
    if seen.insert(config.dual_momentum.bond.symbol.clone()) {
        symbols.push(config.dual_momentum.bond.symbol.clone());
    }

    let progress_bar = fetch_progress_bar(symbols.len() as u64)?;
    let fetches = symbols.iter().map(|symbol| {
        let provider = &provider;
        let progress_bar = &progress_bar;
        async move {
            progress_bar.set_message(format!("Fetching {symbol}..."));
            let result = provider
                .fetch_daily_prices(symbol, range.fetch_start, range.eval_end)
                .await;
            progress_bar.inc(1);
            (symbol.clone(), result)
        }
    });
    let results = join_all(fetches).await;
    progress_bar.finish_with_message("fetch complete");

    let mut daily_by_symbol = HashMap::new();
    for (symbol, result) in results {
        let series = result.with_context(|| format!("fetching daily prices for {symbol}"))?;
        tracing::info!(symbol = %symbol, observations = series.len(), "fetched daily prices");
        daily_by_symbol.insert(symbol, series);
    }

    // Month-end sampling over the full fetched range, warm-up included.
    let grid = calendar::month_ends(range.fetch_start, range.eval_end);
    let mut sampled = HashMap::new();
    for (symbol, prices) in &daily_by_symbol {
        let resampled = resample_month_end(prices, symbol, &grid)?;
        sampled.insert(symbol.clone(), resampled.series);
    }
    let sampled_series = |symbol: &str| -> anyhow::Result<MonthEndSeries> {
        sampled
            .get(symbol)
            .cloned()
            .with_context(|| format!("no sampled series for {symbol}"))
    };

    // Materialize candidates; multi-leg candidates become a synthetic index.
    let mut candidates = Vec::new();
    for candidate_config in &config.dual_momentum.candidates {
        let series = if candidate_config.legs.len() == 1 {
            sampled_series(&candidate_config.legs[0].symbol)?
        } else {
            let legs = candidate_config
                .legs
                .iter()
                .map(|leg| sampled_series(&leg.symbol))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let weights: Vec<f64> = candidate_config.legs.iter().map(|leg| leg.weight).collect();
            composite_index(&legs, &weights)?
        };
        candidates.push(Candidate {
            instrument: candidate_config.to_instrument(),
            series,
        });
    }
    let bond = Candidate {
        instrument: config.dual_momentum.bond.to_instrument(),
        series: sampled_series(&config.dual_momentum.bond.symbol)?,
    };

    let candidate_instruments: Vec<Instrument> =
        candidates.iter().map(|c| c.instrument.clone()).collect();

    let engine = DualMomentum::new(&config.dual_momentum, candidates, bond)?;
    let schedule = calendar::month_ends(range.eval_start, range.eval_end);
    let history = engine.run(&schedule);
    tracing::info!(
        records = history.records.len(),
        gaps = history.gaps.len(),
        "dual momentum run complete"
    );

    let writer = CsvReportWriter::new(&config.run.output_dir);
    let paths = writer.write_dual_momentum(&candidate_instruments, &history)?;
    for path in paths {
        println!("Wrote {}", path.display());
    }

    match dual_momentum_summary(&history) {
        Some(table) => println!("{table}"),
        None => println!("No evaluable month-ends in range; see dm_gaps.csv."),
    }
    if !history.gaps.is_empty() {
        println!("Skipped {} date(s); details in dm_gaps.csv.", history.gaps.len());
    }

    Ok(())
}

// ==============================================================================
// LAA command
// ==============================================================================

async fn handle_laa(config: Config, args: RangeArgs) -> anyhow::Result<()> {
    use anyhow::Context;

    let range = resolve_range(&config.run, &args)?;
    println!(
        "LAA timing run, evaluating {} through {}",
        range.eval_start, range.eval_end
    );

    let provider = LiveProvider::new(
        YahooClient::new()?,
        Some(FredClient::from_env()?),
        &config.provider,
    );

    let (prices, macro_series) = tokio::join!(
        provider.fetch_daily_prices(
            &config.laa.market.symbol,
            range.fetch_start,
            range.eval_end
        ),
        provider.fetch_macro_series(&config.laa.macro_series, range.fetch_start, range.eval_end),
    );
    let prices = prices.with_context(|| {
        format!("fetching daily prices for {}", config.laa.market.symbol)
    })?;
    let macro_series = macro_series
        .with_context(|| format!("fetching macro series {}", config.laa.macro_series))?;
    tracing::info!(
        market = %config.laa.market.symbol,
        price_observations = prices.len(),
        macro_observations = macro_series.len(),
        "fetched laa inputs"
    );

    let engine = Laa::new(&config.laa, prices, macro_series)?;
    let schedule = calendar::month_ends(range.eval_start, range.eval_end);
    let history = engine.run(&schedule);
    tracing::info!(
        records = history.records.len(),
        gaps = history.gaps.len(),
        "laa run complete"
    );

    let writer = CsvReportWriter::new(&config.run.output_dir);
    let paths = writer.write_laa(&history)?;
    for path in paths {
        println!("Wrote {}", path.display());
    }

    match laa_summary(&history, &config.laa.fixed_legs, config.laa.timing_weight) {
        Some(table) => println!("{table}"),
        None => println!("No evaluable month-ends in range; see laa_gaps.csv."),
    }
    if !history.gaps.is_empty() {
        println!("Skipped {} date(s); details in laa_gaps.csv.", history.gaps.len());
    }

    Ok(())
}
