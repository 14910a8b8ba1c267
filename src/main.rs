//! Redirect Mapper main entry point
//!
//! This is the command-line interface for mapping a retired site's URLs onto
//! a replacement site.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use redirect_mapper::config::{
    load_config_with_text, resolve_api_key, resolve_credentials, validate, Config,
};
use redirect_mapper::matching::{GeminiClient, MatchMode, ModelClass};
use redirect_mapper::output::{
    default_csv_path, format_run_report, load_latest_matches, print_summary, summarize,
    write_csv,
};
use redirect_mapper::pipeline::{Pipeline, RunInputs};
use redirect_mapper::progress::{BarProgress, LogProgress, ProgressReporter};
use redirect_mapper::storage::{self, SqliteStorage, Storage};
use redirect_mapper::RunState;
use tracing_subscriber::EnvFilter;

/// Redirect Mapper: pairs old URLs with new ones for site migrations
///
/// Reads two URL lists, optionally crawls both sides for titles, headings
/// and descriptions, asks an inference model to match them in batches and
/// writes the resulting redirect table as CSV.
#[derive(Parser, Debug)]
#[command(name = "redirect-mapper")]
#[command(version = "1.0.0")]
#[command(about = "Maps old site URLs to new site URLs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl both sites and match on page content
    #[arg(long, conflicts_with = "no_crawl")]
    crawl: bool,

    /// Match on URLs only, without crawling
    #[arg(long, conflicts_with = "crawl")]
    no_crawl: bool,

    /// Override the configured inference model
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Validate config and inputs and show what would run, without network access
    #[arg(long, conflicts_with_all = ["stats", "export_csv", "clear_checkpoints"])]
    dry_run: bool,

    /// Show the match summary of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_csv", "clear_checkpoints"])]
    stats: bool,

    /// Re-export the latest run's matches to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats", "clear_checkpoints"])]
    export_csv: Option<PathBuf>,

    /// Delete all persisted runs and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "export_csv"])]
    clear_checkpoints: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_text) = load_config_with_text(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    apply_overrides(&mut config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if let Some(path) = &cli.export_csv {
        handle_export_csv(&config, path)
    } else if cli.clear_checkpoints {
        handle_clear_checkpoints(&config)
    } else {
        handle_run(&config, &config_text, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("redirect_mapper=info,warn"),
            1 => EnvFilter::new("redirect_mapper=debug,info"),
            2 => EnvFilter::new("redirect_mapper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if cli.crawl {
        config.crawler.enabled = true;
    } else if cli.no_crawl {
        config.crawler.enabled = false;
    }
    if let Some(model) = &cli.model {
        config.inference.model = model.clone();
    }
    validate(config).context("Invalid command-line override")?;
    Ok(())
}

fn open_storage(config: &Config) -> Result<SqliteStorage> {
    storage::open_storage(Path::new(&config.output.database_path)).with_context(|| {
        format!("Failed to open database {}", config.output.database_path)
    })
}

/// Handles the --dry-run mode: validates config and inputs and shows the plan
fn handle_dry_run(config: &Config) -> Result<()> {
    let inputs = RunInputs::load(&config.input).context("Failed to load URL lists")?;
    let mode = MatchMode::from_crawl_enabled(config.crawler.enabled);
    let batch_size = config
        .inference
        .batch_size
        .unwrap_or_else(|| ModelClass::from_model_name(&config.inference.model).batch_size());

    println!("=== Redirect Mapper Dry Run ===\n");

    println!("Inputs:");
    println!("  Old URLs: {} ({})", inputs.old_urls.len(), config.input.old_urls);
    println!("  New URLs: {} ({})", inputs.new_urls.len(), config.input.new_urls);

    println!("\nMode: {}", mode);
    if mode == MatchMode::Crawled {
        println!("  Max retries: {}", config.crawler.max_retries);
        println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
        println!("  Crawl delay: {}ms", config.crawler.crawl_delay_ms);
        println!(
            "  Basic auth: {}",
            config
                .auth
                .as_ref()
                .map(|a| a.username.as_str())
                .unwrap_or("none")
        );
    }

    println!("\nInference:");
    println!("  Model: {}", config.inference.model);
    println!("  Batch size: {}", batch_size);
    println!("  Batch delay: {}ms", config.inference.batch_delay_ms);
    println!("  API key variable: {}", config.inference.api_key_env);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!(
        "  CSV: {}",
        config
            .output
            .csv_path
            .as_deref()
            .unwrap_or("redirects_<timestamp>.csv")
    );

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would send {} batches",
        inputs.old_urls.len().div_ceil(batch_size.max(1))
    );

    Ok(())
}

/// Handles the --stats mode: shows the summary of the latest run
fn handle_stats(config: &Config) -> Result<()> {
    let storage = open_storage(config)?;

    println!("Database: {}\n", config.output.database_path);

    match load_latest_matches(&storage)? {
        Some((run, matches)) => {
            println!("Run {} ({}, {}, {})", run.id, run.status, run.mode, run.model);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!();
            print_summary(&summarize(&matches));
        }
        None => println!("No runs recorded yet"),
    }

    Ok(())
}

/// Handles the --export-csv mode: re-exports the latest run's matches
fn handle_export_csv(config: &Config, path: &Path) -> Result<()> {
    let storage = open_storage(config)?;

    let (run, matches) =
        load_latest_matches(&storage)?.context("No runs recorded yet, nothing to export")?;

    write_csv(&matches, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "✓ Exported {} matches from run {} to: {}",
        matches.len(),
        run.id,
        path.display()
    );

    Ok(())
}

/// Handles the --clear-checkpoints mode: deletes every persisted run
fn handle_clear_checkpoints(config: &Config) -> Result<()> {
    let mut storage = open_storage(config)?;
    let runs = storage.count_runs()?;
    storage.clear_all()?;

    println!("✓ Cleared {} runs from {}", runs, config.output.database_path);

    Ok(())
}

/// Handles the main mapping run
async fn handle_run(config: &Config, config_text: &str, quiet: bool) -> Result<()> {
    // Everything that can fail for configuration reasons happens before any request
    let inputs = RunInputs::load(&config.input).context("Failed to load URL lists")?;
    let api_key = resolve_api_key(&config.inference)?;
    let credentials = if config.crawler.enabled {
        resolve_credentials(config.auth.as_ref())?
    } else {
        None
    };

    tracing::info!(
        "Loaded {} old URLs and {} new URLs",
        inputs.old_urls.len(),
        inputs.new_urls.len()
    );

    let client = Arc::new(
        GeminiClient::from_config(&config.inference, api_key)
            .context("Failed to build inference HTTP client")?,
    );
    let pipeline = Pipeline::from_config(config, client, credentials)?;
    let mut storage = open_storage(config)?;
    let fingerprint = inputs.fingerprint(config_text);

    let progress: Box<dyn ProgressReporter> = if quiet {
        Box::new(LogProgress)
    } else {
        Box::new(BarProgress::new())
    };

    let mut state = RunState::new();
    let report = pipeline
        .run(&inputs, &fingerprint, &mut state, &mut storage, progress.as_ref())
        .await
        .context("Run failed")?;

    let csv_path = config
        .output
        .csv_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_csv_path(chrono::Local::now()));
    write_csv(&state.matches, &csv_path)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    println!("{}", format_run_report(&report, &state.matches));
    println!("✓ Redirect table written to: {}", csv_path.display());

    Ok(())
}
