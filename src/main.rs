//! FnGuide-Harvest main entry point
//!
//! This is the command-line interface for the FnGuide financial metrics collector.

use anyhow::{bail, Context};
use clap::Parser;
use fnguide_harvest::codes::read_stock_codes;
use fnguide_harvest::config::{load_config_with_hash, Config};
use fnguide_harvest::crawler::{run_crawl, StopFlag};
use fnguide_harvest::output::print_summary;
use fnguide_harvest::Period;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// FnGuide-Harvest: collects revenue and operating profit per stock code
///
/// Logs in to FnGuide through a WebDriver-controlled browser, looks up every
/// stock code in the code list for the requested period and writes the
/// figures to a dated CSV file.
#[derive(Parser, Debug)]
#[command(name = "fnguide-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Collects FnGuide financial metrics per stock code", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Stock code list, one code per line (overrides output.codes-path)
    #[arg(long, value_name = "FILE")]
    codes: Option<PathBuf>,

    /// Fiscal year to collect (overrides [period])
    #[arg(long)]
    year: Option<i32>,

    /// Fiscal quarter, 1-4
    #[arg(long, requires = "year", conflicts_with = "annual")]
    quarter: Option<u8>,

    /// Collect annual figures
    #[arg(long, requires = "year")]
    annual: bool,

    /// Run the browser without a window
    #[arg(long, conflicts_with = "show_browser")]
    headless: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    show_browser: bool,

    /// Pause before each browser step until Enter is pressed
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be collected without starting a browser
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Credentials may come from a .env file
    dotenvy::dotenv().ok();

    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    apply_overrides(&mut config, &cli);

    let log_path = setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.log_dir))?;
    tracing::info!("Logging to {}", log_path.display());
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    let period = resolve_period(&cli, &config)?;
    let codes_path = cli
        .codes
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.codes_path));
    let codes = read_stock_codes(&codes_path)?;

    if cli.dry_run {
        handle_dry_run(&config, &period, &codes_path, &codes);
        return Ok(());
    }

    handle_harvest(config, period, codes).await
}

/// Applies command-line switches on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if cli.headless {
        config.browser.headless = true;
    }
    if cli.show_browser {
        config.browser.headless = false;
    }
    if cli.debug {
        config.debug.enabled = true;
    }
}

/// Picks the period from the command line, falling back to the config file
fn resolve_period(cli: &Cli, config: &Config) -> anyhow::Result<Period> {
    if let Some(year) = cli.year {
        if !cli.annual && cli.quarter.is_none() {
            bail!("--year needs either --quarter or --annual");
        }
        let quarter = if cli.annual { None } else { cli.quarter };
        return Ok(Period::from_parts(year, quarter)?);
    }

    match &config.period {
        Some(period) => Ok(Period::from_parts(period.year, period.quarter)?),
        None => bail!("No period given; pass --year with --quarter or --annual, or set [period]"),
    }
}

/// Sets up console and file logging based on verbosity level
///
/// Returns the path of the log file created in `log_dir`.
fn setup_logging(verbose: u8, quiet: bool, log_dir: &Path) -> anyhow::Result<PathBuf> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fnguide_harvest=info,warn"),
            1 => EnvFilter::new("fnguide_harvest=debug,info"),
            2 => EnvFilter::new("fnguide_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(format!(
        "harvest_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(log_path)
}

/// Handles the --dry-run mode: shows what would be collected
fn handle_dry_run(config: &Config, period: &Period, codes_path: &Path, codes: &[String]) {
    println!("=== FnGuide-Harvest Dry Run ===\n");

    println!("Browser:");
    println!("  WebDriver: {}", config.browser.webdriver_url);
    println!("  Headless: {}", config.browser.headless);
    println!("  Element timeout: {}s", config.browser.element_timeout_secs);
    println!("  Request delay: {}ms", config.browser.request_delay_ms);
    println!(
        "  Debug steps: {}",
        if config.debug.enabled { "on" } else { "off" }
    );

    println!("\nSite:");
    println!("  Login: {}", config.site.login_url);
    println!("  Item detail: {}", config.site.item_detail_url);
    println!("  User: {}", config.credentials.username);

    println!("\nPeriod:");
    println!("  {} (code {})", period, period.code());

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  Log directory: {}", config.output.log_dir);

    println!("\nStock Codes ({} from {}):", codes.len(), codes_path.display());
    for code in codes {
        println!("  - {}", code);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would collect {} codes for {}", codes.len(), period);
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, period: Period, codes: Vec<String>) -> anyhow::Result<()> {
    if codes.is_empty() {
        tracing::warn!("Stock code list is empty, nothing to do");
        return Ok(());
    }

    let stop = StopFlag::new();
    let handle = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current ticker");
            handle.stop();
        }
    });

    let summary = match run_crawl(Arc::new(config), period, &codes, stop).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&summary);

    if summary.outcome.is_failure() {
        bail!("Harvest ended early: {}", summary.outcome);
    }
    Ok(())
}
