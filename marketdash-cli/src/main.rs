//! Market Dashboard CLI — scheduled entry point.
//!
//! Commands:
//! - `run` (default when no command is given): fetch, render and email the report
//! - `catalog`: print the ticker catalog as TOML, as a starting point for `--catalog`
//!
//! Delivery settings come from the environment (`EMAIL_SENDER`, `EMAIL_RECIPIENT`,
//! `EMAIL_PASSWORD` or `MAIL_API_KEY`, ...). They are validated before any
//! market data is requested.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use marketdash_core::data::{LogProgress, QuoteProvider, YahooProvider};
use marketdash_core::delivery::mailer_from_config;
use marketdash_core::{
    run_pipeline, Catalog, Delivery, DeliveryConfig, DisplayConfig, RunOptions, RunSummary,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "marketdash",
    about = "Daily market dashboard — fetch returns, render a PDF, email it"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report and email it (the default).
    Run(RunArgs),
    /// Print the ticker catalog as TOML.
    Catalog {
        /// Catalog file to print instead of the built-in one.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
struct RunArgs {
    /// TOML catalog replacing the built-in ticker list.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Where to keep a copy of the PDF.
    #[arg(long, default_value = "market_report.pdf")]
    output: PathBuf,

    /// Do not write the PDF to disk.
    #[arg(long, default_value_t = false)]
    no_artifact: bool,

    /// Render the report but do not send it; delivery settings are not required.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run(args)) => run_report(args),
        Some(Commands::Catalog { catalog }) => print_catalog(catalog.as_deref()),
        None => run_report(cli.run),
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => Catalog::from_file(p).with_context(|| format!("loading catalog {}", p.display())),
        None => Ok(Catalog::default_dashboard()),
    }
}

fn run_report(args: RunArgs) -> Result<()> {
    log::info!("{}", "=".repeat(60));
    log::info!("DAILY MARKET DASHBOARD");
    log::info!("{}", "=".repeat(60));

    let provider = YahooProvider::new().context("failed to set up market data client")?;
    let summary = execute(&args, |k| std::env::var(k).ok(), &provider, Utc::now())?;

    log::info!(
        "Done: {} rows ({} degraded), {} page(s), {} bytes, delivered: {}",
        summary.rows,
        summary.degraded_rows,
        summary.pages,
        summary.document_bytes,
        summary.delivered
    );
    Ok(())
}

/// Load configuration from `lookup`, wire the mailer and run the pipeline.
///
/// Every configuration check happens before the first provider request.
fn execute<F>(
    args: &RunArgs,
    lookup: F,
    provider: &dyn QuoteProvider,
    now: DateTime<Utc>,
) -> Result<RunSummary>
where
    F: Fn(&str) -> Option<String>,
{
    let display = DisplayConfig::from_lookup(&lookup).context("invalid display configuration")?;
    let delivery_config = if args.dry_run {
        None
    } else {
        Some(DeliveryConfig::from_lookup(&lookup).context("invalid delivery configuration")?)
    };
    let catalog = load_catalog(args.catalog.as_deref())?;

    let mailer = delivery_config
        .as_ref()
        .map(|cfg| mailer_from_config(&cfg.transport))
        .transpose()
        .context("failed to set up mail transport")?;
    let delivery = match (&delivery_config, &mailer) {
        (Some(cfg), Some(m)) => Some(Delivery {
            mailer: m.as_ref(),
            sender: cfg.sender.clone(),
            recipients: cfg.recipients.clone(),
        }),
        _ => None,
    };

    let options = RunOptions {
        display,
        artifact_path: (!args.no_artifact).then(|| args.output.clone()),
    };

    Ok(run_pipeline(
        &catalog,
        provider,
        &LogProgress,
        delivery.as_ref(),
        now,
        &options,
    )?)
}

fn print_catalog(path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(path)?;
    print!("{}", catalog.to_toml()?);
    Ok(())
}
