//! geokml-export - convert district, POI and metro sources to KML
//!
//! ```bash
//! geokml-export <districts|pois|metro|all> [--config FILE] [--output-dir DIR]
//! ```
//!
//! Exits non-zero when any selected pipeline produces nothing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt};

use geokml_common::config::{resolve_output_dir, LoggingConfig};
use geokml_common::ExportConfig;
use geokml_export::output::OutputManager;
use geokml_export::pipelines::{run_selected, ExportContext, PipelineKind, PipelineOutcome};
use geokml_export::sources::HttpFetcher;

/// Which sources to convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Districts,
    Pois,
    Metro,
    All,
}

/// Command-line arguments for geokml-export
#[derive(Parser, Debug)]
#[command(name = "geokml-export")]
#[command(about = "Convert geospatial sources (districts, POIs, metro) to KML")]
#[command(version)]
struct Args {
    /// Source to convert
    #[arg(value_enum)]
    source: Source,

    /// TOML configuration file (default: GEOKML_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base output directory
    #[arg(short, long, env = "GEOKML_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// City code for the POI feed
    #[arg(long)]
    city: Option<String>,

    /// GIS viewer URL carrying an `appid` parameter
    #[arg(long)]
    viewer_url: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before loading config; the configured level replaces
    // the startup filter only when RUST_LOG and --log-level are both unset
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().ok();
    let env_filter_set = env_filter.is_some();
    let initial_filter = env_filter
        .unwrap_or_else(|| startup_filter(args.log_level.as_deref()).into());
    let (filter, filter_handle) = reload::Layer::new(initial_filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config =
        ExportConfig::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    config.output_dir = resolve_output_dir(args.output_dir.as_deref(), &config);
    if let Some(city) = args.city {
        config.pois.city = city;
    }
    if let Some(viewer_url) = args.viewer_url {
        config.metro.viewer_url = Some(viewer_url);
    }
    if let Some(level) = configured_filter(env_filter_set, args.log_level.as_deref(), &config) {
        filter_handle
            .reload(tracing_subscriber::EnvFilter::new(level))
            .context("Failed to apply configured log level")?;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    info!("Starting geokml-export {}", env!("CARGO_PKG_VERSION"));
    info!("Output directory: {}", config.output_dir.display());

    let kinds = selected_pipelines(args.source, &config);

    let fetcher = HttpFetcher::new(&config.endpoints).context("Failed to build HTTP client")?;
    let output = OutputManager::new(&config.output_dir)
        .with_context(|| format!("Failed to prepare {}", config.output_dir.display()))?;
    let ctx = ExportContext::new(config, Arc::new(fetcher), output);

    let results = run_selected(&kinds, &ctx).await;

    let mut failed = 0;
    for (kind, outcome) in &results {
        match outcome {
            PipelineOutcome::Completed { paths, summary } => {
                println!("[{}] {}", kind, summary.display_string());
                if let Some(report) = &summary.merge {
                    for (field, count) in report.discrepancy_fields() {
                        println!("[{}]   {} locale discrepancies in {}", kind, count, field);
                    }
                }
                for path in paths {
                    println!("[{}] KML saved to: {}", kind, path.display());
                }
            }
            PipelineOutcome::NothingProduced { reason } => {
                failed += 1;
                println!("[{}] nothing produced: {}", kind, reason);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} pipelines produced nothing", failed, results.len());
    }
    Ok(())
}

/// Filter used while the configuration is still being read
fn startup_filter(cli_level: Option<&str>) -> String {
    cli_level
        .map(str::to_string)
        .unwrap_or_else(|| LoggingConfig::default().level)
}

/// Level from the config file, when neither RUST_LOG nor --log-level is set
fn configured_filter(env_filter_set: bool, cli_level: Option<&str>, config: &ExportConfig) -> Option<String> {
    if env_filter_set || cli_level.is_some() {
        None
    } else {
        Some(config.logging.level.clone())
    }
}

/// `all` only includes metro when a web map source is configured
fn selected_pipelines(source: Source, config: &ExportConfig) -> Vec<PipelineKind> {
    match source {
        Source::Districts => vec![PipelineKind::Districts],
        Source::Pois => vec![PipelineKind::Pois],
        Source::Metro => vec![PipelineKind::Metro],
        Source::All => PipelineKind::ALL
            .into_iter()
            .filter(|kind| {
                let keep = *kind != PipelineKind::Metro || config.metro.is_configured();
                if !keep {
                    info!("Metro skipped: no viewer URL or web map id configured");
                }
                keep
            })
            .collect(),
    }
}
