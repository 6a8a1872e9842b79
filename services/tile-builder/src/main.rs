//! MBTiles builder CLI.
//!
//! Reads one or more JSON region configurations, fetches the covered
//! tiles from an XYZ REST service, composites an MGRS graticule with
//! zone labels onto each tile, and packages the results into MBTiles
//! archives.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use tile_builder::config::{self, RegionConfig};
use tile_builder::pipeline::{self, DEFAULT_WORKERS};

#[derive(Parser, Debug)]
#[command(name = "tile-builder")]
#[command(about = "Build MBTiles archives with MGRS grid overlays from JSON configurations")]
struct Args {
    /// JSON configuration files to process
    config_files: Vec<PathBuf>,

    /// Write example configuration files and exit
    #[arg(long)]
    create_examples: bool,

    /// Number of concurrent tile workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    max_workers: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.create_examples {
        let paths = config::write_example_configs(&PathBuf::from("."))?;
        for path in paths {
            info!(path = %path.display(), "Created example configuration");
        }
        return Ok(());
    }

    if args.config_files.is_empty() {
        bail!("no configuration files provided (use --create-examples to generate samples)");
    }

    // Load every configuration up front; a broken file skips only itself
    let mut regions = Vec::new();
    for path in &args.config_files {
        match RegionConfig::load(path) {
            Ok(region) => {
                info!(path = %path.display(), name = %region.name, "Loaded configuration");
                regions.push(region);
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "Failed to load configuration");
            }
        }
    }

    if regions.is_empty() {
        bail!("no valid configurations loaded");
    }

    let attempted = regions.len();
    let mut succeeded = 0;
    for region in &regions {
        match pipeline::run_region(region, args.max_workers).await {
            Ok(summary) => {
                info!(
                    region = %region.name,
                    output = %region.output_file.display(),
                    written = summary.written,
                    failed = summary.failed,
                    "Region finished"
                );
                succeeded += 1;
            }
            Err(err) => {
                error!(region = %region.name, error = %err, "Region failed");
            }
        }
    }

    info!(succeeded = succeeded, attempted = attempted, "All configurations processed");

    let failed_configs = attempted - succeeded + (args.config_files.len() - attempted);
    if failed_configs > 0 {
        bail!("{} of {} configurations failed", failed_configs, args.config_files.len());
    }

    Ok(())
}
