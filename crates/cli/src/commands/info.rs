//! `info` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use config_loader::ConfigLoader;
use contracts::EngineConfig;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration info");
            if !path.exists() {
                return Err(CliError::input_not_found(path).into());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file, showing defaults");
            EngineConfig::default()
        }
    };

    let rendered = if args.json {
        ConfigLoader::to_json(&config)
    } else {
        ConfigLoader::to_toml(&config)
    }
    .context("Failed to serialize configuration")?;

    if !args.json {
        print_header(&config);
    }
    println!("{}", rendered);

    Ok(())
}

fn print_header(config: &EngineConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Race Telemetry Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    match config.race_type {
        Some(race_type) => println!("# race type: {} (override)", race_type),
        None => println!("# race type: inferred from telemetry"),
    }
    println!(
        "# {} sectors, {} master track points\n",
        config.analysis.sector_count, config.fusion.resample_count
    );
}
