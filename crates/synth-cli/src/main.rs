// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Command-Line Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `synthdiag`: synthetic spectroscopy and imaging from JSON configurations.
//!
//! ```sh
//! synthdiag run configs/mastu_dms.json -o out/
//! synthdiag camera configs/mastu_camera.json
//! synthdiag validate configs/mastu_dms.json
//! synthdiag species
//! ```
//!
//! Set `RUST_LOG=info` for per-fibre progress.

mod runner;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use synth_types::config::SimulationConfig;

#[derive(Parser)]
#[command(name = "synthdiag")]
#[command(about = "Synthetic plasma diagnostics: divertor spectroscopy and filtered cameras")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load everything the configuration enables and write all groups.
    Run {
        /// Path to the JSON configuration.
        config: PathBuf,
        /// Output directory (overrides `output.directory`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the configured filtered camera only.
    Camera {
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a configuration without sampling.
    Validate { config: PathBuf },
    /// List the species registry.
    Species,
}

fn load(path: &Path) -> anyhow::Result<SimulationConfig> {
    SimulationConfig::from_file(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            let cfg = load(&config)?;
            let out_dir = output.unwrap_or_else(|| cfg.output.directory.clone());
            let written = runner::run(&cfg, &out_dir)?;
            println!(
                "Wrote {} to {}",
                written.join(", "),
                out_dir.display()
            );
            Ok(())
        }
        Commands::Camera { config, output } => {
            let cfg = load(&config)?;
            let out_dir = output.unwrap_or_else(|| cfg.output.directory.clone());
            runner::run_camera(&cfg, &out_dir)?;
            println!("Wrote camera to {}", out_dir.display());
            Ok(())
        }
        Commands::Validate { config } => {
            let cfg = load(&config)?;
            for line in runner::summary(&cfg)? {
                println!("{line}");
            }
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Species => {
            println!("{:<10} {:<4} {:>3} {:>10}", "name", "sym", "Z", "mass [amu]");
            for element in synth_types::species::REGISTRY {
                println!(
                    "{:<10} {:<4} {:>3} {:>10.4}",
                    element.name, element.symbol, element.atomic_number, element.atomic_weight
                );
            }
            Ok(())
        }
    }
}
