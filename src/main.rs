// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! QuAlg command-line interface
//!
//! Evaluates the two-photon interference toolkit from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Effective POVM element for one photon in each detector
//! qualg povm --left 1 --right 1 --visibility 0.9
//!
//! # Same, with up to two photons in each input
//! qualg povm --left 2 --right 2 --max-photons 2
//!
//! # Detection probabilities for every input occupation
//! qualg measure --format json
//!
//! # Show effective configuration
//! qualg config --config /path/to/qualg.yaml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qualg::config::{Config, LoggingConfig};
use qualg::measure::{measure_with, total_probability, MeasurementResult};
use qualg::photonics::{
    detection_patterns, input_basis, interference_states, number_projector, povm_matrix,
    visibility_resolver,
};
use qualg::{BaseState, Result, VERSION};

/// Symbolic quantum algebra toolkit
#[derive(Parser)]
#[command(name = "qualg")]
#[command(author = "QuAlg Contributors")]
#[command(version = VERSION)]
#[command(about = "Symbolic quantum states, operators and photonic measurements")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective POVM element for a detection pattern
    Povm {
        /// Photons detected in the left output mode
        #[arg(long, default_value_t = 1)]
        left: u32,

        /// Photons detected in the right output mode
        #[arg(long, default_value_t = 1)]
        right: u32,

        /// Largest photon number in each input
        #[arg(long, env = "QUALG_MAX_PHOTONS")]
        max_photons: Option<u32>,

        /// Overlap of the two wavepackets
        #[arg(long, env = "QUALG_VISIBILITY")]
        visibility: Option<f64>,
    },

    /// Measure the beam splitter output for every input occupation
    Measure {
        /// Largest photon number in each input
        #[arg(long, env = "QUALG_MAX_PHOTONS")]
        max_photons: Option<u32>,

        /// Overlap of the two wavepackets
        #[arg(long, env = "QUALG_VISIBILITY")]
        visibility: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Detection statistics for one input occupation.
#[derive(Serialize)]
struct InputReport {
    input: String,
    total_probability: f64,
    outcomes: Vec<MeasurementResult<(u32, u32)>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::Povm {
            left,
            right,
            max_photons,
            visibility,
        } => {
            if let Some(n) = max_photons {
                config.photonics.max_photons = n;
            }
            if let Some(v) = visibility {
                config.photonics.visibility = v;
            }
            config.validate()?;
            let max_photons = config.photonics.max_photons;
            let visibility = config.photonics.visibility;
            info!(left, right, max_photons, visibility, "Computing effective POVM");

            let matrix = povm_matrix(left, right, max_photons, visibility)?;
            let basis = input_basis(max_photons)?;
            println!("POVM element for ({}, {}) detections, V = {}:", left, right, visibility);
            print_matrix(&matrix, &basis);
        }

        Commands::Measure {
            max_photons,
            visibility,
            format,
        } => {
            if let Some(n) = max_photons {
                config.photonics.max_photons = n;
            }
            if let Some(v) = visibility {
                config.photonics.visibility = v;
            }
            config.validate()?;
            let max_photons = config.photonics.max_photons;
            let visibility = config.photonics.visibility;

            let kraus = detection_patterns(2 * max_photons)
                .into_iter()
                .map(|(left, right)| Ok(((left, right), number_projector(left, right)?)))
                .collect::<Result<Vec<_>>>()?;
            let resolve = visibility_resolver(visibility);

            let mut reports = Vec::new();
            for ((n, m), state) in interference_states(max_photons)? {
                let outcomes = measure_with(&state, &kraus, &config.engine, &resolve)?;
                info!(n, m, outcomes = outcomes.len(), "Measured input occupation");
                reports.push(InputReport {
                    input: format!("{}{}", n, m),
                    total_probability: total_probability(&outcomes),
                    outcomes,
                });
            }

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
                OutputFormat::Text => print_reports(&reports, visibility),
            }
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing. Logs go to stderr so that command output
/// stays machine readable.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn print_matrix(matrix: &Array2<Complex64>, basis: &[BaseState]) {
    print!("{:>6}", "");
    for ket in basis {
        print!("{:>18}", ket.to_string());
    }
    println!();
    for (ket, row) in basis.iter().zip(matrix.rows()) {
        let bra = ket.to_string().replacen('|', "<", 1).replacen('>', "|", 1);
        print!("{:>6}", bra);
        for c in row.iter() {
            print!("{:>18}", format!("{:+.4}{:+.4}i", c.re, c.im));
        }
        println!();
    }
}

fn print_reports(reports: &[InputReport], visibility: f64) {
    println!("Detection probabilities (left, right), V = {}:", visibility);
    for report in reports {
        println!("  |{}>  total = {:.6}", report.input, report.total_probability);
        for outcome in report.outcomes.iter().filter(|o| o.probability > 0.0) {
            println!("    {:?}  p = {:.6}", outcome.outcome, outcome.probability);
        }
    }
}
