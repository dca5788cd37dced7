// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! query-baseline: validate and inspect baseline suite files
//!
//! ```bash
//! query-baseline validate crates/test-utils/baselines/*/*.yaml
//! query-baseline show crates/test-utils/baselines/sqlite/northwind.yaml include_reference
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use query_baseline_cli::{ShowFormat, show_scenario, validate_files};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "query-baseline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate and inspect SQL baseline suites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check suite files for structural problems
    Validate {
        /// Suite files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the expected outcome of one scenario
    Show {
        /// Suite file
        file: PathBuf,
        /// Scenario name
        scenario: String,
        /// Output format
        #[arg(short, long, value_enum, default_value = "listing")]
        format: CliFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum CliFormat {
    Listing,
    Yaml,
    Rust,
}

impl From<CliFormat> for ShowFormat {
    fn from(val: CliFormat) -> Self {
        match val {
            CliFormat::Listing => ShowFormat::Listing,
            CliFormat::Yaml => ShowFormat::Yaml,
            CliFormat::Rust => ShowFormat::Rust,
        }
    }
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { files } => {
            let reports = validate_files(&files);
            for report in &reports {
                println!("{report}");
            }

            let failed = reports.iter().filter(|r| !r.is_ok()).count();
            tracing::info!(files = reports.len(), failed, "Validation finished");
            if failed > 0 {
                eprintln!("{failed} of {} suite file(s) have problems", reports.len());
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Show {
            file,
            scenario,
            format,
        } => {
            println!("{}", show_scenario(&file, &scenario, format.into())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
