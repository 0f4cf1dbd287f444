pub mod plan;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::TypedValueParser as _;
use clap::{Args, Parser, Subcommand};
use portwatch_common::config::{Config, DEFAULT_ENGINE, DEFAULT_OPTIONS, DEFAULT_WORKERS};

#[derive(Parser)]
#[command(name = "portwatch")]
#[command(version, about = "Periodic port scans and new-port reports per business unit.")]
pub struct CommandLine {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifies the business unit and where its configuration lives.
#[derive(Args, Debug, Clone)]
pub struct UnitArgs {
    /// Name of the business unit
    pub business_unit: String,

    /// Top-level directory holding config/ and the nmap-<unit>/ output
    #[arg(short, long)]
    pub path: PathBuf,

    /// Organisation the business unit belongs to
    #[arg(long, default_value = "")]
    pub org: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the configuration and show the scan units without running them
    #[command(alias = "p")]
    Plan {
        #[command(flatten)]
        unit: UnitArgs,

        /// Options passed to the engine in front of each unit's own
        #[arg(long, default_value = DEFAULT_OPTIONS, allow_hyphen_values = true)]
        options: String,

        /// Engine binary
        #[arg(long, default_value = DEFAULT_ENGINE)]
        nmap: String,
    },
    /// Scan a business unit and write its report
    #[command(alias = "s")]
    Scan {
        #[command(flatten)]
        unit: UnitArgs,

        /// Number of engine processes running at once
        #[arg(short, long, default_value_t = DEFAULT_WORKERS,
              value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
        workers: usize,

        /// Kill a unit's engine process after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Options passed to the engine in front of each unit's own
        #[arg(long, default_value = DEFAULT_OPTIONS, allow_hyphen_values = true)]
        options: String,

        /// Engine binary
        #[arg(long, default_value = DEFAULT_ENGINE)]
        nmap: String,

        /// CSV of `label,host` lines used to label report rows
        #[arg(short, long)]
        classification: Option<PathBuf>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let defaults = Config::default();

        match &self.command {
            Commands::Plan {
                unit,
                options,
                nmap,
            } => Config {
                engine_path: nmap.clone(),
                base_options: options.clone(),
                org: unit.org.clone(),
                ..defaults
            },
            Commands::Scan {
                unit,
                workers,
                timeout,
                options,
                nmap,
                ..
            } => Config {
                workers: *workers,
                timeout: timeout.map(Duration::from_secs),
                engine_path: nmap.clone(),
                base_options: options.clone(),
                org: unit.org.clone(),
                ..defaults
            },
        }
    }
}
