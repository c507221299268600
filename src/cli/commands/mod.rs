//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod helpers;
mod init;
mod mapping;
mod render;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "truckdoc")]
#[command(about = "Inspection report generator for collection trucks")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directories and starter templates
    Init,

    /// OCR one or two photographs and show the extracted fields
    Scan {
        /// First photograph (takes priority when merging)
        image1: PathBuf,
        /// Second photograph
        image2: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate an inspection report from two photographs
    Render {
        /// First photograph
        #[arg(long)]
        image1: PathBuf,
        /// Second photograph
        #[arg(long)]
        image2: PathBuf,
        /// Plate, optionally with its code: KEL-0283(112)
        #[arg(long)]
        plate: Option<String>,
        /// Inspection location
        #[arg(long)]
        address: Option<String>,
        /// Inspection date as written, e.g. 113年5月2日
        #[arg(long)]
        date: Option<String>,
        /// Truck type: 壓縮式垃圾車 (compression) or 資源回收車 (recycling)
        #[arg(short, long, default_value = "壓縮式垃圾車")]
        truck_type: String,
        /// Skip OCR and use only the values given on the command line
        #[arg(long)]
        no_ocr: bool,
    },

    /// Inspect the plate code table
    Mapping {
        /// Plate to look up (prints table size when omitted)
        plate: Option<String>,
    },

    /// Check OCR backend, mapping and template availability
    Check,

    /// Show the effective configuration
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Scan {
            image1,
            image2,
            json,
        } => scan::cmd_scan(&settings, image1, image2, json).await,
        Commands::Render {
            image1,
            image2,
            plate,
            address,
            date,
            truck_type,
            no_ocr,
        } => {
            let args = render::RenderArgs {
                image1,
                image2,
                plate,
                address,
                date,
                truck_type,
                no_ocr,
            };
            render::cmd_render(&settings, args).await
        }
        Commands::Mapping { plate } => mapping::cmd_mapping(&settings, plate.as_deref()).await,
        Commands::Check => check::cmd_check(&settings).await,
        Commands::Config => config_cmd::cmd_config_show(&settings, &config).await,
    }
}
