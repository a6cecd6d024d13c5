use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::extract::{self, ExtractOptions, ExtractionReport};

#[derive(Parser)]
#[command(name = "unreal-utils")]
#[command(about = "Utilities for shipping standalone Unreal applications")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a standalone application out of an engine tree with minimal dependencies
    Extract {
        /// The path to the .target file of the standalone application you wish to extract
        #[arg(short = 't', long)]
        target_file: PathBuf,

        /// The destination where the Unreal files should be copied to
        #[arg(short, long)]
        destination: PathBuf,

        /// The base path where your engine is located, the parent of your Engine directory
        #[arg(short, long)]
        engine_path: PathBuf,

        /// Where to create a symlink to the executable of the standalone app
        #[arg(short, long)]
        symlink: Option<PathBuf>,
    },
}

pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract {
            target_file,
            destination,
            engine_path,
            symlink,
        } => extract_command(ExtractOptions {
            target_file,
            destination,
            engine_path,
            symlink,
        }),
    }
}

fn extract_command(options: ExtractOptions) -> Result<()> {
    let report = extract::run(&options)
        .with_context(|| format!("Failed to extract {}", options.target_file.display()))?;

    print_summary(&report);

    Ok(())
}

fn print_summary(report: &ExtractionReport) {
    println!("Successfully copied files");
    println!("  Destination: {}", report.extraction_dir.display());
    println!("  Directories: {}", report.directories.len());
    println!("  Files: {}", report.files_copied);
    println!("  Localization files: {}", report.localization_files);
    if let Some(ref link) = report.symlink {
        println!("  Symlink: {}", link.display());
    }
}
