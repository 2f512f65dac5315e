// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base reference every branch is compared against
    pub base: String,

    /// Branch names to attribute, in reporting order
    #[arg(required = true)]
    pub branches: Vec<String>,

    /// Path to the git repository to analyze
    #[arg(short = 'C', long, default_value = ".")]
    pub repo: PathBuf,

    /// Reprint the full per-branch detail after the summary
    #[arg(short, long)]
    pub verbose: bool,
}
