//! Command-line interface definitions.
//!
//! pagemill has a single entry point: running it with no arguments builds the
//! project in the current directory. The flags below only override what
//! `pagemill.toml` (or the built-in defaults) would otherwise decide.

use clap::Parser;
use std::path::PathBuf;

/// pagemill static site build pipeline
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root; every configured path is resolved against it
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (relative to project root)
    #[arg(short = 'C', long, default_value = "pagemill.toml")]
    pub config: PathBuf,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,
}
