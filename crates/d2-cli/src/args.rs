//! Command-line argument definitions for the D2 parse tool.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input files, the configuration file,
//! parser options that override the configuration, output format and
//! logging verbosity.

use clap::Parser;

/// Command-line arguments for the D2 parse tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Paths to the D2 files to parse
    #[arg(required = true, help = "Paths to the input files")]
    pub inputs: Vec<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Report columns and byte offsets in UTF-16 code units
    #[arg(long)]
    pub utf16: bool,

    /// Maximum nesting of maps and arrays
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Print each parsed tree to stdout as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
