//! Command-line arguments for the `hans` binary.

use clap::Parser;
use std::path::PathBuf;

/// HANS, a German tutor for the terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "hans", version, about)]
pub struct Cli {
    /// JSON curriculum file to use instead of the built-in lessons
    #[arg(short, long, value_name = "PATH")]
    pub curriculum: Option<PathBuf>,

    /// Answer free-form input with a canned reply instead of calling an LLM
    #[arg(long)]
    pub offline: bool,

    /// Seed for word and phrase selection, for reproducible sessions
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}
