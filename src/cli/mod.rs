//! CLI module for repurpose
//!
//! Provides command-line interface parsing for the repurpose binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// repurpose - drug repurposing analysis pipeline
///
/// Plans an investigation, gathers clinical and patent findings concurrently
/// and synthesizes a scored assessment.
#[derive(Parser, Debug)]
#[command(
    name = "repurpose",
    version,
    about = "Drug repurposing analysis pipeline",
    long_about = "Runs a plan → clinical ∥ patent → synthesis analysis against the Gemini API\n\
                  and prints the four-section report as JSON.",
    after_help = "EXAMPLES:\n    \
                  repurpose analyze \"Can metformin be repurposed for ovarian cancer?\"\n    \
                  repurpose analyze \"...\" --output report.json\n    \
                  repurpose config --validate\n    \
                  repurpose --config my.toml analyze \"...\""
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "repurpose.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full analysis for a query
    Analyze {
        /// Free-text research question
        query: String,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print compact instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
