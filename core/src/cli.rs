//! Command-line interface for iofix-rs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::permutation::Permutation;

/// Reorder the inputs and outputs of multi-input/multi-output models.
#[derive(Parser, Debug)]
#[command(name = "iofix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fix the input/output order of the configured model and print its signature.
    Fix {
        /// Path to the YAML config file. Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// External position of each native input, e.g. "1,3,2,0".
        ///
        /// Overrides the value from the config file.
        #[arg(long)]
        inputs_perm: Option<Permutation>,

        /// External position of each native output, e.g. "2,0,1".
        ///
        /// Overrides the value from the config file.
        #[arg(long)]
        outputs_perm: Option<Permutation>,

        /// Write the export manifest to this path (.json, .yaml or .yml).
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Run the fixed model on inputs given in external order.
    Infer {
        /// Path to the YAML config file. Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to input data file (JSON with one entry per input).
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (json, pretty).
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Print the signature stored in an export manifest.
    Inspect {
        /// Path to the manifest (.json, .yaml or .yml).
        #[arg(short, long)]
        manifest: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
