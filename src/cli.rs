//! Command-line interface for corpus-lm
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Train n-gram language models from speech corpus transcriptions
#[derive(Parser, Debug)]
#[command(
    name = "corpus-lm",
    version,
    about = "Train a language model from a corpus directory or text file"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: stage commands, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a language model
    Train {
        /// Location of existing corpus directory or text file
        input_path: PathBuf,

        /// Desired location of generated model (.arpa for ARPA text)
        output_model_path: PathBuf,

        /// Temporary directory root to use for LM training (default: ~/Documents/MFA)
        #[arg(short, long, value_name = "DIR")]
        temp_directory: Option<PathBuf>,

        /// Maximum n-gram order (default: 3)
        #[arg(long, short = 'n', value_name = "N", value_parser = clap::value_parser!(u8).range(1..))]
        ngram_order: Option<u8>,

        /// Directory holding the OpenGrm binaries (default: search PATH)
        #[arg(long, value_name = "DIR")]
        bin_dir: Option<PathBuf>,
    },

    /// Check that the OpenGrm toolchain is installed
    Check {
        /// Directory holding the OpenGrm binaries (default: search PATH)
        #[arg(long, value_name = "DIR")]
        bin_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
