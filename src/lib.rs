//! corpus-lm - n-gram language models from speech corpora
//!
//! Aggregates transcriptions from text files or corpus directories and drives
//! the OpenGrm NGram toolchain to train a language model.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod aggregate;
pub mod annotation;
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod corpus;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod stage;
pub mod text;
pub mod trainer;

// Core pipeline
pub use aggregate::{Aggregation, FailureLedger, aggregate};
pub use corpus::Corpus;
pub use extract::{SourceKind, TextExtractor, TokenLine, UnitOutcome};
pub use stage::{
    CommandExecutor, PipelineStage, StageKind, StageRunner, SystemCommandExecutor, Toolchain,
};
pub use trainer::{ArtifactPaths, TrainingReport, TrainingRun, TrainingState};

// Error handling
pub use error::{LmError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
