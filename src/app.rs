//! Composition root for the `train` command.
//!
//! Validates the input, gathers training text from a text file or a corpus
//! directory and hands it to a [`TrainingRun`].

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::corpus::Corpus;
use crate::error::{LmError, Result};
use crate::extract::TextExtractor;
use crate::stage::{CommandExecutor, StageRunner, Toolchain};
use crate::text::load_text;
use crate::trainer::{TrainingReport, TrainingRun};
use std::path::{Path, PathBuf};

/// Fully resolved settings for one training invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub input_path: PathBuf,
    pub output_model_path: PathBuf,
    pub temp_root: PathBuf,
    pub ngram_order: u8,
    pub toolchain: Toolchain,
}

impl TrainOptions {
    /// Resolve options from config; explicit arguments win over config values.
    pub fn from_config(
        config: &Config,
        input_path: PathBuf,
        output_model_path: PathBuf,
        temp_directory: Option<PathBuf>,
        ngram_order: Option<u8>,
        bin_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = config.clone();
        if let Some(dir) = temp_directory {
            config.training.temp_directory = Some(dir);
        }
        if let Some(order) = ngram_order {
            config.training.ngram_order = order;
        }
        if let Some(dir) = bin_dir {
            config.toolchain.bin_dir = Some(dir);
        }
        config.validate()?;

        Ok(Self {
            input_path,
            output_model_path,
            temp_root: config.temp_root(),
            ngram_order: config.training.ngram_order,
            toolchain: Toolchain::new(config.toolchain.bin_dir.clone()),
        })
    }
}

/// Fail before any work if the input path does not exist.
pub fn validate_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LmError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Training sentences from a text file (one per line) or a corpus directory.
pub fn load_training_text(input: &Path) -> Result<Vec<String>> {
    if input.is_file() {
        let text = load_text(input)?;
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        log::info!(
            "Generating language model based on {} lines from {}...",
            lines.len(),
            input.display()
        );
        return Ok(lines);
    }

    let corpus = Corpus::load(input)?;
    let aggregation = aggregate(&corpus, &TextExtractor::default());
    aggregation.report();
    Ok(aggregation.into_text())
}

/// Train with the given runner.
pub fn run_train_lm_with<E: CommandExecutor>(
    options: &TrainOptions,
    runner: &StageRunner<E>,
) -> Result<TrainingReport> {
    validate_input(&options.input_path)?;
    let text = load_training_text(&options.input_path)?;

    let mut run = TrainingRun::new(
        text,
        &options.output_model_path,
        options.ngram_order,
        &options.temp_root,
    )?;
    run.train(runner)
}

/// Train with the real OpenGrm tools.
pub fn run_train_lm(options: &TrainOptions) -> Result<TrainingReport> {
    run_train_lm_with(options, &StageRunner::system(options.toolchain.clone()))
}
