//! Corpus text aggregation.
//!
//! Folds the known transcriptions of a corpus and the extracted lines of its
//! remaining transcription files into one list of training sentences. A bad
//! file is recorded in the [`FailureLedger`] and skipped; aggregation itself
//! never fails.

use crate::corpus::Corpus;
use crate::extract::{TextExtractor, TokenLine, UnitOutcome};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Files skipped during one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureLedger {
    /// Files that are not valid UTF-8.
    pub decode_errors: BTreeSet<PathBuf>,
    /// Files that could not be read or parsed, with their diagnostics.
    pub parse_errors: BTreeMap<PathBuf, String>,
}

impl FailureLedger {
    pub fn is_empty(&self) -> bool {
        self.decode_errors.is_empty() && self.parse_errors.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: UnitOutcome) -> Option<Vec<TokenLine>> {
        match outcome {
            UnitOutcome::Extracted(lines) => Some(lines),
            UnitOutcome::SkippedDecode => {
                self.decode_errors.insert(path);
                None
            }
            UnitOutcome::SkippedParse(diagnostic) => {
                self.parse_errors.insert(path, diagnostic);
                None
            }
        }
    }

    /// Warning block for undecodable files, if any.
    pub fn decode_warning(&self) -> Option<String> {
        if self.decode_errors.is_empty() {
            return None;
        }
        let paths: Vec<String> = self
            .decode_errors
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        Some(format!(
            "The following files were not able to be decoded using utf8:\n\n{}",
            paths.join("\n")
        ))
    }

    /// Warning block for unreadable transcription files, with full diagnostics.
    pub fn parse_warning(&self) -> Option<String> {
        if self.parse_errors.is_empty() {
            return None;
        }
        let entries: Vec<String> = self
            .parse_errors
            .iter()
            .map(|(path, diagnostic)| format!("{}:\n{}", path.display(), diagnostic))
            .collect();
        Some(format!(
            "The following transcription files were not able to be read:\n\n{}",
            entries.join("\n\n")
        ))
    }
}

/// Training sentences plus the ledger of skipped files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub text: Vec<String>,
    pub failures: FailureLedger,
}

impl Aggregation {
    /// Log one warning per non-empty failure set, then the sentence count.
    pub fn report(&self) {
        if let Some(warning) = self.failures.decode_warning() {
            log::warn!("{}", warning);
        }
        if let Some(warning) = self.failures.parse_warning() {
            log::warn!("{}", warning);
        }
        log::info!(
            "Generating language model based on {} transcriptions found in the corpus...",
            self.text.len()
        );
    }

    pub fn into_text(self) -> Vec<String> {
        self.text
    }
}

/// Collect every transcription of `corpus` into one sentence list.
///
/// Known transcriptions come first in mapping order, followed by extracted
/// lines in file order.
pub fn aggregate(corpus: &Corpus, extractor: &TextExtractor) -> Aggregation {
    let mut aggregation = Aggregation {
        text: corpus
            .text_mapping
            .iter()
            .map(|(_, text)| text.clone())
            .collect(),
        failures: FailureLedger::default(),
    };

    for path in &corpus.transcriptions_without_wavs {
        let outcome = extractor.extract(path);
        if let Some(lines) = aggregation.failures.record(path.clone(), outcome) {
            aggregation
                .text
                .extend(lines.iter().map(TokenLine::joined));
        }
    }

    aggregation
}
