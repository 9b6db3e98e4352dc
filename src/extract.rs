//! Per-unit text extraction.
//!
//! A transcription unit is either a whole plain label file or one interval of
//! a structured annotation file. Failures are returned as tagged outcomes so
//! the aggregator can record them and move on.

use crate::annotation::{AnnotationReader, TextGridReader, TierKind};
use crate::defaults;
use crate::error::LmError;
use crate::text::{load_text, parse_transcription};
use std::path::Path;

/// Format of a transcription source, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Whole file is one transcription (`.lab`, `.txt`).
    Label,
    /// Time-aligned tiers of intervals (`.TextGrid`).
    Annotation,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if defaults::LABEL_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Label)
        } else if defaults::ANNOTATION_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Annotation)
        } else {
            None
        }
    }
}

/// Normalized word tokens from one transcription unit. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLine(Vec<String>);

impl TokenLine {
    /// Wrap tokens, returning `None` when there are none.
    pub fn new(tokens: Vec<String>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self(tokens))
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Single space-separated line.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// Result of extracting one source file.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// Lines produced by the file's units; empty when nothing survived normalization.
    Extracted(Vec<TokenLine>),
    /// File is not valid UTF-8.
    SkippedDecode,
    /// Structured source failed to parse; carries the full diagnostic.
    SkippedParse(String),
}

/// Turns transcription sources into token lines.
pub struct TextExtractor {
    reader: Box<dyn AnnotationReader>,
}

impl TextExtractor {
    pub fn new(reader: Box<dyn AnnotationReader>) -> Self {
        Self { reader }
    }

    /// Extract every unit of the file at `path`.
    pub fn extract(&self, path: &Path) -> UnitOutcome {
        match SourceKind::from_path(path) {
            Some(SourceKind::Label) => self.extract_label(path),
            Some(SourceKind::Annotation) => self.extract_annotation(path),
            None => UnitOutcome::SkippedParse(format!(
                "Unsupported transcription format: {}",
                path.display()
            )),
        }
    }

    fn extract_label(&self, path: &Path) -> UnitOutcome {
        match load_text(path) {
            Ok(text) => UnitOutcome::Extracted(
                TokenLine::new(parse_transcription(&text))
                    .into_iter()
                    .collect(),
            ),
            Err(LmError::Decode { .. }) => UnitOutcome::SkippedDecode,
            Err(e) => UnitOutcome::SkippedParse(e.to_string()),
        }
    }

    fn extract_annotation(&self, path: &Path) -> UnitOutcome {
        let tiers = match self.reader.read_tiers(path) {
            Ok(tiers) => tiers,
            Err(LmError::StructuredParse { diagnostic, .. }) => {
                return UnitOutcome::SkippedParse(diagnostic);
            }
            Err(LmError::Decode { .. }) => return UnitOutcome::SkippedDecode,
            Err(e) => return UnitOutcome::SkippedParse(e.to_string()),
        };

        let lines = tiers
            .iter()
            .filter(|tier| tier.kind == TierKind::Interval)
            .filter(|tier| tier.name.to_lowercase() != defaults::NOTES_TIER)
            .flat_map(|tier| tier.intervals.iter())
            .filter_map(|label| {
                let text = label.to_lowercase();
                TokenLine::new(parse_transcription(text.trim()))
            })
            .collect();
        UnitOutcome::Extracted(lines)
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Box::new(TextGridReader))
    }
}
