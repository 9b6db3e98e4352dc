//! Structured annotation (Praat TextGrid) reading.
//!
//! The TextGrid grammar itself belongs to the `textgrid` crate. This module
//! only flattens a parsed grid into the tier/interval view the extractor needs.

use crate::error::{LmError, Result};
use std::path::Path;

/// Kind of an annotation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    Interval,
    Point,
}

/// One tier of a parsed annotation file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTier {
    pub name: String,
    pub kind: TierKind,
    /// Interval labels in file order. Empty for point tiers.
    pub intervals: Vec<String>,
}

impl AnnotationTier {
    pub fn interval(name: &str, intervals: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: TierKind::Interval,
            intervals: intervals.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn point(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: TierKind::Point,
            intervals: Vec::new(),
        }
    }
}

/// Parser seam for structured annotation sources.
///
/// Failures are [`LmError::StructuredParse`] carrying the full diagnostic text
/// to be shown to the operator.
pub trait AnnotationReader: Send + Sync {
    fn read_tiers(&self, path: &Path) -> Result<Vec<AnnotationTier>>;
}

/// Reads Praat TextGrid files (long and short text formats).
#[derive(Debug, Clone, Copy, Default)]
pub struct TextGridReader;

impl AnnotationReader for TextGridReader {
    fn read_tiers(&self, path: &Path) -> Result<Vec<AnnotationTier>> {
        let parse_error = |detail: String| LmError::StructuredParse {
            path: path.to_path_buf(),
            diagnostic: format!("Failed to parse TextGrid '{}': {detail}", path.display()),
        };
        // The parser panics on some malformed input (long-format point tiers
        // among them); one such file must not take down the whole corpus.
        let grid = std::panic::catch_unwind(|| textgrid::TextGrid::from_file(path))
            .map_err(|_| parse_error("parser panicked".to_string()))?
            .map_err(|err| parse_error(err.to_string()))?;

        Ok(grid
            .tiers
            .iter()
            .map(|tier| {
                if tier.tier_type == textgrid::TierType::IntervalTier {
                    AnnotationTier {
                        name: tier.name.clone(),
                        kind: TierKind::Interval,
                        intervals: tier.intervals.iter().map(|i| i.text.clone()).collect(),
                    }
                } else {
                    AnnotationTier {
                        name: tier.name.clone(),
                        kind: TierKind::Point,
                        intervals: Vec::new(),
                    }
                }
            })
            .collect())
    }
}
