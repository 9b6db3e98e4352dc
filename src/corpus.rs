//! Corpus directory discovery.
//!
//! Splits a corpus into transcriptions already known verbatim (label files
//! paired with a recording) and transcription files that still need
//! extraction (unpaired label files and every annotation file).

use crate::defaults;
use crate::error::{LmError, Result};
use crate::extract::SourceKind;
use crate::text::{load_text, parse_transcription};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Transcription sources of one corpus directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    /// Utterance id → known transcription, in discovery order.
    pub text_mapping: Vec<(String, String)>,
    /// Transcription files the aggregator must extract itself.
    pub transcriptions_without_wavs: Vec<PathBuf>,
}

/// Files sharing a directory and stem.
#[derive(Debug, Default)]
struct FileGroup {
    has_audio: bool,
    labels: Vec<PathBuf>,
    annotations: Vec<PathBuf>,
}

impl Corpus {
    pub fn from_parts(
        text_mapping: Vec<(String, String)>,
        transcriptions_without_wavs: Vec<PathBuf>,
    ) -> Self {
        Self {
            text_mapping,
            transcriptions_without_wavs,
        }
    }

    /// Walk `root` recursively and classify its transcription files.
    ///
    /// Traversal order is sorted so repeated loads of the same tree give the
    /// same corpus.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(LmError::InputNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        collect_files(root, &mut files)?;

        let mut groups: BTreeMap<PathBuf, FileGroup> = BTreeMap::new();
        for path in files {
            let key = path.with_extension("");
            if is_audio(&path) {
                groups.entry(key).or_default().has_audio = true;
                continue;
            }
            match SourceKind::from_path(&path) {
                Some(SourceKind::Label) => groups.entry(key).or_default().labels.push(path),
                Some(SourceKind::Annotation) => {
                    groups.entry(key).or_default().annotations.push(path)
                }
                None => {}
            }
        }

        let mut corpus = Corpus::default();
        for (key, group) in groups {
            for label in group.labels {
                if !group.has_audio {
                    corpus.transcriptions_without_wavs.push(label);
                    continue;
                }
                match load_text(&label) {
                    Ok(text) => {
                        let words = parse_transcription(&text);
                        if !words.is_empty() {
                            corpus
                                .text_mapping
                                .push((utterance_id(root, &key), words.join(" ")));
                        }
                    }
                    // Leave it for the aggregator so the failure is reported with the rest.
                    Err(e) => {
                        log::debug!("Deferring {}: {}", label.display(), e);
                        corpus.transcriptions_without_wavs.push(label);
                    }
                }
            }
            corpus.transcriptions_without_wavs.extend(group.annotations);
        }

        log::debug!(
            "Corpus {}: {} paired transcriptions, {} files to extract",
            root.display(),
            corpus.text_mapping.len(),
            corpus.transcriptions_without_wavs.len()
        );
        Ok(corpus)
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| defaults::AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Path of the file group relative to the corpus root, `/`-separated.
fn utterance_id(root: &Path, key: &Path) -> String {
    key.strip_prefix(root)
        .unwrap_or(key)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
