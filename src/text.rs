//! Transcription normalization.
//!
//! Turns raw transcription text into the word tokens fed to the language model.

use crate::error::{LmError, Result};
use std::fs;
use std::path::Path;

/// Punctuation removed from either end of a token.
const BOUNDARY_PUNCTUATION: &[char] = &[
    '"', '“', '”', '„', '«', '»', ',', '.', '!', '?', '¡', '¿', ':', ';', '(', ')', '[', ']',
    '{', '}', '<', '>', '…',
];

/// Tokens that carry no word even after stripping.
const NON_WORDS: &[&str] = &["-", "'"];

/// Split a transcription into lower-cased word tokens.
///
/// Boundary punctuation is stripped from every token; tokens left empty, or
/// consisting only of a hyphen or apostrophe, are dropped.
pub fn parse_transcription(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(BOUNDARY_PUNCTUATION).to_lowercase())
        .filter(|word| !word.is_empty() && !NON_WORDS.contains(&word.as_str()))
        .collect()
}

/// Read a whole file as UTF-8, trimmed and lower-cased.
///
/// Invalid UTF-8 is reported as [`LmError::Decode`] tagged with `path`.
pub fn load_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| LmError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(text.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn lowercases_and_splits() {
        assert_eq!(parse_transcription("CAT SAT"), vec!["cat", "sat"]);
    }

    #[test]
    fn strips_boundary_punctuation() {
        assert_eq!(
            parse_transcription("\"Hello,\" she said. (quietly)"),
            vec!["hello", "she", "said", "quietly"]
        );
    }

    #[test]
    fn keeps_inner_apostrophes_and_hyphens() {
        assert_eq!(
            parse_transcription("don't well-known"),
            vec!["don't", "well-known"]
        );
    }

    #[test]
    fn drops_non_word_tokens() {
        assert!(parse_transcription(" - ' ... ,, ").is_empty());
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(parse_transcription("").is_empty());
        assert!(parse_transcription("   \n\t").is_empty());
    }

    #[test]
    fn load_text_trims_and_lowercases() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"  Hello World \n").unwrap();

        assert_eq!(load_text(file.path()).unwrap(), "hello world");
    }

    #[test]
    fn load_text_reports_decode_error_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();

        match load_text(file.path()) {
            Err(LmError::Decode { path }) => assert_eq!(path, file.path()),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }
}
