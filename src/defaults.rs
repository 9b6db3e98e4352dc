//! Default configuration constants for corpus-lm.
//!
//! Shared by the config layer, the corpus walker and the training pipeline so
//! that artifact names and tool names are spelled in exactly one place.

/// Default n-gram order.
///
/// Trigrams are the usual choice for alignment-oriented language models.
pub const NGRAM_ORDER: u8 = 3;

/// Directory under the user's home used as temp root when none is configured.
pub const TEMP_ROOT_DIR: &[&str] = &["Documents", "MFA"];

/// Application directory name under the XDG config directory.
pub const APP_NAME: &str = "corpus-lm";

/// Environment variable overriding the temp root.
pub const ENV_TEMP_DIR: &str = "CORPUS_LM_TEMP_DIR";

/// Environment variable overriding the n-gram order.
pub const ENV_NGRAM_ORDER: &str = "CORPUS_LM_NGRAM_ORDER";

/// Environment variable overriding the toolchain binary directory.
pub const ENV_BIN_DIR: &str = "CORPUS_LM_BIN_DIR";

/// Tier name whose contents never enter the training text (compared case-insensitively).
pub const NOTES_TIER: &str = "notes";

/// Plain label file extensions (compared case-insensitively).
pub const LABEL_EXTENSIONS: &[&str] = &["lab", "txt"];

/// Structured annotation file extensions (compared case-insensitively).
pub const ANNOTATION_EXTENSIONS: &[&str] = &["textgrid"];

/// Audio extensions that pair a transcription with a recording.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac"];

// Artifact file names inside a run's working directory.
pub const INPUT_FILE: &str = "input.txt";
pub const SYMBOLS_FILE: &str = "full.syms";
pub const ARCHIVE_FILE: &str = "full.far";
pub const COUNTS_FILE: &str = "full.cnts";
pub const ESTIMATED_MODEL_FILE: &str = "full.mod";
pub const ARPA_FILE: &str = "full.arpa";
pub const FINAL_MODEL_FILE: &str = "model.fst";

// OpenGrm NGram / FST archive tools, in pipeline order.
pub const TOOL_SYMBOLS: &str = "ngramsymbols";
pub const TOOL_COMPILE: &str = "farcompilestrings";
pub const TOOL_COUNT: &str = "ngramcount";
pub const TOOL_ESTIMATE: &str = "ngrammake";
pub const TOOL_EXPORT: &str = "ngramprint";

/// Every external tool the training pipeline invokes.
pub const TOOLCHAIN: &[&str] = &[
    TOOL_SYMBOLS,
    TOOL_COMPILE,
    TOOL_COUNT,
    TOOL_ESTIMATE,
    TOOL_EXPORT,
];
