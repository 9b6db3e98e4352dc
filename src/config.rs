use crate::defaults;
use crate::error::{LmError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub training: TrainingConfig,
    pub toolchain: ToolchainConfig,
}

/// Language model training configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Root under which per-model working directories are created.
    pub temp_directory: Option<PathBuf>,
    pub ngram_order: u8,
}

/// External toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Directory searched for the OpenGrm binaries before `PATH`.
    pub bin_dir: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            temp_directory: None,
            ngram_order: defaults::NGRAM_ORDER,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(LmError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(LmError::ConfigParse {
                message: format!("{}: {}", path.display(), e),
            }),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CORPUS_LM_TEMP_DIR → training.temp_directory
    /// - CORPUS_LM_NGRAM_ORDER → training.ngram_order
    /// - CORPUS_LM_BIN_DIR → toolchain.bin_dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(defaults::ENV_TEMP_DIR)
            && !dir.is_empty()
        {
            self.training.temp_directory = Some(PathBuf::from(dir));
        }

        if let Ok(order) = std::env::var(defaults::ENV_NGRAM_ORDER)
            && !order.is_empty()
        {
            match order.parse::<u8>() {
                Ok(order) => self.training.ngram_order = order,
                Err(e) => log::warn!(
                    "Ignoring {}={:?}: {}",
                    defaults::ENV_NGRAM_ORDER,
                    order,
                    e
                ),
            }
        }

        if let Ok(dir) = std::env::var(defaults::ENV_BIN_DIR)
            && !dir.is_empty()
        {
            self.toolchain.bin_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Reject values the training pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.training.ngram_order == 0 {
            return Err(LmError::ConfigInvalidValue {
                key: "training.ngram_order".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the temp root: the configured directory (with `~` expanded) or
    /// `~/Documents/MFA`.
    pub fn temp_root(&self) -> PathBuf {
        match &self.training.temp_directory {
            Some(dir) => expand_tilde(dir),
            None => default_temp_root(),
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/corpus-lm/config.toml on Linux, or `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(defaults::APP_NAME).join("config.toml"))
    }
}

/// Temp root used when nothing is configured.
///
/// Falls back to the system temp directory when no home directory is known.
pub fn default_temp_root() -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    defaults::TEMP_ROOT_DIR
        .iter()
        .fold(base, |path, part| path.join(part))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
