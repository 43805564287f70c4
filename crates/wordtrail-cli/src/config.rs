//! Harness configuration read from the environment.

use std::path::{Path, PathBuf};

use wordtrail_core::config::SessionConfig;

use crate::error::AppError;

/// Where the harness keeps its data, and how the session is tuned.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Directory holding `autosave.json` and `saves.json`.
    pub save_dir: PathBuf,
    /// Directory holding `dialog/` and `quiz/`.
    pub content_dir: PathBuf,
    /// Seed for tile layout; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Session tuning.
    pub session: SessionConfig,
}

impl CliConfig {
    /// Reads `WORDTRAIL_SAVE_DIR` (default `saves`), `WORDTRAIL_CONTENT_DIR`
    /// (default `content`), `WORDTRAIL_SEED` and `WORDTRAIL_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the seed is not a number or the config
    /// file cannot be read or parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, with variables supplied by `lookup`.
    ///
    /// # Errors
    ///
    /// See `from_env`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let save_dir = lookup("WORDTRAIL_SAVE_DIR").unwrap_or_else(|| "saves".to_owned());
        let content_dir = lookup("WORDTRAIL_CONTENT_DIR").unwrap_or_else(|| "content".to_owned());
        let seed = lookup("WORDTRAIL_SEED")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| AppError::Config(format!("WORDTRAIL_SEED must be a u64: {e}")))
            })
            .transpose()?;
        let session = match lookup("WORDTRAIL_CONFIG") {
            Some(path) => load_session_config(Path::new(&path))?,
            None => SessionConfig::default(),
        };
        Ok(Self {
            save_dir: PathBuf::from(save_dir),
            content_dir: PathBuf::from(content_dir),
            seed,
            session,
        })
    }
}

/// Loads a `SessionConfig` from a JSON or YAML file. Missing keys take their
/// defaults.
///
/// # Errors
///
/// Returns `AppError::Config` if the file cannot be read or parsed.
pub fn load_session_config(path: &Path) -> Result<SessionConfig, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("invalid config {}: {e}", path.display())))
    } else {
        serde_yaml::from_str(&text)
            .map_err(|e| AppError::Config(format!("invalid config {}: {e}", path.display())))
    }
}
