//! `ContentRepository` reading JSON or YAML files from a content directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use wordtrail_core::content::{Challenge, ContentRepository, DialogScript};
use wordtrail_core::error::ProgressError;

use crate::documents::{ChallengeSetDocument, DocumentError, SceneDocument};

/// Extensions tried, in order, for each schema.
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

const DIALOG_DIR: &str = "dialog";
const QUIZ_DIR: &str = "quiz";

/// Why a content file could not be used.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid content in {path}: {source}")]
    Document {
        path: String,
        source: DocumentError,
    },
}

/// Content repository over `<root>/dialog` and `<root>/quiz`.
///
/// Parsed documents are cached for the lifetime of the repository; call
/// `clear_cache` after editing files on disk.
#[derive(Debug)]
pub struct FsContentRepository {
    root: PathBuf,
    dialogs: Mutex<HashMap<String, DialogScript>>,
    challenges: Mutex<HashMap<String, Vec<Challenge>>>,
}

impl FsContentRepository {
    /// Creates a repository rooted at `root`. Nothing is read until content
    /// is requested.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dialogs: Mutex::new(HashMap::new()),
            challenges: Mutex::new(HashMap::new()),
        }
    }

    /// The content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Forgets every cached document.
    pub fn clear_cache(&self) {
        self.dialogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.challenges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Finds `<root>/<dir>/<schema>.<ext>` for the first extension present.
    /// Schemas that could escape the directory never match.
    fn locate(&self, dir: &str, schema: &str) -> Option<PathBuf> {
        if schema.is_empty()
            || schema.contains(['/', '\\'])
            || schema.starts_with('.')
        {
            return None;
        }
        EXTENSIONS
            .iter()
            .map(|ext| self.root.join(dir).join(format!("{schema}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl ContentRepository for FsContentRepository {
    fn resolve_dialog(&self, schema: &str) -> Result<DialogScript, ProgressError> {
        let mut cache = self.dialogs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(script) = cache.get(schema) {
            return Ok(script.clone());
        }
        let path = self
            .locate(DIALOG_DIR, schema)
            .ok_or_else(|| ProgressError::dialog_not_found(schema))?;
        let script = read_document::<SceneDocument>(&path)
            .and_then(|scene| {
                scene.into_script(schema).map_err(|source| LoadError::Document {
                    path: path.display().to_string(),
                    source,
                })
            })
            .map_err(|err| {
                warn!(error = %err, schema, "dialog script unusable");
                ProgressError::dialog_not_found(schema)
            })?;
        debug!(schema, lines = script.lines.len(), path = %path.display(), "dialog script loaded");
        cache.insert(schema.to_owned(), script.clone());
        Ok(script)
    }

    fn resolve_challenges(&self, schema: &str) -> Result<Vec<Challenge>, ProgressError> {
        let mut cache = self
            .challenges
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(challenges) = cache.get(schema) {
            return Ok(challenges.clone());
        }
        let not_found = || ProgressError::ContentNotFound {
            schema: schema.to_owned(),
            challenge_index: None,
        };
        let path = self.locate(QUIZ_DIR, schema).ok_or_else(not_found)?;
        let challenges = read_document::<ChallengeSetDocument>(&path)
            .map(ChallengeSetDocument::into_challenges)
            .map_err(|err| {
                warn!(error = %err, schema, "challenge set unusable");
                not_found()
            })?;
        debug!(
            schema,
            challenges = challenges.len(),
            path = %path.display(),
            "challenge set loaded"
        );
        cache.insert(schema.to_owned(), challenges.clone());
        Ok(challenges)
    }
}

/// Reads `path` as JSON or YAML depending on its extension.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let display = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        serde_json::from_str(&text).map_err(|source| LoadError::Json {
            path: display,
            source,
        })
    } else {
        serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
            path: display,
            source,
        })
    }
}
