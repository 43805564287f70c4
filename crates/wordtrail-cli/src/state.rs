//! Shared harness state.

use std::sync::Arc;

use wordtrail_content::FsContentRepository;
use wordtrail_core::clock::SystemClock;
use wordtrail_core::rng::{DeterministicRng, SeededRng};
use wordtrail_session::{SessionController, SessionDeps};
use wordtrail_store::FileSaveStore;

use crate::config::CliConfig;

/// State the command runner works on.
#[derive(Debug)]
pub struct AppState {
    /// The one session for this process.
    pub controller: SessionController,
}

impl AppState {
    /// Wraps an existing controller.
    #[must_use]
    pub fn new(controller: SessionController) -> Self {
        Self { controller }
    }

    /// Builds a session over the file store and content directory named in
    /// `config`.
    #[must_use]
    pub fn from_config(config: &CliConfig) -> Self {
        let rng: Box<dyn DeterministicRng> = match config.seed {
            Some(seed) => Box::new(SeededRng::from_seed(seed)),
            None => Box::new(SeededRng::from_entropy()),
        };
        let deps = SessionDeps {
            content: Arc::new(FsContentRepository::new(&config.content_dir)),
            store: Arc::new(FileSaveStore::new(&config.save_dir)),
            clock: Arc::new(SystemClock),
            rng,
        };
        Self::new(SessionController::new(config.session.clone(), deps))
    }
}
