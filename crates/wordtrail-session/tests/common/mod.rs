//! Shared helpers for session integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use wordtrail_core::config::SessionConfig;
use wordtrail_core::observer::{CheckpointReason, SessionObserver};
use wordtrail_core::phase::SessionPhase;
use wordtrail_core::progression::ProgressionState;
use wordtrail_core::save::SaveRecord;
use wordtrail_session::{QuizSession, SessionController, SessionDeps};
use wordtrail_test_support::fixtures::{self, SCHEMA_1_QUIZ_LINE};
use wordtrail_test_support::{InMemoryContentRepository, MockRng, RecordingSaveStore, fixed_clock};

/// A controller plus handles on its collaborators.
pub struct Harness {
    pub controller: SessionController,
    pub store: Arc<RecordingSaveStore>,
    pub content: Arc<InMemoryContentRepository>,
}

impl Harness {
    /// A second controller on the same store and content, as after a restart.
    pub fn restart(&self) -> SessionController {
        build_controller(
            self.controller.config().clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.content),
        )
    }
}

/// Default config, the fixture story and an empty recording store.
pub fn harness() -> Harness {
    harness_with_config(SessionConfig::default())
}

pub fn harness_with_config(config: SessionConfig) -> Harness {
    harness_with(
        config,
        Arc::new(RecordingSaveStore::new()),
        Arc::new(fixtures::story_repository()),
    )
}

pub fn harness_with(
    config: SessionConfig,
    store: Arc<RecordingSaveStore>,
    content: Arc<InMemoryContentRepository>,
) -> Harness {
    let controller = build_controller(config, Arc::clone(&store), Arc::clone(&content));
    Harness {
        controller,
        store,
        content,
    }
}

pub fn build_controller(
    config: SessionConfig,
    store: Arc<RecordingSaveStore>,
    content: Arc<InMemoryContentRepository>,
) -> SessionController {
    SessionController::new(
        config,
        SessionDeps {
            content,
            store,
            clock: Arc::new(fixed_clock()),
            rng: Box::new(MockRng),
        },
    )
}

/// Starts a new game and plays up to the quiz trigger in `schema_1`.
pub fn reach_quiz_trigger(controller: &mut SessionController) {
    controller.new_game();
    for _ in 0..=SCHEMA_1_QUIZ_LINE {
        controller.advance_dialog().unwrap();
    }
    assert_eq!(controller.phase(), SessionPhase::QuizEntering);
}

/// Starts a new game and enters the `schema_1` quiz (three questions).
pub fn enter_schema_1_quiz(controller: &mut SessionController) -> QuizSession {
    reach_quiz_trigger(controller);
    controller.enter_pending_quiz().unwrap().value
}

/// What an observer saw.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    StateChanged(SessionPhase, ProgressionState),
    Checkpoint(CheckpointReason, SaveRecord),
}

/// Observer that appends everything it sees to a shared log.
pub struct RecordingObserver {
    log: Arc<Mutex<Vec<Observation>>>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Arc<Mutex<Vec<Observation>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl SessionObserver for RecordingObserver {
    fn on_state_changed(&mut self, state: &ProgressionState, phase: SessionPhase) {
        self.log
            .lock()
            .unwrap()
            .push(Observation::StateChanged(phase, state.clone()));
    }

    fn on_checkpoint(&mut self, reason: CheckpointReason, record: &SaveRecord) {
        self.log
            .lock()
            .unwrap()
            .push(Observation::Checkpoint(reason, record.clone()));
    }
}
