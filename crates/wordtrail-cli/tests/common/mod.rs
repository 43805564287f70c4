//! Shared helpers for harness integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use wordtrail_cli::runner;
use wordtrail_cli::state::AppState;
use wordtrail_core::config::SessionConfig;
use wordtrail_core::store::SaveStore;
use wordtrail_session::{SessionController, SessionDeps};
use wordtrail_test_support::fixtures;
use wordtrail_test_support::{MockRng, RecordingSaveStore, fixed_clock};

/// Harness state over the fixture story, plus the store it writes to.
pub struct TestApp {
    pub app: AppState,
    pub store: Arc<RecordingSaveStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(RecordingSaveStore::new());
    let controller = SessionController::new(
        SessionConfig::default(),
        SessionDeps {
            content: Arc::new(fixtures::story_repository()),
            store: Arc::clone(&store) as Arc<dyn SaveStore>,
            clock: Arc::new(fixed_clock()),
            rng: Box::new(MockRng),
        },
    );
    TestApp {
        app: AppState::new(controller),
        store,
    }
}

/// Feeds `script` to the runner and parses every response line.
pub fn run_script(app: &mut AppState, script: &str) -> Vec<Value> {
    let mut output = Vec::new();
    runner::run(app, script.as_bytes(), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Asserts a response failed with `code`.
pub fn assert_error(response: &Value, code: &str) {
    assert_eq!(response["ok"], false, "expected failure, got {response}");
    assert_eq!(response["error"], code, "unexpected error in {response}");
    assert!(response["message"].is_string());
}
