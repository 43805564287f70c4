//! Session configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a play session. Every field has a default, so partial
/// configuration files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Schema a new game starts in.
    pub initial_schema: String,
    /// Hearts at the start of every quiz attempt.
    pub max_health: u8,
    /// Number of answer tiles presented per question.
    pub tile_count: usize,
    /// Schema to continue with when a script runs out of lines without a
    /// transition event. `None` leaves the player on the last line.
    pub fallback_schema: Option<String>,
    /// Award a bonus heart (up to `max_health`) on every correct answer.
    pub bonus_heart_on_correct: bool,
    /// Remaining seconds at which a question countdown reports "almost out".
    pub time_almost_out_seconds: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_schema: "schema_1".to_owned(),
            max_health: 5,
            tile_count: 8,
            fallback_schema: None,
            bonus_heart_on_correct: false,
            time_almost_out_seconds: 5.0,
        }
    }
}
