//! Read-only views handed to presentation surfaces.

use serde::Serialize;
use wordtrail_core::phase::SessionPhase;
use wordtrail_quiz::{CountdownEvent, QuestionOutcome, QuizScore, Verdict};

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    /// Context sentence.
    pub prompt: String,
    /// The word with `_` for each blank.
    pub scrambled_presentation: String,
    /// Number of blanks to fill.
    pub blank_count: usize,
    /// Letter tiles to choose from, in display order.
    pub tiles: Vec<String>,
    /// Seconds allowed.
    pub time_limit_seconds: f64,
    /// Seconds left on the countdown.
    pub remaining_seconds: f64,
}

/// Everything the quiz surface needs to render an attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSession {
    /// Schema whose challenge set is being played.
    pub schema: String,
    /// 1-based challenge index.
    pub challenge_index: u32,
    /// Difficulty level of the challenge.
    pub level: u32,
    /// Background asset, if any.
    pub background: Option<String>,
    /// 0-based index of the current question.
    pub question_index: usize,
    /// Number of questions in the challenge.
    pub question_count: usize,
    /// Remaining hearts.
    pub health: u8,
    /// Hearts at the start of an attempt.
    pub max_health: u8,
    /// Unpaused seconds spent so far.
    pub elapsed_seconds: f64,
    /// The question on screen.
    pub question: QuestionView,
}

/// Effect of an answer, timeout or bonus heart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    /// Verdict on submitted glyphs; `None` for timeouts, bare correct or
    /// incorrect reports and bonus hearts.
    pub verdict: Option<Verdict>,
    /// Change in health.
    pub health_delta: i8,
    /// Change in question index.
    pub question_delta: u8,
    /// Resulting question outcome; `None` for a bonus heart.
    pub outcome: Option<QuestionOutcome>,
    /// Health afterwards.
    pub health: u8,
    /// Question index afterwards.
    pub question_index: usize,
    /// Phase afterwards.
    pub phase: SessionPhase,
    /// The question now on screen, while the attempt continues.
    pub next_question: Option<QuestionView>,
}

/// Score screen for a passed quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSummary {
    /// Schema of the passed quiz.
    pub schema: String,
    /// 1-based challenge index.
    pub challenge_index: u32,
    /// Hearts left at the end.
    pub health: u8,
    /// Unpaused seconds spent.
    pub elapsed_seconds: f64,
    /// Points and stars.
    pub score: QuizScore,
}

/// Result of advancing the session timers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Unpaused seconds spent in the current attempt.
    pub elapsed_seconds: f64,
    /// Seconds left on the question countdown, while a quiz is active.
    pub remaining_seconds: Option<f64>,
    /// Countdown signal raised by this tick. On `Expired` the host calls
    /// `on_timeout`.
    pub countdown: Option<CountdownEvent>,
    /// Whether the session is paused.
    pub paused: bool,
}
