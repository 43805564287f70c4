//! Wordtrail — progression and session state machine.
//!
//! Tracks where the player is (dialog line, or quiz challenge, question and
//! health), writes a durable checkpoint at every transition point, and
//! reconciles that position across the dialog, quiz and summary surfaces.

pub mod application;
pub mod domain;

pub use application::controller::{ObserverHandle, SessionController, SessionDeps};
pub use application::views::{AnswerFeedback, QuestionView, QuizSession, QuizSummary, TickReport};
pub use domain::pause_clock::PauseClock;
pub use domain::transitions::{Checkpointed, NextContent};
pub use wordtrail_core::phase::SessionPhase;
