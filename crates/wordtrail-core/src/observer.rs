//! Observer seam for presentation surfaces.

use serde::Serialize;

use crate::phase::SessionPhase;
use crate::progression::ProgressionState;
use crate::save::SaveRecord;

/// Transition point that produced a durable checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointReason {
    /// A fresh game was started.
    NewGame,
    /// A dialog line was consumed.
    LineAdvanced,
    /// A dialog line sent the player to a quiz.
    QuizTriggered,
    /// A quiz attempt started.
    QuizEntered,
    /// A question was answered or timed out.
    QuestionResolved,
    /// A bonus heart was awarded mid-quiz.
    HeartAwarded,
    /// Every question of the quiz was answered.
    QuizCompleted,
    /// Health ran out.
    QuizFailed,
    /// The player left a passed quiz for the dialog.
    QuizContinued,
    /// A quiz could not be entered and the player was returned to dialog.
    QuizAbandoned,
    /// The narrative moved to another schema.
    SchemaTransition,
    /// The story reached its end.
    GameComplete,
    /// Progress was restored from a manual slot.
    SlotLoaded,
    /// A resumed record referenced missing content and was corrected.
    ResumeCorrected,
    /// A failed write was retried.
    Flush,
}

/// Receives notifications from a session. Surfaces attach one while they are
/// visible and detach it when they go away.
pub trait SessionObserver: Send {
    /// Called after every transition with the new state and phase.
    fn on_state_changed(&mut self, state: &ProgressionState, phase: SessionPhase);

    /// Called after every successful durable write.
    fn on_checkpoint(&mut self, _reason: CheckpointReason, _record: &SaveRecord) {}
}
