//! The session controller.
//!
//! One `SessionController` lives for the whole process. Presentation
//! surfaces hold a reference to it, ask it what to show, and report events
//! back. Every transition that moves the player writes the auto-save before
//! observers hear about it.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use wordtrail_core::clock::Clock;
use wordtrail_core::config::SessionConfig;
use wordtrail_core::content::{ContentRepository, DialogEvent, DialogLine};
use wordtrail_core::error::ProgressError;
use wordtrail_core::observer::{CheckpointReason, SessionObserver};
use wordtrail_core::phase::SessionPhase;
use wordtrail_core::progression::{
    PendingQuiz, ProgressionState, QuizAttempt, QuizOutcome, QuizResult,
};
use wordtrail_core::rng::DeterministicRng;
use wordtrail_core::save::{SaveRecord, SaveSlot};
use wordtrail_core::store::SaveStore;
use wordtrail_quiz::{
    AnswerReport, Health, QuestionCountdown, QuestionOutcome, QuizEngine, Verdict, build_tiles,
    score,
};

use crate::application::views::{AnswerFeedback, QuestionView, QuizSession, QuizSummary, TickReport};
use crate::domain::pause_clock::PauseClock;
use crate::domain::transitions::{Checkpointed, NextContent};

/// Collaborators injected into a session.
pub struct SessionDeps {
    /// Resolves dialog scripts and challenge sets.
    pub content: Arc<dyn ContentRepository>,
    /// Durable storage for the auto-save and slots.
    pub store: Arc<dyn SaveStore>,
    /// Timestamps checkpoints.
    pub clock: Arc<dyn Clock>,
    /// Drives tile layout.
    pub rng: Box<dyn DeterministicRng>,
}

/// Identifies an attached observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Runtime state of the attempt in progress.
#[derive(Debug)]
struct ActiveQuiz {
    schema: String,
    challenge_index: u32,
    engine: QuizEngine,
    tiles: Vec<String>,
    countdown: QuestionCountdown,
}

/// What to do when a quiz cannot be entered because its content is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingContent {
    /// Put everything back as it was.
    Restore,
    /// Leave the quiz behind and continue the dialog after its trigger.
    ReturnToDialog,
}

/// How a hydrated state was brought back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restored {
    AsSaved,
    /// The final answer was saved but the completion was not.
    FinishedPendingSuccess,
}

/// The progression state machine.
pub struct SessionController {
    id: Uuid,
    config: SessionConfig,
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn SaveStore>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
    state: ProgressionState,
    phase: SessionPhase,
    quiz: Option<ActiveQuiz>,
    pause_clock: PauseClock,
    last_quiz: Option<PendingQuiz>,
    last_good: Option<ProgressionState>,
    unsaved: bool,
    observers: Vec<(ObserverHandle, Box<dyn SessionObserver>)>,
    next_handle: u64,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("unsaved", &self.unsaved)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Creates a controller positioned at the start of a new game. Nothing is
    /// written until `new_game` or `resume_from_auto_save` is called.
    #[must_use]
    pub fn new(config: SessionConfig, deps: SessionDeps) -> Self {
        let state = ProgressionState::new_game(config.initial_schema.clone());
        Self {
            id: Uuid::new_v4(),
            config,
            content: deps.content,
            store: deps.store,
            clock: deps.clock,
            rng: deps.rng,
            state,
            phase: SessionPhase::Dialog,
            quiz: None,
            pause_clock: PauseClock::new(),
            last_quiz: None,
            last_good: None,
            unsaved: false,
            observers: Vec::new(),
            next_handle: 0,
        }
    }

    /// Identifier of this session, used in log spans.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// The configuration the session runs with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- lifecycle ---

    /// Starts over at line 0 of the initial schema and writes the auto-save.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn new_game(&mut self) -> Checkpointed<ProgressionState> {
        let state = ProgressionState::new_game(self.config.initial_schema.clone());
        self.install(state, SessionPhase::Dialog);
        self.last_quiz = None;
        info!(schema = %self.state.active_schema, "new game started");
        let write_error = self.checkpoint(CheckpointReason::NewGame);
        self.notify();
        Checkpointed::new(self.state.clone(), write_error)
    }

    /// Continues from the auto-save, or starts a new game when there is none.
    ///
    /// A saved quiz whose content can no longer be resolved degrades to the
    /// dialog at the stored cursor and the corrected state is written back.
    /// A quiz saved on its result screen resumes on that screen.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn resume_from_auto_save(&mut self) -> Checkpointed<ProgressionState> {
        let Some(record) = self.store.load_auto_save().filter(|r| !r.is_empty()) else {
            info!("no auto-save found, starting a new game");
            return self.new_game();
        };
        let write_error = self.hydrate(record.to_state());
        info!(
            phase = %self.phase,
            schema = %self.state.active_schema,
            dialog_cursor = self.state.dialog_cursor,
            "resumed from auto-save"
        );
        self.notify();
        Checkpointed::new(self.state.clone(), write_error)
    }

    // --- dialog ---

    /// Shows the line at the cursor and applies its event.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` outside the dialog phase,
    /// `ProgressError::ContentNotFound` if the active schema has no script,
    /// and `ProgressError::ScriptExhausted` if the script has run out and no
    /// fallback schema applies. None of these change the state.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn advance_dialog(&mut self) -> Result<Checkpointed<NextContent>, ProgressError> {
        if self.phase != SessionPhase::Dialog {
            return Err(self.reject("advance_dialog"));
        }
        let script = self.content.resolve_dialog(&self.state.active_schema)?;
        let cursor = self.state.dialog_cursor;
        let Some(line) = script.line(cursor).cloned() else {
            return self.exhausted(cursor);
        };

        let (next, reason) = match line.event.clone() {
            None => {
                self.state.dialog_cursor += 1;
                (NextContent::Line { line }, CheckpointReason::LineAdvanced)
            }
            Some(DialogEvent::Quiz {
                schema,
                challenge_index,
            }) => {
                let quiz = PendingQuiz::new(schema, challenge_index, cursor + 1)
                    .in_dialog(self.state.active_schema.clone());
                info!(
                    schema = %quiz.schema,
                    challenge_index,
                    resume_cursor = quiz.resume_cursor,
                    "dialog triggered a quiz"
                );
                self.state.pending_quiz = Some(quiz.clone());
                self.phase = SessionPhase::QuizEntering;
                (
                    NextContent::QuizRequested { line, quiz },
                    CheckpointReason::QuizTriggered,
                )
            }
            Some(DialogEvent::NextSchema { schema }) => {
                info!(from = %self.state.active_schema, to = %schema, "schema transition");
                self.state.enter_schema(schema.clone());
                (
                    NextContent::SchemaTransition {
                        line: Some(line),
                        schema,
                    },
                    CheckpointReason::SchemaTransition,
                )
            }
            Some(DialogEvent::GameComplete) => {
                info!("game complete");
                self.state.game_complete = true;
                self.phase = SessionPhase::Complete;
                (
                    NextContent::GameComplete { line },
                    CheckpointReason::GameComplete,
                )
            }
        };

        let write_error = self.commit(reason)?;
        Ok(Checkpointed::new(next, write_error))
    }

    fn exhausted(&mut self, cursor: usize) -> Result<Checkpointed<NextContent>, ProgressError> {
        let fallback = self
            .config
            .fallback_schema
            .clone()
            .filter(|schema| *schema != self.state.active_schema);
        let Some(schema) = fallback else {
            warn!(schema = %self.state.active_schema, cursor, "dialog script exhausted");
            return Err(ProgressError::ScriptExhausted {
                schema: self.state.active_schema.clone(),
                cursor,
            });
        };
        info!(
            from = %self.state.active_schema,
            to = %schema,
            "script exhausted, entering fallback schema"
        );
        self.state.enter_schema(schema.clone());
        let write_error = self.commit(CheckpointReason::SchemaTransition)?;
        Ok(Checkpointed::new(
            NextContent::SchemaTransition { line: None, schema },
            write_error,
        ))
    }

    // --- quiz entry ---

    /// Starts a fresh attempt at `challenge_index` (1-based) of `schema`.
    ///
    /// When the content cannot be resolved the entry is rolled back before
    /// returning: a quiz triggered by dialog falls back to the dialog after
    /// the trigger line (checkpointed), any other entry leaves the state
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` while a quiz is active or
    /// the game is complete, and `ProgressError::ContentNotFound` if the
    /// challenge does not exist or has no questions. If the fallback to
    /// dialog could not be saved, the `ContentNotFound` is wrapped in
    /// `ProgressError::CorrectionNotSaved`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn enter_quiz(
        &mut self,
        schema: &str,
        challenge_index: u32,
    ) -> Result<Checkpointed<QuizSession>, ProgressError> {
        if !matches!(
            self.phase,
            SessionPhase::Dialog
                | SessionPhase::QuizEntering
                | SessionPhase::QuizResolved(_)
                | SessionPhase::Summary
        ) {
            return Err(self.reject("enter_quiz"));
        }
        let triggered = self.phase == SessionPhase::QuizEntering
            && self
                .state
                .pending_quiz
                .as_ref()
                .is_some_and(|p| p.is_quiz(schema, challenge_index));
        let on_missing = if triggered {
            MissingContent::ReturnToDialog
        } else {
            MissingContent::Restore
        };
        let before = (self.state.clone(), self.phase);
        self.start_quiz(schema, challenge_index, on_missing, before)
    }

    /// Enters the quiz the dialog has requested.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless a quiz is pending
    /// entry, and otherwise the errors of `enter_quiz`.
    pub fn enter_pending_quiz(&mut self) -> Result<Checkpointed<QuizSession>, ProgressError> {
        if self.phase != SessionPhase::QuizEntering {
            return Err(self.reject("enter_pending_quiz"));
        }
        let Some(pending) = self.state.pending_quiz.clone() else {
            return Err(ProgressError::InvariantViolation(
                "quiz_entering without a pending quiz".to_owned(),
            ));
        };
        self.enter_quiz(&pending.schema, pending.challenge_index)
    }

    /// Re-enters the last quiz attempted this session at full health.
    ///
    /// Passing it again continues after its trigger line while that schema is
    /// still active. Once the narrative has moved to another schema, it
    /// continues from the current dialog position instead.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoRetryTarget` if no quiz has been attempted,
    /// `ProgressError::InvalidTransition` while a quiz is active or the game
    /// is complete, and `ProgressError::ContentNotFound` if the quiz content
    /// has gone away.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn retry_last_quiz(&mut self) -> Result<Checkpointed<QuizSession>, ProgressError> {
        if matches!(self.phase, SessionPhase::QuizActive | SessionPhase::Complete) {
            return Err(self.reject("retry_last_quiz"));
        }
        let Some(target) = self.last_quiz.clone() else {
            return Err(ProgressError::NoRetryTarget);
        };
        let on_missing = if self.phase == SessionPhase::QuizResolved(QuizOutcome::Failure) {
            MissingContent::ReturnToDialog
        } else {
            MissingContent::Restore
        };
        let before = (self.state.clone(), self.phase);
        info!(
            schema = %target.schema,
            challenge_index = target.challenge_index,
            "retrying quiz"
        );
        let mut reopened = target.reopened();
        if !reopened.resumes_in(&self.state.active_schema) {
            debug!(
                dialog_schema = ?reopened.dialog_schema,
                active_schema = %self.state.active_schema,
                "retrying from another schema, keeping the dialog position"
            );
            reopened.resume_cursor = self.state.dialog_cursor;
            reopened.dialog_schema = Some(self.state.active_schema.clone());
        }
        self.state.pending_quiz = Some(reopened);
        self.state.quiz_attempt = None;
        self.phase = SessionPhase::QuizEntering;
        self.start_quiz(&target.schema, target.challenge_index, on_missing, before)
    }

    fn start_quiz(
        &mut self,
        schema: &str,
        challenge_index: u32,
        on_missing: MissingContent,
        before: (ProgressionState, SessionPhase),
    ) -> Result<Checkpointed<QuizSession>, ProgressError> {
        let max_health = self.config.max_health;
        let resolved = self
            .content
            .resolve_challenge(schema, challenge_index)
            .and_then(|challenge| {
                QuizEngine::new(challenge, max_health)
                    .ok_or_else(|| ProgressError::challenge_not_found(schema, challenge_index))
            });
        let engine = match resolved {
            Ok(engine) => engine.with_bonus_heart_on_correct(self.config.bonus_heart_on_correct),
            Err(err) => {
                let write_error = self.abandon_entry(on_missing, before, &err);
                return Err(err.with_write_error(write_error));
            }
        };

        let active_schema = self.state.active_schema.clone();
        let pending = match self
            .state
            .pending_quiz
            .as_ref()
            .filter(|p| p.is_quiz(schema, challenge_index))
        {
            Some(p) if p.dialog_schema.is_some() => p.reopened(),
            Some(p) => p.reopened().in_dialog(active_schema),
            None => PendingQuiz::new(schema, challenge_index, self.state.dialog_cursor)
                .in_dialog(active_schema),
        };
        self.state.pending_quiz = Some(pending.clone());
        self.state.quiz_attempt = Some(QuizAttempt::fresh(challenge_index, max_health));
        self.pause_clock.reset();
        self.pause_clock.start();
        let quiz = self.activate(schema.to_owned(), challenge_index, engine);
        self.quiz = Some(quiz);
        self.last_quiz = Some(pending);
        self.phase = SessionPhase::QuizActive;
        info!(schema, challenge_index, "quiz entered");

        let write_error = self.commit(CheckpointReason::QuizEntered)?;
        let session = self.quiz_session().ok_or_else(|| {
            ProgressError::InvariantViolation("entered quiz has no question".to_owned())
        })?;
        Ok(Checkpointed::new(session, write_error))
    }

    /// Rolls back a failed entry. Returns the error of the corrective
    /// checkpoint, if one was written and failed.
    fn abandon_entry(
        &mut self,
        on_missing: MissingContent,
        before: (ProgressionState, SessionPhase),
        err: &ProgressError,
    ) -> Option<ProgressError> {
        let (state, phase) = before;
        match on_missing {
            MissingContent::Restore => {
                warn!(error = %err, "quiz content missing, entry rolled back");
                self.state = state;
                self.phase = phase;
                None
            }
            MissingContent::ReturnToDialog => {
                let resume_cursor = state
                    .pending_quiz
                    .as_ref()
                    .filter(|p| p.resumes_in(&state.active_schema))
                    .map_or(state.dialog_cursor, |p| p.resume_cursor);
                warn!(error = %err, resume_cursor, "quiz content missing, returning to dialog");
                self.state = state;
                self.state.pending_quiz = None;
                self.state.quiz_attempt = None;
                self.state.dialog_cursor = resume_cursor;
                self.quiz = None;
                self.pause_clock.reset();
                self.phase = SessionPhase::Dialog;
                let write_error = self.checkpoint(CheckpointReason::QuizAbandoned);
                self.notify();
                write_error
            }
        }
    }

    // --- answering ---

    /// Evaluates the glyphs placed in the blanks.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless a quiz is active.
    #[instrument(skip(self, glyphs), fields(session_id = %self.id))]
    pub fn submit_answer<S: AsRef<str>>(
        &mut self,
        glyphs: &[S],
    ) -> Result<Checkpointed<AnswerFeedback>, ProgressError> {
        let quiz = self.active_quiz_mut("submit_answer")?;
        let (verdict, report) = quiz.engine.submit(glyphs)?;
        debug!(?verdict, "answer evaluated");
        self.apply_report(report, Some(verdict))
    }

    /// Applies an answer judged by the surface.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless a quiz is active.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn on_answer(&mut self, correct: bool) -> Result<Checkpointed<AnswerFeedback>, ProgressError> {
        let quiz = self.active_quiz_mut("answer")?;
        let report = quiz.engine.on_answer(correct)?;
        self.apply_report(report, None)
    }

    /// Applies an expired countdown; costs one heart like a wrong answer.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless a quiz is active.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn on_timeout(&mut self) -> Result<Checkpointed<AnswerFeedback>, ProgressError> {
        let quiz = self.active_quiz_mut("timeout")?;
        let report = quiz.engine.on_timeout()?;
        self.apply_report(report, None)
    }

    /// Awards a bonus heart, never above the maximum.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless a quiz is active.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn award_heart(&mut self) -> Result<Checkpointed<AnswerFeedback>, ProgressError> {
        let quiz = self.active_quiz_mut("award_heart")?;
        let health_delta = quiz.engine.award_heart()?;
        let health = quiz.engine.health().current();
        let question_index = quiz.engine.question_index();
        if let Some(attempt) = self.state.quiz_attempt.as_mut() {
            attempt.health = health;
        }
        let write_error = self.commit(CheckpointReason::HeartAwarded)?;
        let feedback = AnswerFeedback {
            verdict: None,
            health_delta,
            question_delta: 0,
            outcome: None,
            health,
            question_index,
            phase: self.phase,
            next_question: self.question_view(),
        };
        Ok(Checkpointed::new(feedback, write_error))
    }

    fn active_quiz_mut(&mut self, event: &'static str) -> Result<&mut ActiveQuiz, ProgressError> {
        if self.phase != SessionPhase::QuizActive {
            return Err(self.reject(event));
        }
        self.quiz.as_mut().ok_or_else(|| {
            ProgressError::InvariantViolation("quiz_active without a quiz engine".to_owned())
        })
    }

    fn apply_report(
        &mut self,
        report: AnswerReport,
        verdict: Option<Verdict>,
    ) -> Result<Checkpointed<AnswerFeedback>, ProgressError> {
        let elapsed = self.pause_clock.elapsed();
        if let Some(attempt) = self.state.quiz_attempt.as_mut() {
            attempt.health = report.health;
            attempt.question_index = report.question_index;
            attempt.elapsed_seconds = elapsed;
        }

        let write_error = match report.outcome {
            QuestionOutcome::Advance | QuestionOutcome::RetryQuestion => {
                self.load_question();
                self.commit(CheckpointReason::QuestionResolved)?
            }
            QuestionOutcome::Success => {
                self.commit(CheckpointReason::QuestionResolved)?;
                self.resolve_quiz(QuizOutcome::Success, report.health, elapsed);
                info!(health = report.health, elapsed_seconds = elapsed, "quiz passed");
                self.commit(CheckpointReason::QuizCompleted)?
            }
            QuestionOutcome::Failure => {
                self.resolve_quiz(QuizOutcome::Failure, report.health, elapsed);
                info!(elapsed_seconds = elapsed, "quiz failed");
                self.commit(CheckpointReason::QuizFailed)?
            }
        };

        let feedback = AnswerFeedback {
            verdict,
            health_delta: report.health_delta,
            question_delta: report.question_delta,
            outcome: Some(report.outcome),
            health: report.health,
            question_index: report.question_index,
            phase: self.phase,
            next_question: self.question_view(),
        };
        Ok(Checkpointed::new(feedback, write_error))
    }

    /// Lays out tiles and restarts the countdown for the current question.
    fn load_question(&mut self) {
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        let Some(question) = quiz.engine.current_question() else {
            return;
        };
        let limit = question.time_limit_seconds;
        quiz.tiles = build_tiles(
            &question.expected_glyphs,
            self.config.tile_count,
            self.rng.as_mut(),
        );
        quiz.countdown.restart(limit);
    }

    fn activate(&mut self, schema: String, challenge_index: u32, engine: QuizEngine) -> ActiveQuiz {
        let (tiles, limit) = match engine.current_question() {
            Some(question) => (
                build_tiles(
                    &question.expected_glyphs,
                    self.config.tile_count,
                    self.rng.as_mut(),
                ),
                question.time_limit_seconds,
            ),
            None => (Vec::new(), 0.0),
        };
        ActiveQuiz {
            schema,
            challenge_index,
            engine,
            tiles,
            countdown: QuestionCountdown::new(limit, self.config.time_almost_out_seconds),
        }
    }

    fn resolve_quiz(&mut self, outcome: QuizOutcome, health: u8, elapsed_seconds: f64) {
        if let Some(pending) = self.state.pending_quiz.as_mut() {
            pending.result = Some(QuizResult {
                outcome,
                health,
                elapsed_seconds,
            });
            self.last_quiz = Some(pending.reopened());
        }
        let passed = self
            .state
            .pending_quiz
            .as_ref()
            .map(|p| p.challenge_index)
            .filter(|_| outcome == QuizOutcome::Success);
        if let Some(challenge_index) = passed {
            self.state.record_completion(challenge_index);
        }
        self.state.quiz_attempt = None;
        self.quiz = None;
        self.pause_clock.reset();
        self.phase = SessionPhase::QuizResolved(outcome);
    }

    // --- after the quiz ---

    /// Leaves a passed quiz and continues the dialog after its trigger line.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless on the success or
    /// summary screen.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn continue_after_quiz(&mut self) -> Result<Checkpointed<ProgressionState>, ProgressError> {
        if !matches!(
            self.phase,
            SessionPhase::QuizResolved(QuizOutcome::Success) | SessionPhase::Summary
        ) {
            return Err(self.reject("continue_after_quiz"));
        }
        let Some(pending) = self.state.pending_quiz.take() else {
            return Err(ProgressError::InvariantViolation(
                "resolved quiz without a pending quiz".to_owned(),
            ));
        };
        if pending.resumes_in(&self.state.active_schema) {
            self.state.dialog_cursor = pending.resume_cursor;
        } else {
            warn!(
                dialog_schema = ?pending.dialog_schema,
                active_schema = %self.state.active_schema,
                "quiz was triggered in another schema, keeping the dialog position"
            );
        }
        self.phase = SessionPhase::Dialog;
        info!(dialog_cursor = self.state.dialog_cursor, "continuing dialog after quiz");
        let write_error = self.commit(CheckpointReason::QuizContinued)?;
        Ok(Checkpointed::new(self.state.clone(), write_error))
    }

    /// Moves from the success screen to the score summary.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` unless a quiz was just
    /// passed.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn show_summary(&mut self) -> Result<QuizSummary, ProgressError> {
        if !matches!(
            self.phase,
            SessionPhase::QuizResolved(QuizOutcome::Success) | SessionPhase::Summary
        ) {
            return Err(self.reject("show_summary"));
        }
        let summary = self.summary().ok_or_else(|| {
            ProgressError::InvariantViolation("passed quiz has no result".to_owned())
        })?;
        if self.phase != SessionPhase::Summary {
            self.phase = SessionPhase::Summary;
            self.notify();
        }
        Ok(summary)
    }

    // --- timers ---

    /// Advances the attempt clock and question countdown by `delta_seconds`.
    /// Elapsed time is kept in memory and persisted with the next checkpoint.
    pub fn tick(&mut self, delta_seconds: f64) -> TickReport {
        let paused = self.pause_clock.is_paused();
        let active = self.phase == SessionPhase::QuizActive;
        let Some(quiz) = self.quiz.as_mut().filter(|_| active) else {
            return TickReport {
                elapsed_seconds: self.pause_clock.elapsed(),
                remaining_seconds: None,
                countdown: None,
                paused,
            };
        };
        self.pause_clock.tick(delta_seconds);
        let countdown = quiz.countdown.tick(delta_seconds);
        let remaining = quiz.countdown.remaining();
        let elapsed = self.pause_clock.elapsed();
        if let Some(attempt) = self.state.quiz_attempt.as_mut() {
            attempt.elapsed_seconds = elapsed;
        }
        if let Some(event) = countdown {
            debug!(?event, remaining_seconds = remaining, "question countdown");
        }
        TickReport {
            elapsed_seconds: elapsed,
            remaining_seconds: Some(remaining),
            countdown,
            paused,
        }
    }

    /// Stops the attempt clock and countdown. Pausing twice does nothing.
    pub fn pause(&mut self) {
        self.pause_clock.pause();
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.countdown.pause();
        }
        debug!(paused = self.pause_clock.is_paused(), "session paused");
    }

    /// Continues after `pause`. Resuming without a pause does nothing.
    pub fn resume(&mut self) {
        self.pause_clock.resume();
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.countdown.resume();
        }
        debug!("session resumed");
    }

    /// Returns `true` while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pause_clock.is_paused()
    }

    // --- manual saves ---

    /// Saves the current position to a slot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` while a quiz is active,
    /// `ProgressError::InvalidSlot` for an index outside `1..=len + 1`, and
    /// `ProgressError::StorageWriteFailed` if the slot list could not be
    /// written.
    #[instrument(skip(self, info), fields(session_id = %self.id))]
    pub fn save_to_slot(&mut self, index: usize, info: &str) -> Result<SaveSlot, ProgressError> {
        if self.phase == SessionPhase::QuizActive {
            return Err(self.reject("save_to_slot"));
        }
        let record = SaveRecord::capture(&self.state, info, self.clock.timestamp());
        self.store.upsert_slot(index, &record)?;
        info!(index, "progress saved to slot");
        Ok(SaveSlot { index, record })
    }

    /// Replaces the session with a slot's progress and writes it as the
    /// auto-save.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidSlot` if there is no such slot.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn load_from_slot(&mut self, index: usize) -> Result<Checkpointed<ProgressionState>, ProgressError> {
        let Some(slot) = self.store.load_slot(index) else {
            return Err(ProgressError::InvalidSlot {
                index,
                max: self.store.list_slots().len(),
            });
        };
        self.hydrate(slot.record.to_state());
        let write_error = self.checkpoint(CheckpointReason::SlotLoaded);
        info!(index, phase = %self.phase, "progress loaded from slot");
        self.notify();
        Ok(Checkpointed::new(self.state.clone(), write_error))
    }

    /// Deletes a slot; later slots move down by one.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageWriteFailed` if the slot list could not
    /// be written.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn delete_slot(&mut self, index: usize) -> Result<(), ProgressError> {
        self.store.delete_slot(index)?;
        info!(index, "save slot deleted");
        Ok(())
    }

    /// All manual slots in index order.
    #[must_use]
    pub fn list_slots(&self) -> Vec<SaveSlot> {
        self.store.list_slots()
    }

    /// Deletes the auto-save and every slot and returns to a new game
    /// without writing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageWriteFailed` if stored data could not
    /// be removed; the session is left unchanged.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset_all_progress(&mut self) -> Result<ProgressionState, ProgressError> {
        self.store.reset_all()?;
        let state = ProgressionState::new_game(self.config.initial_schema.clone());
        self.install(state, SessionPhase::Dialog);
        self.last_quiz = None;
        self.last_good = None;
        self.unsaved = false;
        warn!("all progress reset");
        self.notify();
        Ok(self.state.clone())
    }

    /// Returns `true` if the auto-save holds progress to continue from.
    #[must_use]
    pub fn has_continue_data(&self) -> bool {
        self.store.has_continue_data()
    }

    /// Retries the latest checkpoint after a failed write. Returns `false`
    /// when there was nothing to write.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StorageWriteFailed` if the write fails again.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn flush(&mut self) -> Result<bool, ProgressError> {
        if !self.unsaved {
            return Ok(false);
        }
        match self.checkpoint(CheckpointReason::Flush) {
            None => Ok(true),
            Some(err) => Err(err),
        }
    }

    // --- observers ---

    /// Registers an observer; it hears about every transition from now on.
    pub fn attach(&mut self, observer: Box<dyn SessionObserver>) -> ObserverHandle {
        self.next_handle += 1;
        let handle = ObserverHandle(self.next_handle);
        self.observers.push((handle, observer));
        handle
    }

    /// Removes an observer, handing it back.
    pub fn detach(&mut self, handle: ObserverHandle) -> Option<Box<dyn SessionObserver>> {
        let index = self.observers.iter().position(|(h, _)| *h == handle)?;
        Some(self.observers.remove(index).1)
    }

    // --- views ---

    /// A copy of the current progression state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressionState {
        self.state.clone()
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The line the next `advance_dialog` will show, while in dialog.
    #[must_use]
    pub fn current_line(&self) -> Option<DialogLine> {
        if self.phase != SessionPhase::Dialog {
            return None;
        }
        let script = self.content.resolve_dialog(&self.state.active_schema).ok()?;
        script.line(self.state.dialog_cursor).cloned()
    }

    /// The attempt in progress, while a quiz is active.
    #[must_use]
    pub fn quiz_session(&self) -> Option<QuizSession> {
        let quiz = self.quiz.as_ref()?;
        let question = self.question_view()?;
        let challenge = quiz.engine.challenge();
        let health = quiz.engine.health();
        Some(QuizSession {
            schema: quiz.schema.clone(),
            challenge_index: quiz.challenge_index,
            level: challenge.level,
            background: challenge.background.clone(),
            question_index: quiz.engine.question_index(),
            question_count: quiz.engine.question_count(),
            health: health.current(),
            max_health: health.max(),
            elapsed_seconds: self.pause_clock.elapsed(),
            question,
        })
    }

    /// Score of the quiz just passed, on the success and summary screens.
    #[must_use]
    pub fn summary(&self) -> Option<QuizSummary> {
        let pending = self.state.pending_quiz.as_ref()?;
        let result = pending
            .result
            .as_ref()
            .filter(|r| r.outcome == QuizOutcome::Success)?;
        Some(QuizSummary {
            schema: pending.schema.clone(),
            challenge_index: pending.challenge_index,
            health: result.health,
            elapsed_seconds: result.elapsed_seconds,
            score: score(result.health, result.elapsed_seconds),
        })
    }

    /// The quiz `retry_last_quiz` would enter.
    #[must_use]
    pub fn last_quiz(&self) -> Option<&PendingQuiz> {
        self.last_quiz.as_ref()
    }

    fn question_view(&self) -> Option<QuestionView> {
        let quiz = self.quiz.as_ref()?;
        let question = quiz.engine.current_question()?;
        Some(QuestionView {
            prompt: question.prompt.clone(),
            scrambled_presentation: question.scrambled_presentation.clone(),
            blank_count: question.blank_count(),
            tiles: quiz.tiles.clone(),
            time_limit_seconds: question.time_limit_seconds,
            remaining_seconds: quiz.countdown.remaining(),
        })
    }

    // --- internals ---

    fn reject(&self, event: &'static str) -> ProgressError {
        debug!(phase = %self.phase, event, "transition rejected");
        ProgressError::InvalidTransition {
            phase: self.phase.as_str(),
            event,
        }
    }

    fn install(&mut self, state: ProgressionState, phase: SessionPhase) {
        self.state = state;
        self.phase = phase;
        self.quiz = None;
        self.pause_clock.reset();
    }

    /// Takes over a persisted state and rebuilds the runtime around it.
    /// Returns the error of any corrective write.
    fn hydrate(&mut self, state: ProgressionState) -> Option<ProgressError> {
        self.last_quiz = state.pending_quiz.as_ref().map(|p| match p.dialog_schema {
            Some(_) => p.reopened(),
            None => p.reopened().in_dialog(state.active_schema.clone()),
        });
        self.install(state, SessionPhase::Dialog);
        self.last_good = Some(self.state.clone());
        match self.restore_position() {
            Ok(Restored::AsSaved) => None,
            Ok(Restored::FinishedPendingSuccess) => {
                info!("completing a quiz whose final answer was already saved");
                self.checkpoint(CheckpointReason::QuizCompleted)
            }
            Err(reason) => self.degrade_to_dialog(&reason),
        }
    }

    fn restore_position(&mut self) -> Result<Restored, String> {
        self.state
            .validate(self.config.max_health)
            .map_err(|e| e.to_string())?;
        if self.state.game_complete {
            self.phase = SessionPhase::Complete;
            return Ok(Restored::AsSaved);
        }
        let Some(pending) = self.state.pending_quiz.clone() else {
            self.phase = SessionPhase::Dialog;
            return Ok(Restored::AsSaved);
        };
        if let Some(result) = &pending.result {
            self.phase = SessionPhase::QuizResolved(result.outcome);
            return Ok(Restored::AsSaved);
        }
        let challenge = self
            .content
            .resolve_challenge(&pending.schema, pending.challenge_index)
            .map_err(|e| e.to_string())?;
        let Some(attempt) = self.state.quiz_attempt.clone() else {
            self.phase = SessionPhase::QuizEntering;
            return Ok(Restored::AsSaved);
        };
        if attempt.question_index == challenge.questions.len() {
            self.resolve_quiz(QuizOutcome::Success, attempt.health, attempt.elapsed_seconds);
            return Ok(Restored::FinishedPendingSuccess);
        }
        let health = Health::restore(attempt.health, self.config.max_health);
        let engine = QuizEngine::resume(challenge, attempt.question_index, health)
            .ok_or_else(|| format!("question {} no longer exists", attempt.question_index))?
            .with_bonus_heart_on_correct(self.config.bonus_heart_on_correct);
        self.pause_clock.restore(attempt.elapsed_seconds);
        self.pause_clock.start();
        let quiz = self.activate(pending.schema, pending.challenge_index, engine);
        self.quiz = Some(quiz);
        self.phase = SessionPhase::QuizActive;
        Ok(Restored::AsSaved)
    }

    fn degrade_to_dialog(&mut self, reason: &str) -> Option<ProgressError> {
        warn!(
            reason,
            schema = %self.state.active_schema,
            dialog_cursor = self.state.dialog_cursor,
            "saved position no longer resolves, resuming in dialog"
        );
        self.state.pending_quiz = None;
        self.state.quiz_attempt = None;
        self.quiz = None;
        self.last_quiz = None;
        self.pause_clock.reset();
        self.phase = if self.state.game_complete {
            SessionPhase::Complete
        } else {
            SessionPhase::Dialog
        };
        self.checkpoint(CheckpointReason::ResumeCorrected)
    }

    /// Verifies the invariants, writes the checkpoint and notifies observers.
    fn commit(&mut self, reason: CheckpointReason) -> Result<Option<ProgressError>, ProgressError> {
        self.verify()?;
        let write_error = self.checkpoint(reason);
        self.notify();
        Ok(write_error)
    }

    fn verify(&mut self) -> Result<(), ProgressError> {
        let verdict = self.state.validate(self.config.max_health);
        debug_assert!(verdict.is_ok(), "progression invariant violated: {verdict:?}");
        let Err(err) = verdict else {
            return Ok(());
        };
        error!(error = %err, "progression invariant violated, restoring last checkpoint");
        let write_error = match self.last_good.clone() {
            Some(good) => self.hydrate(good),
            None => {
                let state = ProgressionState::new_game(self.config.initial_schema.clone());
                self.install(state, SessionPhase::Dialog);
                None
            }
        };
        self.notify();
        Err(err.with_write_error(write_error))
    }

    /// Writes the auto-save. Returns the write error, if any; the in-memory
    /// state is kept either way.
    fn checkpoint(&mut self, reason: CheckpointReason) -> Option<ProgressError> {
        let elapsed = self.pause_clock.elapsed();
        if let Some(attempt) = self.state.quiz_attempt.as_mut() {
            attempt.elapsed_seconds = elapsed;
        }
        let saved_at = self.clock.timestamp();
        let record = SaveRecord::capture(&self.state, "", saved_at.clone());
        match self.store.write_auto_save(&record) {
            Ok(()) => {
                self.state.checkpoint_timestamp = saved_at;
                self.unsaved = false;
                self.last_good = Some(self.state.clone());
                info!(
                    ?reason,
                    schema = %record.schema,
                    dialog_index = record.dialog_index,
                    "checkpoint written"
                );
                for (_, observer) in &mut self.observers {
                    observer.on_checkpoint(reason, &record);
                }
                None
            }
            Err(err) => {
                self.unsaved = true;
                warn!(?reason, error = %err, "checkpoint write failed");
                Some(err)
            }
        }
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer.on_state_changed(&self.state, self.phase);
        }
    }
}
