//! Quiz engine: walks a challenge question by question.

use serde::Serialize;
use wordtrail_core::content::{Challenge, Question};
use wordtrail_core::error::ProgressError;
use wordtrail_core::progression::QuizOutcome;

use crate::answer::{Verdict, evaluate};
use crate::health::Health;

/// What happens to the attempt after a question is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    /// Correct, and another question follows.
    Advance,
    /// Correct on the last question.
    Success,
    /// Wrong or out of time; the same question is asked again.
    RetryQuestion,
    /// Wrong or out of time with the last heart.
    Failure,
}

impl QuestionOutcome {
    /// Returns the quiz outcome if the attempt ended.
    #[must_use]
    pub fn terminal(self) -> Option<QuizOutcome> {
        match self {
            Self::Success => Some(QuizOutcome::Success),
            Self::Failure => Some(QuizOutcome::Failure),
            Self::Advance | Self::RetryQuestion => None,
        }
    }
}

/// Effect of a single answer on the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerReport {
    /// Change in health.
    pub health_delta: i8,
    /// Change in question index.
    pub question_delta: u8,
    /// Resulting outcome.
    pub outcome: QuestionOutcome,
    /// Health after the answer.
    pub health: u8,
    /// Question index after the answer. Equals the question count once the
    /// quiz has succeeded.
    pub question_index: usize,
}

/// State of one attempt at a challenge.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    challenge: Challenge,
    question_index: usize,
    health: Health,
    bonus_heart_on_correct: bool,
    finished: Option<QuizOutcome>,
}

impl QuizEngine {
    /// Starts an attempt on the first question at full health.
    ///
    /// Returns `None` if the challenge has no questions.
    #[must_use]
    pub fn new(challenge: Challenge, max_health: u8) -> Option<Self> {
        Self::resume(challenge, 0, Health::full(max_health))
    }

    /// Rebuilds an attempt from a saved position.
    ///
    /// Returns `None` if `question_index` is not a question of the challenge
    /// or `health` is already depleted.
    #[must_use]
    pub fn resume(challenge: Challenge, question_index: usize, health: Health) -> Option<Self> {
        if question_index >= challenge.questions.len() || health.is_depleted() {
            return None;
        }
        Some(Self {
            challenge,
            question_index,
            health,
            bonus_heart_on_correct: false,
            finished: None,
        })
    }

    /// Awards a heart on every correct answer.
    #[must_use]
    pub fn with_bonus_heart_on_correct(mut self, enabled: bool) -> Self {
        self.bonus_heart_on_correct = enabled;
        self
    }

    /// The challenge being played.
    #[must_use]
    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// Number of questions in the challenge.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.challenge.questions.len()
    }

    /// 0-based index of the current question.
    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// The question being asked, or `None` once the attempt has ended.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished.is_some() {
            return None;
        }
        self.challenge.questions.get(self.question_index)
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> Health {
        self.health
    }

    /// The outcome, once the attempt has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.finished
    }

    /// Evaluates submitted glyphs against the current question and applies
    /// the verdict.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` if the attempt has ended.
    pub fn submit<S: AsRef<str>>(
        &mut self,
        glyphs: &[S],
    ) -> Result<(Verdict, AnswerReport), ProgressError> {
        let Some(question) = self.current_question() else {
            return Err(self.ended_error("submit_answer"));
        };
        let verdict = evaluate(glyphs, &question.expected_glyphs);
        let report = self.on_answer(verdict.is_correct())?;
        Ok((verdict, report))
    }

    /// Applies a correct or incorrect answer.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` if the attempt has ended.
    pub fn on_answer(&mut self, correct: bool) -> Result<AnswerReport, ProgressError> {
        if self.finished.is_some() {
            return Err(self.ended_error("answer"));
        }
        if correct {
            Ok(self.apply_correct())
        } else {
            Ok(self.apply_incorrect())
        }
    }

    /// Applies an expired countdown. Identical to an incorrect answer.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` if the attempt has ended.
    pub fn on_timeout(&mut self) -> Result<AnswerReport, ProgressError> {
        if self.finished.is_some() {
            return Err(self.ended_error("timeout"));
        }
        Ok(self.apply_incorrect())
    }

    /// Adds a heart, up to the maximum. Returns the change applied.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidTransition` if the attempt has ended.
    pub fn award_heart(&mut self) -> Result<i8, ProgressError> {
        if self.finished.is_some() {
            return Err(self.ended_error("award_heart"));
        }
        Ok(self.health.award())
    }

    fn apply_correct(&mut self) -> AnswerReport {
        let health_delta = if self.bonus_heart_on_correct {
            self.health.award()
        } else {
            0
        };
        self.question_index += 1;
        let outcome = if self.question_index >= self.challenge.questions.len() {
            self.finished = Some(QuizOutcome::Success);
            QuestionOutcome::Success
        } else {
            QuestionOutcome::Advance
        };
        self.report(health_delta, 1, outcome)
    }

    fn apply_incorrect(&mut self) -> AnswerReport {
        let health_delta = self.health.lose();
        let outcome = if self.health.is_depleted() {
            self.finished = Some(QuizOutcome::Failure);
            QuestionOutcome::Failure
        } else {
            QuestionOutcome::RetryQuestion
        };
        self.report(health_delta, 0, outcome)
    }

    fn report(&self, health_delta: i8, question_delta: u8, outcome: QuestionOutcome) -> AnswerReport {
        AnswerReport {
            health_delta,
            question_delta,
            outcome,
            health: self.health.current(),
            question_index: self.question_index,
        }
    }

    fn ended_error(&self, event: &'static str) -> ProgressError {
        ProgressError::InvalidTransition {
            phase: match self.finished {
                Some(QuizOutcome::Failure) => "quiz_resolved_failure",
                _ => "quiz_resolved_success",
            },
            event,
        }
    }
}
