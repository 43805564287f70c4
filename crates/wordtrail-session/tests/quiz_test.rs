//! Quiz entry, answering, resolution and retry.

mod common;

use common::{enter_schema_1_quiz, harness, harness_with_config, reach_quiz_trigger};
use wordtrail_core::config::SessionConfig;
use wordtrail_core::error::ProgressError;
use wordtrail_core::phase::SessionPhase;
use wordtrail_core::progression::QuizOutcome;
use wordtrail_quiz::{CountdownEvent, QuestionOutcome, Verdict};
use wordtrail_session::NextContent;
use wordtrail_test_support::fixtures::{self, SCHEMA_1_QUIZ_LINE};

fn letters(tiles: &[&str]) -> Vec<String> {
    tiles.iter().map(|t| (*t).to_owned()).collect()
}

#[test]
fn test_entering_pending_quiz_starts_fresh_attempt() {
    let mut h = harness();
    reach_quiz_trigger(&mut h.controller);
    let writes = h.store.write_count();

    let session = h.controller.enter_pending_quiz().unwrap().value;

    assert_eq!(session.schema, "schema_1");
    assert_eq!(session.challenge_index, 1);
    assert_eq!(session.level, 1);
    assert_eq!(session.background.as_deref(), Some("forest"));
    assert_eq!(session.question_count, 3);
    assert_eq!(session.question_index, 0);
    assert_eq!(session.health, 5);
    assert_eq!(session.max_health, 5);
    assert_eq!(session.question.blank_count, 2);
    assert_eq!(h.controller.phase(), SessionPhase::QuizActive);
    assert_eq!(h.store.write_count(), writes + 1);
    let saved = h.store.current_auto_save().unwrap();
    let attempt = saved.quiz_attempt.unwrap();
    assert_eq!(attempt.question_index, 0);
    assert_eq!(attempt.health, 5);
    assert_eq!(saved.pending_quiz.unwrap().resume_cursor, SCHEMA_1_QUIZ_LINE + 1);
}

#[test]
fn test_tiles_hold_expected_letters_padded_with_distractors() {
    let mut h = harness();

    let session = enter_schema_1_quiz(&mut h.controller);

    assert_eq!(
        session.question.tiles,
        letters(&["G", "O", "A", "B", "C", "D", "E", "F"])
    );
}

#[test]
fn test_mixed_answers_pass_the_quiz_with_one_heart_lost() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);

    h.controller.on_answer(true).unwrap();
    h.controller.on_answer(true).unwrap();
    let wrong = h.controller.on_answer(false).unwrap().value;
    let last = h.controller.on_answer(true).unwrap().value;

    assert_eq!(wrong.health_delta, -1);
    assert_eq!(wrong.outcome, Some(QuestionOutcome::RetryQuestion));
    assert_eq!(wrong.question_index, 2);
    assert_eq!(last.outcome, Some(QuestionOutcome::Success));
    assert_eq!(last.phase, SessionPhase::QuizResolved(QuizOutcome::Success));
    assert!(last.next_question.is_none());
    let state = h.controller.snapshot();
    let pending = state.pending_quiz.as_ref().unwrap();
    let result = pending.result.as_ref().unwrap();
    assert_eq!(result.outcome, QuizOutcome::Success);
    assert_eq!(result.health, 4);
    assert_eq!(pending.resume_cursor, 5);
    assert_eq!(state.last_completed_quiz_index, 1);
    assert!(state.quiz_attempt.is_none());
    assert_eq!(h.store.current_auto_save().unwrap().last_completed_quiz_index, 1);
}

#[test]
fn test_every_answer_is_checkpointed_and_completion_adds_one_more_write() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);
    h.store.clear_writes();

    for _ in 0..3 {
        h.controller.on_answer(true).unwrap();
    }

    let writes = h.store.auto_save_writes();
    assert_eq!(writes.len(), 4);
    let indices: Vec<usize> = writes[..3]
        .iter()
        .map(|w| w.quiz_attempt.as_ref().unwrap().question_index)
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert!(writes[3].quiz_attempt.is_none());
    assert!(writes[3].pending_quiz.as_ref().unwrap().result.is_some());
}

#[test]
fn test_running_out_of_hearts_fails_the_quiz() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);
    h.controller.on_answer(true).unwrap();

    let mut last = None;
    for _ in 0..5 {
        last = Some(h.controller.on_answer(false).unwrap().value);
    }

    let last = last.unwrap();
    assert_eq!(last.outcome, Some(QuestionOutcome::Failure));
    assert_eq!(last.health, 0);
    assert_eq!(last.question_index, 1);
    assert_eq!(h.controller.phase(), SessionPhase::QuizResolved(QuizOutcome::Failure));
    let state = h.controller.snapshot();
    assert_eq!(state.last_completed_quiz_index, 0);
    let result = state.pending_quiz.unwrap().result.unwrap();
    assert_eq!(result.outcome, QuizOutcome::Failure);
    match h.controller.on_answer(true).unwrap_err() {
        ProgressError::InvalidTransition { phase, event } => {
            assert_eq!(phase, "quiz_resolved_failure");
            assert_eq!(event, "answer");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[test]
fn test_retry_after_failure_restarts_at_full_health() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);
    h.controller.on_answer(true).unwrap();
    for _ in 0..5 {
        h.controller.on_answer(false).unwrap();
    }

    let session = h.controller.retry_last_quiz().unwrap().value;

    assert_eq!(session.health, 5);
    assert_eq!(session.question_index, 0);
    assert_eq!(h.controller.phase(), SessionPhase::QuizActive);
    let state = h.controller.snapshot();
    let pending = state.pending_quiz.unwrap();
    assert!(pending.result.is_none());
    assert_eq!(pending.resume_cursor, SCHEMA_1_QUIZ_LINE + 1);
    assert_eq!(state.quiz_attempt.unwrap().health, 5);
}

#[test]
fn test_health_decrement_table() {
    let cases: [(usize, u8, QuestionOutcome); 3] = [
        (1, 4, QuestionOutcome::RetryQuestion),
        (4, 1, QuestionOutcome::RetryQuestion),
        (5, 0, QuestionOutcome::Failure),
    ];
    for (misses, health, outcome) in cases {
        let mut h = harness();
        enter_schema_1_quiz(&mut h.controller);

        let mut last = None;
        for _ in 0..misses {
            last = Some(h.controller.on_answer(false).unwrap().value);
        }

        let last = last.unwrap();
        assert_eq!(last.health_delta, -1, "{misses} misses");
        assert_eq!(last.health, health, "{misses} misses");
        assert_eq!(last.outcome, Some(outcome), "{misses} misses");
    }
}

#[test]
fn test_timeout_costs_a_heart_and_keeps_the_question() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);

    let feedback = h.controller.on_timeout().unwrap().value;

    assert_eq!(feedback.verdict, None);
    assert_eq!(feedback.health_delta, -1);
    assert_eq!(feedback.question_delta, 0);
    assert_eq!(feedback.outcome, Some(QuestionOutcome::RetryQuestion));
    let next = feedback.next_question.unwrap();
    assert_eq!(next.scrambled_presentation, "__");
    assert!((next.remaining_seconds - 30.0).abs() < 1e-9);
}

#[test]
fn test_retry_without_any_quiz_reports_no_target() {
    let mut h = harness();
    h.controller.new_game();

    let result = h.controller.retry_last_quiz();

    assert_eq!(result.unwrap_err(), ProgressError::NoRetryTarget);
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
}

#[test]
fn test_retry_does_not_carry_over_bonus_hearts() {
    let mut h = harness_with_config(SessionConfig {
        bonus_heart_on_correct: true,
        ..SessionConfig::default()
    });
    enter_schema_1_quiz(&mut h.controller);
    h.controller.on_answer(false).unwrap();
    h.controller.award_heart().unwrap();
    for _ in 0..3 {
        h.controller.on_answer(true).unwrap();
    }

    let session = h.controller.retry_last_quiz().unwrap().value;

    assert_eq!(session.health, session.max_health);
    assert_eq!(session.question_index, 0);
}

#[test]
fn test_award_heart_is_capped_at_max_health() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);
    h.controller.on_answer(false).unwrap();

    let first = h.controller.award_heart().unwrap().value;
    let second = h.controller.award_heart().unwrap().value;

    assert_eq!(first.health_delta, 1);
    assert_eq!(first.health, 5);
    assert_eq!(second.health_delta, 0);
    assert_eq!(h.store.current_auto_save().unwrap().quiz_attempt.unwrap().health, 5);
}

#[test]
fn test_missing_content_after_trigger_returns_to_dialog_after_trigger_line() {
    let mut h = harness();
    reach_quiz_trigger(&mut h.controller);
    h.content.remove_challenges("schema_1");

    let result = h.controller.enter_pending_quiz();

    assert!(matches!(result, Err(ProgressError::ContentNotFound { .. })));
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
    let state = h.controller.snapshot();
    assert_eq!(state.dialog_cursor, SCHEMA_1_QUIZ_LINE + 1);
    assert!(state.pending_quiz.is_none());
    let saved = h.store.current_auto_save().unwrap();
    assert_eq!(saved.dialog_index, SCHEMA_1_QUIZ_LINE + 1);
    assert!(saved.pending_quiz.is_none());

    let next = h.controller.advance_dialog().unwrap().value;
    assert_eq!(
        next,
        NextContent::Line {
            line: fixtures::schema_1_dialog().lines[5].clone(),
        }
    );
}

#[test]
fn test_direct_entry_with_missing_content_leaves_state_untouched() {
    let mut h = harness();
    h.controller.new_game();
    h.controller.advance_dialog().unwrap();
    let before = h.controller.snapshot();
    let writes = h.store.write_count();

    let result = h.controller.enter_quiz("schema_9", 1);

    assert!(matches!(result, Err(ProgressError::ContentNotFound { .. })));
    assert_eq!(h.controller.snapshot(), before);
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
    assert_eq!(h.store.write_count(), writes);
}

#[test]
fn test_direct_entry_returns_to_the_same_line_after_passing() {
    let mut h = harness();
    h.controller.new_game();
    h.controller.advance_dialog().unwrap();
    h.controller.advance_dialog().unwrap();

    let session = h.controller.enter_quiz("schema_1", 2).unwrap().value;
    assert_eq!(session.question_count, 2);
    h.controller.on_answer(true).unwrap();
    h.controller.on_answer(true).unwrap();
    let state = h.controller.continue_after_quiz().unwrap().value;

    assert_eq!(state.dialog_cursor, 2);
    assert_eq!(state.last_completed_quiz_index, 2);
    assert!(state.pending_quiz.is_none());
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
}

#[test]
fn test_submit_answer_checks_glyphs_case_insensitively() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);

    let wrong = h.controller.submit_answer(&["O", "G"]).unwrap().value;
    let right = h.controller.submit_answer(&["G", "o"]).unwrap().value;

    assert_eq!(wrong.verdict, Some(Verdict::Incorrect));
    assert_eq!(wrong.health, 4);
    assert_eq!(right.verdict, Some(Verdict::Correct));
    assert_eq!(right.question_index, 1);
    let next = right.next_question.unwrap();
    assert_eq!(next.prompt, fixtures::question("run").prompt);
    assert_eq!(next.tiles, letters(&["R", "U", "N", "A", "B", "C", "D", "E"]));
}

#[test]
fn test_answers_outside_a_quiz_are_rejected() {
    let mut h = harness();
    h.controller.new_game();

    let result = h.controller.on_answer(true);

    match result.unwrap_err() {
        ProgressError::InvalidTransition { phase, event } => {
            assert_eq!(phase, "dialog");
            assert_eq!(event, "answer");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    assert_eq!(h.store.write_count(), 1);
}

#[test]
fn test_summary_scores_the_pass_and_continue_resumes_dialog() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);
    h.controller.tick(10.0);
    for _ in 0..3 {
        h.controller.on_answer(true).unwrap();
    }

    let summary = h.controller.show_summary().unwrap();

    assert_eq!(summary.health, 5);
    assert!((summary.elapsed_seconds - 10.0).abs() < 1e-9);
    assert_eq!(summary.score.points, 900);
    assert_eq!(summary.score.stars, 3);
    assert_eq!(h.controller.phase(), SessionPhase::Summary);

    let state = h.controller.continue_after_quiz().unwrap().value;
    assert_eq!(state.dialog_cursor, SCHEMA_1_QUIZ_LINE + 1);
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
}

#[test]
fn test_summary_is_unavailable_after_failure() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);
    for _ in 0..5 {
        h.controller.on_answer(false).unwrap();
    }

    assert!(h.controller.show_summary().is_err());
    assert!(h.controller.continue_after_quiz().is_err());
}

#[test]
fn test_countdown_warns_then_expires_and_pause_freezes_it() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);

    let warned = h.controller.tick(26.0);
    h.controller.pause();
    let frozen = h.controller.tick(10.0);
    h.controller.resume();
    let expired = h.controller.tick(4.0);

    assert_eq!(warned.countdown, Some(CountdownEvent::AlmostOut));
    assert_eq!(frozen.countdown, None);
    assert!(frozen.paused);
    assert!((frozen.elapsed_seconds - 26.0).abs() < 1e-9);
    assert_eq!(expired.countdown, Some(CountdownEvent::Expired));
    assert_eq!(expired.remaining_seconds, Some(0.0));
    assert!((expired.elapsed_seconds - 30.0).abs() < 1e-9);
}

#[test]
fn test_elapsed_time_is_saved_with_the_next_answer() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);

    h.controller.tick(7.5);
    h.controller.on_answer(false).unwrap();

    let attempt = h.store.current_auto_save().unwrap().quiz_attempt.unwrap();
    assert!((attempt.elapsed_seconds - 7.5).abs() < 1e-9);
}

#[test]
fn test_tick_outside_a_quiz_reports_no_countdown() {
    let mut h = harness();
    h.controller.new_game();

    let report = h.controller.tick(1.0);

    assert_eq!(report.remaining_seconds, None);
    assert_eq!(report.countdown, None);
}

#[test]
fn test_manual_save_is_rejected_during_a_quiz() {
    let mut h = harness();
    enter_schema_1_quiz(&mut h.controller);

    let result = h.controller.save_to_slot(1, "mid quiz");

    match result.unwrap_err() {
        ProgressError::InvalidTransition { phase, event } => {
            assert_eq!(phase, "quiz_active");
            assert_eq!(event, "save_to_slot");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
    assert!(h.controller.list_slots().is_empty());
}

// --- retry after a pass ---

fn pass_schema_1_quiz(controller: &mut wordtrail_session::SessionController) {
    enter_schema_1_quiz(controller);
    for _ in 0..3 {
        controller.on_answer(true).unwrap();
    }
}

#[test]
fn test_retry_from_dialog_in_same_schema_rewinds_to_after_trigger() {
    let mut h = harness();
    pass_schema_1_quiz(&mut h.controller);
    h.controller.continue_after_quiz().unwrap();
    h.controller.advance_dialog().unwrap();
    assert_eq!(h.controller.snapshot().dialog_cursor, SCHEMA_1_QUIZ_LINE + 2);

    let session = h.controller.retry_last_quiz().unwrap().value;
    for _ in 0..3 {
        h.controller.on_answer(true).unwrap();
    }
    let state = h.controller.continue_after_quiz().unwrap().value;

    assert_eq!(session.health, 5);
    assert_eq!(session.question_index, 0);
    assert_eq!(state.active_schema, "schema_1");
    assert_eq!(state.dialog_cursor, SCHEMA_1_QUIZ_LINE + 1);
    let next = h.controller.advance_dialog().unwrap().value;
    assert_eq!(
        next,
        NextContent::Line {
            line: fixtures::schema_1_dialog().lines[5].clone(),
        }
    );
}

#[test]
fn test_retry_from_summary_returns_after_trigger_line() {
    let mut h = harness();
    pass_schema_1_quiz(&mut h.controller);
    h.controller.show_summary().unwrap();

    let session = h.controller.retry_last_quiz().unwrap().value;
    for _ in 0..3 {
        h.controller.on_answer(true).unwrap();
    }
    let state = h.controller.continue_after_quiz().unwrap().value;

    assert_eq!(session.question_index, 0);
    assert_eq!(state.dialog_cursor, SCHEMA_1_QUIZ_LINE + 1);
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
}

#[test]
fn test_retry_after_schema_transition_keeps_new_schema_position() {
    let mut h = harness();
    pass_schema_1_quiz(&mut h.controller);
    h.controller.continue_after_quiz().unwrap();
    h.controller.advance_dialog().unwrap();
    h.controller.advance_dialog().unwrap();
    let before = h.controller.snapshot();
    assert_eq!(before.active_schema, "schema_2");
    assert_eq!(before.dialog_cursor, 0);

    h.controller.retry_last_quiz().unwrap();
    for _ in 0..3 {
        h.controller.on_answer(true).unwrap();
    }
    let state = h.controller.continue_after_quiz().unwrap().value;

    assert_eq!(state.active_schema, "schema_2");
    assert_eq!(state.dialog_cursor, 0);
    let saved = h.store.current_auto_save().unwrap();
    assert_eq!(saved.schema, "schema_2");
    assert_eq!(saved.dialog_index, 0);
    let next = h.controller.advance_dialog().unwrap().value;
    assert_eq!(
        next,
        NextContent::Line {
            line: fixtures::schema_2_dialog().lines[0].clone(),
        }
    );
}

#[test]
fn test_failed_fallback_checkpoint_is_reported_with_missing_content() {
    let mut h = harness();
    reach_quiz_trigger(&mut h.controller);
    h.content.remove_challenges("schema_1");
    h.store.set_failing(true);

    let err = h.controller.enter_pending_quiz().unwrap_err();

    match &err {
        ProgressError::CorrectionNotSaved { error, write_error } => {
            assert!(matches!(**error, ProgressError::ContentNotFound { .. }));
            assert!(matches!(**write_error, ProgressError::StorageWriteFailed(_)));
        }
        other => panic!("expected CorrectionNotSaved, got {other:?}"),
    }
    assert_eq!(h.controller.phase(), SessionPhase::Dialog);
    assert_eq!(h.controller.snapshot().dialog_cursor, SCHEMA_1_QUIZ_LINE + 1);
    assert_eq!(
        h.store.current_auto_save().unwrap().dialog_index,
        SCHEMA_1_QUIZ_LINE
    );

    h.store.set_failing(false);
    assert!(h.controller.flush().unwrap());
    assert_eq!(
        h.store.current_auto_save().unwrap().dialog_index,
        SCHEMA_1_QUIZ_LINE + 1
    );
}
