//! A small two-schema story used across the session tests.
//!
//! `schema_1` has four plain lines, a quiz trigger on line 4 (challenge 1,
//! three questions), one more plain line and a transition to `schema_2`.
//! `schema_2` has a plain line, a quiz trigger on line 1 (challenge 1, one
//! question) and the game-complete line.

use wordtrail_core::content::{Challenge, DialogEvent, DialogLine, DialogScript, Question};

use crate::content::InMemoryContentRepository;

/// Line index of the quiz trigger in `schema_1`.
pub const SCHEMA_1_QUIZ_LINE: usize = 4;

/// Builds a question whose expected glyphs spell `answer` letter by letter.
#[must_use]
pub fn question(answer: &str) -> Question {
    Question {
        prompt: format!("Fill in the word \"{answer}\"."),
        answer: answer.to_owned(),
        expected_glyphs: answer.chars().map(|c| c.to_string()).collect(),
        scrambled_presentation: "_".repeat(answer.chars().count()),
        time_limit_seconds: 30.0,
    }
}

/// Builds a level-1 challenge from answer words.
#[must_use]
pub fn challenge(answers: &[&str]) -> Challenge {
    Challenge {
        level: 1,
        background: Some("forest".to_owned()),
        questions: answers.iter().map(|a| question(a)).collect(),
    }
}

/// The opening schema.
#[must_use]
pub fn schema_1_dialog() -> DialogScript {
    DialogScript {
        schema: "schema_1".to_owned(),
        background: Some("village".to_owned()),
        lines: vec![
            DialogLine::plain("Narrator", "The village wakes up."),
            DialogLine::plain("Rani", "Good morning!"),
            DialogLine::plain("Rani", "The signpost has lost its letters."),
            DialogLine::plain("Rani", "Will you help me?"),
            DialogLine::plain("Rani", "Let's fix the first sign.").with_event(DialogEvent::Quiz {
                schema: "schema_1".to_owned(),
                challenge_index: 1,
            }),
            DialogLine::plain("Rani", "That looks much better."),
            DialogLine::plain("Rani", "Let's cross the bridge.").with_event(
                DialogEvent::NextSchema {
                    schema: "schema_2".to_owned(),
                },
            ),
        ],
    }
}

/// The closing schema.
#[must_use]
pub fn schema_2_dialog() -> DialogScript {
    DialogScript {
        schema: "schema_2".to_owned(),
        background: Some("bridge".to_owned()),
        lines: vec![
            DialogLine::plain("Elder", "Only one sign remains."),
            DialogLine::plain("Elder", "Show me what you learned.").with_event(DialogEvent::Quiz {
                schema: "schema_2".to_owned(),
                challenge_index: 1,
            }),
            DialogLine::plain("Elder", "The trail is whole again.")
                .with_event(DialogEvent::GameComplete),
        ],
    }
}

/// A repository holding the whole story.
#[must_use]
pub fn story_repository() -> InMemoryContentRepository {
    InMemoryContentRepository::new()
        .with_dialog(schema_1_dialog())
        .with_dialog(schema_2_dialog())
        .with_challenges(
            "schema_1",
            vec![challenge(&["go", "run", "sat"]), challenge(&["eat", "fly"])],
        )
        .with_challenges("schema_2", vec![challenge(&["walk"])])
}
