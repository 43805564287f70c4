//! Wordtrail — quiz engine.
//!
//! Evaluates answers, tracks health and question progress, lays out answer
//! tiles, runs the per-question countdown and scores finished attempts.
//! Everything here is pure: no I/O, no clocks, randomness only through
//! `DeterministicRng`.

pub mod answer;
pub mod countdown;
pub mod engine;
pub mod health;
pub mod scoring;
pub mod tiles;

pub use answer::{Verdict, evaluate};
pub use countdown::{CountdownEvent, QuestionCountdown};
pub use engine::{AnswerReport, QuestionOutcome, QuizEngine};
pub use health::Health;
pub use scoring::{QuizScore, score};
pub use tiles::build_tiles;
