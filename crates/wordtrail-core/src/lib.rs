//! Wordtrail Core — shared progression model and collaborator seams.
//!
//! This crate defines the progression state, its persisted forms, the
//! content model, and the traits the session depends on. It contains no
//! infrastructure code.

pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod observer;
pub mod phase;
pub mod progression;
pub mod rng;
pub mod save;
pub mod store;
