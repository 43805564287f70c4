//! Wordtrail CLI — drives a session from line-oriented commands.
//!
//! Each input line is one command; each output line is one JSON object,
//! `{"ok":true,"result":...}` or `{"ok":false,"error":"<code>","message":...}`.

pub mod command;
pub mod config;
pub mod error;
pub mod runner;
pub mod state;
