//! Session domain types.

pub mod pause_clock;
pub mod transitions;
