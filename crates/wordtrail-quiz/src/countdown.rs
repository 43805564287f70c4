//! Per-question countdown.

use serde::Serialize;

/// Signals raised by a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownEvent {
    /// Remaining time dropped to the warning threshold.
    AlmostOut,
    /// Time ran out.
    Expired,
}

/// Countdown for one question, advanced explicitly by the host loop.
///
/// A limit of zero or less means the question is untimed.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCountdown {
    limit: f64,
    remaining: f64,
    threshold: f64,
    paused: bool,
    warned: bool,
    expired: bool,
}

impl QuestionCountdown {
    /// Starts a countdown of `limit` seconds that warns at `threshold`.
    #[must_use]
    pub fn new(limit: f64, threshold: f64) -> Self {
        Self {
            limit,
            remaining: limit.max(0.0),
            threshold,
            paused: false,
            warned: false,
            expired: false,
        }
    }

    /// Starts over with a new limit, keeping the threshold and pause state.
    pub fn restart(&mut self, limit: f64) {
        let paused = self.paused;
        *self = Self::new(limit, self.threshold);
        self.paused = paused;
    }

    /// Advances by `delta` seconds. Each signal is raised at most once.
    pub fn tick(&mut self, delta: f64) -> Option<CountdownEvent> {
        if self.paused || self.expired || !self.is_timed() || !delta.is_finite() || delta <= 0.0 {
            return None;
        }
        self.remaining = (self.remaining - delta).max(0.0);
        if self.remaining <= 0.0 {
            self.expired = true;
            return Some(CountdownEvent::Expired);
        }
        if !self.warned && self.remaining <= self.threshold {
            self.warned = true;
            return Some(CountdownEvent::AlmostOut);
        }
        None
    }

    /// Stops the countdown until `resume` is called.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continues a paused countdown.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// The limit the countdown started from.
    #[must_use]
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Returns `true` once time has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Returns `true` while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_timed(&self) -> bool {
        self.limit > 0.0
    }
}
