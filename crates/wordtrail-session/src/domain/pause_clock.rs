//! Elapsed-time accumulator for quiz attempts.

/// Accumulates unpaused time, advanced explicitly by the host loop.
///
/// Pausing twice, or resuming without a pause, does nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauseClock {
    elapsed: f64,
    running: bool,
    paused: bool,
}

impl PauseClock {
    /// A stopped clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts accumulating ticks.
    pub fn start(&mut self) {
        self.running = true;
        self.paused = false;
    }

    /// Stops accumulating until `resume`.
    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    /// Continues after a `pause`.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Adds `delta` seconds unless stopped or paused.
    pub fn tick(&mut self, delta: f64) {
        if self.running && !self.paused && delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
    }

    /// Seconds accumulated while running and not paused.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Sets the accumulated time, e.g. from a saved attempt.
    pub fn restore(&mut self, seconds: f64) {
        self.elapsed = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    }

    /// Stops the clock and clears the accumulated time.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns `true` once started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}
