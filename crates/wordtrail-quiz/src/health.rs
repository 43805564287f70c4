//! Quiz health.

/// Hearts remaining in a quiz attempt, clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u8,
    max: u8,
}

impl Health {
    /// Full health.
    #[must_use]
    pub fn full(max: u8) -> Self {
        Self { current: max, max }
    }

    /// Health restored from a saved attempt; `current` is clamped to `max`.
    #[must_use]
    pub fn restore(current: u8, max: u8) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Remaining hearts.
    #[must_use]
    pub fn current(self) -> u8 {
        self.current
    }

    /// Maximum hearts.
    #[must_use]
    pub fn max(self) -> u8 {
        self.max
    }

    /// Returns `true` once no hearts are left.
    #[must_use]
    pub fn is_depleted(self) -> bool {
        self.current == 0
    }

    /// Removes one heart. Returns the change applied (`0` or `-1`).
    pub fn lose(&mut self) -> i8 {
        if self.current == 0 {
            return 0;
        }
        self.current -= 1;
        -1
    }

    /// Adds one heart up to `max`. Returns the change applied (`0` or `1`).
    pub fn award(&mut self) -> i8 {
        if self.current >= self.max {
            return 0;
        }
        self.current += 1;
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lose_stops_at_zero() {
        let mut health = Health::full(1);

        assert_eq!(health.lose(), -1);
        assert_eq!(health.lose(), 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn test_award_is_capped_at_max() {
        let mut health = Health::restore(4, 5);

        assert_eq!(health.award(), 1);
        assert_eq!(health.award(), 0);
        assert_eq!(health.current(), 5);
    }

    #[test]
    fn test_restore_clamps_to_max() {
        let health = Health::restore(9, 5);

        assert_eq!(health.current(), 5);
        assert_eq!(health.max(), 5);
    }
}
