//! Transmit pacing for the media path
//!
//! Rate-limits frame acquisition and send attempts to a fixed minimum
//! spacing so the radio is never saturated, independent of loop iteration
//! rate and of whether the previous send succeeded. Timestamps are u32
//! milliseconds with wrapping arithmetic, matching a free-running
//! millisecond tick.

/// Minimum-interval gate for frame send attempts
#[derive(Debug, Clone)]
pub struct TransmitPacer {
    interval_ms: u32,
    last_ms: u32,
    primed: bool,
}

impl TransmitPacer {
    /// Create a pacer with the given minimum spacing
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: 0,
            primed: false,
        }
    }

    /// Check whether a send attempt is permitted at `now_ms`
    ///
    /// Returns true and starts a new interval when permitted. The first
    /// call after construction is always permitted. When it returns false
    /// the caller yields briefly and must not touch the frame source.
    pub fn ready(&mut self, now_ms: u32) -> bool {
        if self.primed && now_ms.wrapping_sub(self.last_ms) < self.interval_ms {
            return false;
        }
        self.primed = true;
        self.last_ms = now_ms;
        true
    }

    /// Configured minimum spacing
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_is_permitted() {
        let mut pacer = TransmitPacer::new(120);
        assert!(pacer.ready(0));
    }

    #[test]
    fn test_blocks_until_interval_elapses() {
        let mut pacer = TransmitPacer::new(120);
        assert!(pacer.ready(1000));
        assert!(!pacer.ready(1001));
        assert!(!pacer.ready(1119));
        assert!(pacer.ready(1120));
    }

    #[test]
    fn test_interval_independent_of_denied_polls() {
        let mut pacer = TransmitPacer::new(120);
        assert!(pacer.ready(0));
        // Denied polls must not push the window forward
        for now in 1..120 {
            assert!(!pacer.ready(now));
        }
        assert!(pacer.ready(120));
    }

    #[test]
    fn test_survives_tick_wraparound() {
        let mut pacer = TransmitPacer::new(120);
        assert!(pacer.ready(u32::MAX - 50));
        assert!(!pacer.ready(u32::MAX - 10));
        // 120 ms later, 70 ms past the wrap
        assert!(pacer.ready(69));
    }
}
