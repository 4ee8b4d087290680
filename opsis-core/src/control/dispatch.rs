//! Change/heartbeat dispatch for the control channel
//!
//! Once per loop iteration the node takes a consistent control-state
//! snapshot and asks the dispatcher whether to transmit it. A semantic
//! change sends immediately for low input latency; the heartbeat forces a
//! retransmission after a bounded silence so the peer can detect liveness
//! and a single dropped datagram cannot freeze its last-known state.

use opsis_protocol::ControlState;

/// Why a transmission was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendTrigger {
    /// Snapshot differs from the last-transmitted snapshot
    Change,
    /// Maximum silence interval elapsed with no change
    Heartbeat,
}

/// Decides, once per iteration, whether to transmit the control state
#[derive(Debug, Clone)]
pub struct ControlDispatcher {
    heartbeat_ms: u32,
    last_sent: ControlState,
    last_sent_at_ms: u32,
}

impl ControlDispatcher {
    /// Create a dispatcher with a neutral baseline
    ///
    /// The baseline counts as transmitted at time 0, so an idle stick
    /// first goes out on the first heartbeat.
    pub const fn new(heartbeat_ms: u32) -> Self {
        Self {
            heartbeat_ms,
            last_sent: ControlState::neutral(),
            last_sent_at_ms: 0,
        }
    }

    /// Evaluate the two triggers against the current snapshot
    ///
    /// Either trigger alone is sufficient; change wins the label when both
    /// hold. Returns `None` when nothing should be sent this iteration.
    pub fn evaluate(&self, current: &ControlState, now_ms: u32) -> Option<SendTrigger> {
        if *current != self.last_sent {
            return Some(SendTrigger::Change);
        }
        if now_ms.wrapping_sub(self.last_sent_at_ms) >= self.heartbeat_ms {
            return Some(SendTrigger::Heartbeat);
        }
        None
    }

    /// Record a transmission attempt of `state` at `now_ms`
    ///
    /// Updates snapshot and timestamp together so later evaluations see a
    /// consistent baseline. Called after the send attempt regardless of
    /// link status: a rejected datagram is retried by the next heartbeat
    /// rather than by hammering the radio.
    pub fn mark_sent(&mut self, state: ControlState, now_ms: u32) {
        self.last_sent = state;
        self.last_sent_at_ms = now_ms;
    }

    /// Configured maximum silence interval
    pub fn heartbeat_ms(&self) -> u32 {
        self.heartbeat_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsis_protocol::Direction;

    const HEARTBEAT: u32 = 200;

    fn state(direction: Direction, pressed: bool) -> ControlState {
        ControlState { direction, pressed }
    }

    #[test]
    fn test_change_triggers_immediately() {
        let dispatcher = ControlDispatcher::new(HEARTBEAT);
        let moved = state(Direction::Right, false);
        assert_eq!(dispatcher.evaluate(&moved, 1), Some(SendTrigger::Change));
    }

    #[test]
    fn test_button_change_alone_triggers() {
        let dispatcher = ControlDispatcher::new(HEARTBEAT);
        let pressed = state(Direction::Center, true);
        assert_eq!(dispatcher.evaluate(&pressed, 1), Some(SendTrigger::Change));
    }

    #[test]
    fn test_unchanged_state_waits_for_heartbeat() {
        let mut dispatcher = ControlDispatcher::new(HEARTBEAT);
        let current = state(Direction::Up, false);
        dispatcher.mark_sent(current, 100);

        assert_eq!(dispatcher.evaluate(&current, 150), None);
        assert_eq!(dispatcher.evaluate(&current, 299), None);
        assert_eq!(
            dispatcher.evaluate(&current, 300),
            Some(SendTrigger::Heartbeat)
        );
    }

    #[test]
    fn test_sequence_produces_one_change_send_per_new_state() {
        // Last-transmitted is S1; observing S1 again then S2 inside the
        // heartbeat window must produce exactly one change send, for S2.
        let mut dispatcher = ControlDispatcher::new(HEARTBEAT);
        let s1 = state(Direction::Up, false);
        let s2 = state(Direction::Right, false);
        dispatcher.mark_sent(s1, 10);

        assert_eq!(dispatcher.evaluate(&s1, 20), None);
        assert_eq!(dispatcher.evaluate(&s2, 30), Some(SendTrigger::Change));
        dispatcher.mark_sent(s2, 30);
        assert_eq!(dispatcher.evaluate(&s2, 40), None);
    }

    #[test]
    fn test_steady_state_heartbeat_rate() {
        // Exactly one heartbeat per elapsed interval when input is idle
        let mut dispatcher = ControlDispatcher::new(HEARTBEAT);
        let idle = ControlState::neutral();
        let mut sends = 0;

        for now in 0..=1000 {
            if let Some(trigger) = dispatcher.evaluate(&idle, now) {
                assert_eq!(trigger, SendTrigger::Heartbeat);
                dispatcher.mark_sent(idle, now);
                sends += 1;
            }
        }
        // Baseline counts as sent at t=0, so t = 200, 400, 600, 800, 1000
        assert_eq!(sends, 5);
    }

    #[test]
    fn test_mark_sent_even_after_failed_link_bounds_retry() {
        let mut dispatcher = ControlDispatcher::new(HEARTBEAT);
        let current = state(Direction::Down, false);

        assert_eq!(dispatcher.evaluate(&current, 0), Some(SendTrigger::Change));
        // Link rejected the datagram; the attempt is still recorded
        dispatcher.mark_sent(current, 0);

        assert_eq!(dispatcher.evaluate(&current, 100), None);
        assert_eq!(
            dispatcher.evaluate(&current, 200),
            Some(SendTrigger::Heartbeat)
        );
    }

    #[test]
    fn test_wrapping_timestamps() {
        let mut dispatcher = ControlDispatcher::new(HEARTBEAT);
        let idle = ControlState::neutral();
        dispatcher.mark_sent(idle, u32::MAX - 100);

        assert_eq!(dispatcher.evaluate(&idle, u32::MAX - 50), None);
        assert_eq!(dispatcher.evaluate(&idle, 99), Some(SendTrigger::Heartbeat));
    }
}
