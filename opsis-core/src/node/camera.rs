//! Camera node loop
//!
//! Two independent paths share one cooperative loop:
//!
//! - media: pacer -> acquire -> send -> release, with the buffer returned
//!   to the pool on every exit path;
//! - control: store snapshot -> change/heartbeat gate -> forward the
//!   drive command to the vehicle MCU.
//!
//! The control path runs every iteration. A stalled camera slows only the
//! media path; the control cadence must stay intact while the sensor
//! recovers.

use opsis_protocol::{ControlState, PeerAddress, WireError};

use crate::capture::{select_capture_config, CaptureConfig, TransmitPacer};
use crate::config::TimingConfig;
use crate::control::{ControlCell, ControlDispatcher, SendTrigger};
use crate::diag::TxFrameStats;
use crate::traits::{CaptureError, ControlForward, FrameSource, LinkError, PacketLink};

/// What the media path did this iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MediaEvent {
    /// One frame went out; `report` carries the periodic byte-count log
    Sent {
        bytes: usize,
        report: Option<usize>,
    },
    /// No frame buffer was ready; transient, back off briefly
    Stalled,
    /// The link rejected the frame; the buffer was still released
    SendFailed(LinkError),
}

/// Report of one camera-node iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CameraPoll {
    /// Suggested sleep before the next iteration
    pub backoff_ms: u32,
    /// Media-path outcome, `None` while the pacer blocks
    pub media: Option<MediaEvent>,
    /// Control state forwarded to the drive MCU this iteration
    pub forwarded: Option<(ControlState, SendTrigger)>,
}

/// Probe-and-configure boot step for the capture device
///
/// Selects the session's capture configuration from the fast-memory probe
/// and applies it. An error here is configuration-fatal: the caller halts
/// the node, since a camera feed without an image source has no safe
/// degraded mode.
pub fn boot_camera<S: FrameSource>(
    source: &mut S,
    fast_memory: bool,
) -> Result<CaptureConfig, CaptureError> {
    let config = select_capture_config(fast_memory);
    source.configure(&config)?;
    Ok(config)
}

/// Inbound control handler for the link receive callback
///
/// Short and non-blocking: validate, then one guarded whole-value store.
/// A wrong-length or out-of-range payload is discarded and returned as an
/// error for logging; the store keeps the last good state, so a
/// partially-valid update is never applied. No notification is sent to
/// the peer.
pub fn handle_inbound_control(
    payload: &[u8],
    cell: &ControlCell,
) -> Result<ControlState, WireError> {
    let state = ControlState::decode(payload)?;
    cell.write(state);
    Ok(state)
}

/// The camera node's cooperative loop state
pub struct CameraNode<S, L, F>
where
    S: FrameSource,
    L: PacketLink,
    F: ControlForward,
{
    source: S,
    link: L,
    forward: F,
    peer: PeerAddress,
    pacer: TransmitPacer,
    gate: ControlDispatcher,
    stats: TxFrameStats,
    timing: TimingConfig,
}

impl<S, L, F> CameraNode<S, L, F>
where
    S: FrameSource,
    L: PacketLink,
    F: ControlForward,
{
    /// Build the node around an already-configured frame source
    pub fn new(source: S, link: L, forward: F, peer: PeerAddress, timing: TimingConfig) -> Self {
        Self {
            source,
            link,
            forward,
            peer,
            pacer: TransmitPacer::new(timing.frame_interval_ms),
            gate: ControlDispatcher::new(timing.heartbeat_ms),
            stats: TxFrameStats::new(),
            timing,
        }
    }

    /// Run one loop iteration at `now_ms`
    ///
    /// `control` is the store fed by the receive callback through
    /// [`handle_inbound_control`].
    pub fn poll(&mut self, control: &ControlCell, now_ms: u32) -> CameraPoll {
        let mut backoff_ms = 0;

        let media = if self.pacer.ready(now_ms) {
            match self.source.acquire() {
                Some(token) => {
                    let bytes = token.len();
                    let result = self.link.send(&self.peer, self.source.bytes(&token));
                    // The buffer goes back on every path, success or not
                    self.source.release(token);
                    match result {
                        Ok(()) => Some(MediaEvent::Sent {
                            bytes,
                            report: self.stats.record(bytes),
                        }),
                        Err(err) => Some(MediaEvent::SendFailed(err)),
                    }
                }
                None => {
                    backoff_ms = self.timing.capture_backoff_ms;
                    Some(MediaEvent::Stalled)
                }
            }
        } else {
            backoff_ms = self.timing.idle_backoff_ms;
            None
        };

        // Control path runs regardless of what the media path did, so a
        // stalled sensor cannot starve the drive output.
        let (snapshot, _updated) = control.read_and_clear();
        let forwarded = match self.gate.evaluate(&snapshot, now_ms) {
            Some(trigger) => {
                self.forward.forward(snapshot);
                self.gate.mark_sent(snapshot, now_ms);
                Some((snapshot, trigger))
            }
            None => None,
        };

        CameraPoll {
            backoff_ms,
            media,
            forwarded,
        }
    }

    /// Total frames sent this session
    pub fn frames_sent(&self) -> u32 {
        self.stats.sent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use opsis_protocol::Direction;

    use crate::traits::FrameToken;

    const PEER: PeerAddress = [0x80, 0xB5, 0x4E, 0xCD, 0x29, 0x20];

    /// Two-buffer fake camera with scripted readiness
    struct FakeCamera {
        ready: bool,
        outstanding: u8,
        max_outstanding_seen: u8,
        frame: [u8; 16],
    }

    impl FakeCamera {
        fn new() -> Self {
            Self {
                ready: true,
                outstanding: 0,
                max_outstanding_seen: 0,
                frame: [0xA5; 16],
            }
        }
    }

    impl FrameSource for FakeCamera {
        fn configure(&mut self, _config: &CaptureConfig) -> Result<(), CaptureError> {
            Ok(())
        }

        fn acquire(&mut self) -> Option<FrameToken> {
            if !self.ready || self.outstanding >= 2 {
                return None;
            }
            self.outstanding += 1;
            self.max_outstanding_seen = self.max_outstanding_seen.max(self.outstanding);
            Some(FrameToken::new(0, self.frame.len()))
        }

        fn bytes(&self, token: &FrameToken) -> &[u8] {
            &self.frame[..token.len()]
        }

        fn release(&mut self, _token: FrameToken) {
            self.outstanding -= 1;
        }
    }

    /// Link that records sends and fails on demand
    struct FakeLink {
        sent: u32,
        fail: bool,
    }

    impl PacketLink for FakeLink {
        fn max_payload(&self) -> usize {
            250
        }

        fn send(&mut self, peer: &PeerAddress, _payload: &[u8]) -> Result<(), LinkError> {
            assert_eq!(*peer, PEER);
            if self.fail {
                return Err(LinkError::Transmit);
            }
            self.sent += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeForward {
        lines: Vec<ControlState, 32>,
    }

    impl ControlForward for FakeForward {
        fn forward(&mut self, state: ControlState) {
            let _ = self.lines.push(state);
        }
    }

    fn node(fail_link: bool) -> CameraNode<FakeCamera, FakeLink, FakeForward> {
        CameraNode::new(
            FakeCamera::new(),
            FakeLink {
                sent: 0,
                fail: fail_link,
            },
            FakeForward::default(),
            PEER,
            TimingConfig::default(),
        )
    }

    #[test]
    fn test_boot_camera_applies_policy() {
        let mut camera = FakeCamera::new();
        let config = boot_camera(&mut camera, false).unwrap();
        assert_eq!(config.buffer_count, 2);
    }

    #[test]
    fn test_paced_send_releases_buffer() {
        let mut node = node(false);
        let cell = ControlCell::new();

        let poll = node.poll(&cell, 0);
        assert!(matches!(poll.media, Some(MediaEvent::Sent { bytes: 16, .. })));
        assert_eq!(node.source.outstanding, 0);
        assert_eq!(node.link.sent, 1);

        // Inside the pacing window nothing touches the source
        let poll = node.poll(&cell, 50);
        assert_eq!(poll.media, None);
        assert_eq!(poll.backoff_ms, 1);
    }

    #[test]
    fn test_failed_send_still_releases_buffer() {
        let mut node = node(true);
        let cell = ControlCell::new();

        let poll = node.poll(&cell, 0);
        assert_eq!(
            poll.media,
            Some(MediaEvent::SendFailed(LinkError::Transmit))
        );
        assert_eq!(node.source.outstanding, 0);
    }

    #[test]
    fn test_outstanding_buffers_never_exceed_pool() {
        let mut node = node(false);
        let cell = ControlCell::new();

        for i in 0..100u32 {
            node.poll(&cell, i * 120);
        }
        assert!(node.source.max_outstanding_seen <= 2);
        assert_eq!(node.source.outstanding, 0);
    }

    #[test]
    fn test_capture_stall_backs_off_without_blocking_control() {
        let mut node = node(false);
        node.source.ready = false;
        let cell = ControlCell::new();

        // Stall the sensor for 500 ms of 120 ms-paced polls while the
        // control heartbeat keeps its 200 ms cadence.
        let mut stalls = 0;
        let mut forwards = 0;
        for now in (0..=500).step_by(10) {
            let poll = node.poll(&cell, now);
            if poll.media == Some(MediaEvent::Stalled) {
                assert_eq!(poll.backoff_ms, 5);
                stalls += 1;
            }
            if poll.forwarded.is_some() {
                forwards += 1;
            }
        }
        assert!(stalls >= 4);
        // Heartbeats at t = 200 and t = 400 (baseline counts as t = 0)
        assert_eq!(forwards, 2);
    }

    #[test]
    fn test_control_change_forwards_immediately() {
        let mut node = node(false);
        let cell = ControlCell::new();

        handle_inbound_control(&[2, 0], &cell).unwrap();
        let poll = node.poll(&cell, 10);

        let (state, trigger) = poll.forwarded.unwrap();
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(trigger, SendTrigger::Change);
        assert_eq!(node.forward.lines.len(), 1);
    }

    #[test]
    fn test_wrong_length_packet_leaves_store_unchanged() {
        let cell = ControlCell::new();
        handle_inbound_control(&[2, 0], &cell).unwrap();
        cell.read_and_clear();

        assert_eq!(
            handle_inbound_control(&[1], &cell),
            Err(WireError::Length { got: 1 })
        );
        assert_eq!(
            handle_inbound_control(&[1, 0, 0], &cell),
            Err(WireError::Length { got: 3 })
        );

        let (state, updated) = cell.read_and_clear();
        assert!(!updated);
        assert_eq!(state.direction, Direction::Right);
    }
}
