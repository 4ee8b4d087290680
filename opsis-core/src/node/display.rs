//! Display node loop
//!
//! Outbound: sample the joystick and button every iteration, quantize,
//! and let the change/heartbeat dispatcher decide whether the 2-byte
//! control payload goes out. Inbound: validate each received media
//! datagram and hand the JPEG to the render sink.

use opsis_protocol::{check_frame_len, ControlState, MediaError, PeerAddress};

use crate::config::TimingConfig;
use crate::control::{quantize_direction, AxisThresholds, ControlDispatcher, SendTrigger};
use crate::control::debounce::ButtonSource;
use crate::diag::{FpsMeter, FpsReport};
use crate::traits::{FrameSink, Joystick, LinkError, PacketLink, RenderError};

/// Why an inbound media datagram was not rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameRxError {
    /// Rejected before touching the sink (empty or oversize)
    Media(MediaError),
    /// The display driver refused the frame
    Render(RenderError),
}

impl From<MediaError> for FrameRxError {
    fn from(err: MediaError) -> Self {
        FrameRxError::Media(err)
    }
}

impl From<RenderError> for FrameRxError {
    fn from(err: RenderError) -> Self {
        FrameRxError::Render(err)
    }
}

/// Inbound media handler for the link's frame-ready callback
///
/// Validates the out-of-band length against the receive capacity before
/// the sink sees the bytes; a rejected or undecodable frame is dropped
/// and the previous image stays on screen. The sink decodes, so this must
/// be invoked from the transport's task-level callback, never from a hard
/// ISR.
pub fn handle_inbound_frame<K: FrameSink>(
    payload: &[u8],
    capacity: usize,
    sink: &mut K,
    meter: &mut FpsMeter,
    now_ms: u32,
) -> Result<Option<FpsReport>, FrameRxError> {
    check_frame_len(payload.len(), capacity)?;
    sink.render_jpeg(payload)?;
    Ok(meter.record(now_ms, payload.len()))
}

/// Report of one display-node iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayPoll {
    /// The control state sampled this iteration
    pub sampled: ControlState,
    /// Set when the dispatcher transmitted (or tried to)
    pub sent: Option<SendTrigger>,
    /// Set when the link rejected the transmission
    pub send_error: Option<LinkError>,
}

/// The display node's cooperative loop state
pub struct DisplayNode<J, B, L>
where
    J: Joystick,
    B: ButtonSource,
    L: PacketLink,
{
    joystick: J,
    button: B,
    link: L,
    peer: PeerAddress,
    thresholds: AxisThresholds,
    dispatcher: ControlDispatcher,
}

impl<J, B, L> DisplayNode<J, B, L>
where
    J: Joystick,
    B: ButtonSource,
    L: PacketLink,
{
    /// Build the node; `button` carries the deployment's button policy
    pub fn new(
        joystick: J,
        button: B,
        link: L,
        peer: PeerAddress,
        thresholds: AxisThresholds,
        timing: TimingConfig,
    ) -> Self {
        Self {
            joystick,
            button,
            link,
            peer,
            thresholds,
            dispatcher: ControlDispatcher::new(timing.heartbeat_ms),
        }
    }

    /// Run one control-sampling iteration at `now_ms`
    pub fn poll(&mut self, now_ms: u32) -> DisplayPoll {
        let axes = self.joystick.read();
        let sampled = ControlState {
            direction: quantize_direction(axes, &self.thresholds),
            pressed: self.button.sample(),
        };

        let mut send_error = None;
        let sent = match self.dispatcher.evaluate(&sampled, now_ms) {
            Some(trigger) => {
                if let Err(err) = self.link.send(&self.peer, &sampled.encode()) {
                    send_error = Some(err);
                }
                // Recorded regardless of link status; the heartbeat
                // bounds the retry
                self.dispatcher.mark_sent(sampled, now_ms);
                Some(trigger)
            }
            None => None,
        };

        DisplayPoll {
            sampled,
            sent,
            send_error,
        }
    }
}
