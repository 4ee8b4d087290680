//! Packet link and control forwarding traits
//!
//! The radio transport is consumed purely as a datagram primitive: a
//! synchronous send with a length limit, plus a receive callback that the
//! firmware wires to the inbound handlers in [`crate::node`]. Fragmentation,
//! reassembly and retries belong to the transport.

use opsis_protocol::{ControlState, PeerAddress};

/// Errors from a send attempt
///
/// Failures are logged by the caller and never retried synchronously; the
/// next pacing or dispatch cycle retries naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Payload exceeds the transport's length limit
    Oversize { got: usize, max: usize },
    /// The peer is not registered or the radio is not ready
    NotReady,
    /// The transport reported a transmit failure
    Transmit,
}

/// Unreliable datagram transport between the two nodes
pub trait PacketLink {
    /// Largest payload `send` accepts, in bytes
    fn max_payload(&self) -> usize;

    /// Send one datagram to `peer`
    fn send(&mut self, peer: &PeerAddress, payload: &[u8]) -> Result<(), LinkError>;
}

/// Outbound drive-command channel on the camera node
///
/// The camera node forwards the accepted control state to the vehicle MCU
/// over a secondary serial port as a `"direction,button"` text line (see
/// [`crate::diag::format_drive_line`]). Best-effort: a dropped line is
/// replaced by the next heartbeat.
pub trait ControlForward {
    /// Forward one control state to the drive MCU
    fn forward(&mut self, state: ControlState);
}
