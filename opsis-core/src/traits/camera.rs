//! Frame source trait
//!
//! Abstracts the camera driver: a bounded pool of sensor-filled JPEG
//! buffers that must be handed back after every send attempt. Buffer-pool
//! exhaustion from a missing release is the dominant failure mode of the
//! media path, so acquisition is expressed through a move-only token that
//! can be released exactly once.

use crate::capture::CaptureConfig;

/// Errors from camera configuration
///
/// Configuration failures are fatal for the session: a camera feed with no
/// image source has no safe degraded mode, so the firmware halts rather
/// than continue. This crate only reports the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureError {
    /// The capture device did not respond to configuration
    NoResponse,
    /// The capture device rejected the configuration
    Rejected(u32),
}

/// Handle to one acquired frame buffer
///
/// Move-only: the only way to dispose of a token is
/// [`FrameSource::release`], which consumes it. Holding a token counts
/// against the configured buffer count.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameToken {
    index: u8,
    len: usize,
}

impl FrameToken {
    /// Create a token for buffer `index` holding `len` encoded bytes
    ///
    /// Called by [`FrameSource`] implementations only.
    pub const fn new(index: u8, len: usize) -> Self {
        Self { index, len }
    }

    /// Buffer slot this token refers to
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Encoded frame length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a zero-length frame (not expected from a healthy sensor)
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A capture device producing already-encoded JPEG frames
///
/// Owned solely by the camera node's main loop; implementations do not
/// need to be interrupt-safe.
pub trait FrameSource {
    /// Apply the boot-time capture configuration
    ///
    /// Called exactly once before the first `acquire`. An error here is
    /// configuration-fatal (see [`CaptureError`]).
    fn configure(&mut self, config: &CaptureConfig) -> Result<(), CaptureError>;

    /// Try to acquire the next ready frame
    ///
    /// `None` means no buffer is currently filled. That is an expected
    /// transient under load, not a failure; the caller backs off a few
    /// milliseconds instead of spinning.
    fn acquire(&mut self) -> Option<FrameToken>;

    /// Borrow the encoded bytes of an acquired frame
    fn bytes(&self, token: &FrameToken) -> &[u8];

    /// Return a frame buffer to the pool
    ///
    /// Must be called exactly once per acquired token, on every code path,
    /// including after a failed send.
    fn release(&mut self, token: FrameToken);
}
