//! Session configuration
//!
//! Tunables fixed at boot for the lifetime of the session. Defaults carry
//! the values proven on the reference hardware.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pacing and heartbeat intervals for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Minimum spacing between frame send attempts (soft ~8 fps ceiling)
    pub frame_interval_ms: u32,
    /// Maximum control-channel silence before a forced retransmission
    pub heartbeat_ms: u32,
    /// Backoff after the capture device reports no buffer ready
    pub capture_backoff_ms: u32,
    /// Yield when the pacer blocks a media iteration
    pub idle_backoff_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 120,
            heartbeat_ms: 200,
            capture_backoff_ms: 5,
            idle_backoff_ms: 1,
        }
    }
}

/// Button semantics for the deployment
///
/// Chosen per deployment and fixed for the session; mixing the two within
/// one session is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ButtonPolicy {
    /// Button field tracks the debounced level every sampling tick
    #[default]
    Level,
    /// Edge-latched: fires exactly once for the lifetime of the session
    OneShot,
}
