//! Capacity-aware capture policy
//!
//! The camera node probes once at boot for external fast memory (PSRAM)
//! and picks one row of a fixed decision table. The resulting
//! configuration is immutable for the session; there is no dynamic
//! quality adaptation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Conservative, stable sensor clock for both table rows
pub const XCLK_HZ: u32 = 10_000_000;

/// Sensor output resolution tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrameSize {
    /// 160x120
    Qqvga,
    /// 320x240
    Qvga,
    /// 480x320
    Hvga,
    /// 640x480
    Vga,
}

impl FrameSize {
    /// Pixel dimensions (width, height)
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            FrameSize::Qqvga => (160, 120),
            FrameSize::Qvga => (320, 240),
            FrameSize::Hvga => (480, 320),
            FrameSize::Vga => (640, 480),
        }
    }
}

/// Which memory tier holds the frame buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BufferTier {
    /// External PSRAM: large but slower
    Fast,
    /// Internal DRAM: scarce, so buffers stay small
    Slow,
}

/// One session's capture configuration
///
/// Selected once at boot by [`select_capture_config`] and applied through
/// [`crate::traits::FrameSource::configure`]; immutable afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaptureConfig {
    pub frame_size: FrameSize,
    /// Sensor JPEG quality; lower is better quality and larger frames
    pub jpeg_quality: u8,
    /// Hard capacity of the frame buffer pool
    pub buffer_count: u8,
    pub buffer_tier: BufferTier,
    pub xclk_hz: u32,
}

/// Pick the capture configuration for this boot
///
/// With fast memory present there is room for a higher resolution tier and
/// an extra buffer of headroom. Without it the configuration falls back to
/// double-buffered QVGA in internal memory with heavier compression.
pub fn select_capture_config(fast_memory: bool) -> CaptureConfig {
    if fast_memory {
        CaptureConfig {
            frame_size: FrameSize::Hvga,
            jpeg_quality: 20,
            buffer_count: 3,
            buffer_tier: BufferTier::Fast,
            xclk_hz: XCLK_HZ,
        }
    } else {
        CaptureConfig {
            frame_size: FrameSize::Qvga,
            jpeg_quality: 30,
            buffer_count: 2,
            buffer_tier: BufferTier::Slow,
            xclk_hz: XCLK_HZ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_memory_row() {
        let config = select_capture_config(true);
        assert_eq!(config.frame_size, FrameSize::Hvga);
        assert_eq!(config.jpeg_quality, 20);
        assert_eq!(config.buffer_count, 3);
        assert_eq!(config.buffer_tier, BufferTier::Fast);
    }

    #[test]
    fn test_slow_memory_row_is_double_buffered() {
        let config = select_capture_config(false);
        assert_eq!(config.frame_size, FrameSize::Qvga);
        assert_eq!(config.buffer_count, 2);
        assert_eq!(config.buffer_tier, BufferTier::Slow);
    }

    #[test]
    fn test_both_rows_share_the_conservative_clock() {
        assert_eq!(select_capture_config(true).xclk_hz, XCLK_HZ);
        assert_eq!(select_capture_config(false).xclk_hz, XCLK_HZ);
    }

    #[test]
    fn test_slow_row_resolution_fits_the_panel() {
        // The receiving panel is 320x240; the fallback tier matches it
        let (w, h) = select_capture_config(false).frame_size.dimensions();
        assert_eq!((w, h), (320, 240));
    }
}
