//! Companion-channel diagnostics
//!
//! Best-effort observational counters behind the serial status channel:
//! frame byte counts, fps, and the forwarded drive line. None of this is
//! part of the correctness contract.

use core::fmt::Write;

use heapless::String;

use opsis_protocol::ControlState;

/// Frames between transmit-side byte-count reports
const TX_REPORT_EVERY: u32 = 5;

/// Receive-side fps report, one per elapsed second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FpsReport {
    /// Frames rendered in the last window
    pub fps: u32,
    /// Byte length of the most recent frame
    pub last_frame_bytes: usize,
}

/// Frames-per-second meter over a fixed 1 s window
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_start_ms: u32,
    frames: u32,
    started: bool,
}

impl FpsMeter {
    pub const fn new() -> Self {
        Self {
            window_start_ms: 0,
            frames: 0,
            started: false,
        }
    }

    /// Count one rendered frame; returns a report when the window closes
    pub fn record(&mut self, now_ms: u32, frame_bytes: usize) -> Option<FpsReport> {
        if !self.started {
            self.started = true;
            self.window_start_ms = now_ms;
        }
        self.frames += 1;

        if now_ms.wrapping_sub(self.window_start_ms) >= 1000 {
            let report = FpsReport {
                fps: self.frames,
                last_frame_bytes: frame_bytes,
            };
            self.frames = 0;
            self.window_start_ms = now_ms;
            return Some(report);
        }
        None
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Transmit-side media counters
#[derive(Debug, Clone, Default)]
pub struct TxFrameStats {
    sent: u32,
}

impl TxFrameStats {
    pub const fn new() -> Self {
        Self { sent: 0 }
    }

    /// Count one sent frame; reports the byte count every few frames
    pub fn record(&mut self, frame_bytes: usize) -> Option<usize> {
        self.sent += 1;
        if self.sent % TX_REPORT_EVERY == 0 {
            Some(frame_bytes)
        } else {
            None
        }
    }

    /// Total frames sent this session
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

/// Format the drive line forwarded to the vehicle MCU
///
/// Plain `"direction,button"` text, newline-terminated, e.g. `"2,0\n"` for
/// RIGHT with the button released.
pub fn format_drive_line(state: &ControlState) -> String<8> {
    let mut line = String::new();
    let _ = write!(
        line,
        "{},{}\n",
        state.direction.as_i8(),
        state.pressed as u8
    );
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsis_protocol::Direction;

    #[test]
    fn test_fps_meter_reports_once_per_second() {
        let mut meter = FpsMeter::new();

        // 8 frames over the first second
        for i in 0..8 {
            assert_eq!(meter.record(i * 125, 12_000), None);
        }
        let report = meter.record(1000, 12_345).unwrap();
        assert_eq!(report.fps, 9);
        assert_eq!(report.last_frame_bytes, 12_345);

        // Window restarts cleanly
        assert_eq!(meter.record(1100, 10_000), None);
    }

    #[test]
    fn test_tx_stats_report_every_fifth_frame() {
        let mut stats = TxFrameStats::new();
        for i in 1..=4 {
            assert_eq!(stats.record(1000 + i), None);
        }
        assert_eq!(stats.record(1005), Some(1005));
        for i in 6..=9 {
            assert_eq!(stats.record(1000 + i), None);
        }
        assert_eq!(stats.record(1010), Some(1010));
        assert_eq!(stats.sent(), 10);
    }

    #[test]
    fn test_drive_line_format() {
        let line = format_drive_line(&ControlState {
            direction: Direction::Right,
            pressed: false,
        });
        assert_eq!(line.as_str(), "2,0\n");

        let line = format_drive_line(&ControlState {
            direction: Direction::Left,
            pressed: true,
        });
        assert_eq!(line.as_str(), "-2,1\n");
    }
}
