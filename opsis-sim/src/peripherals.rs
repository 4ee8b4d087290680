//! Simulated peripherals
//!
//! Host-side stand-ins for the sensor, joystick, button, render target,
//! and drive serial line, all driven by the shared virtual clock.

use std::cell::Cell;
use std::rc::Rc;

use rand_core::RngCore;
use rand_wyrand::WyRand;
use tracing::{debug, info, warn};

use opsis_core::capture::CaptureConfig;
use opsis_core::control::{LatchedButton, LevelButton, OneShotLatch};
use opsis_core::control::debounce::ButtonSource;
use opsis_core::diag::format_drive_line;
use opsis_core::traits::{
    ButtonProbe, CaptureError, ControlForward, FrameSink, FrameSource, FrameToken, Joystick,
    RawAxes, RenderError,
};
use opsis_protocol::ControlState;

use crate::config::{CameraConfig, InputConfig, StickWaypoint};

/// Shared virtual millisecond clock
pub type Clock = Rc<Cell<u32>>;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Synthetic capture device with a fixed two-buffer pool
///
/// Frame sizes jitter around the configured nominal length; a scripted
/// stall window reports no buffer ready, like a sensor that has fallen
/// behind.
pub struct SimCamera {
    config: CameraConfig,
    clock: Clock,
    rng: WyRand,
    buffers: Vec<Vec<u8>>,
    in_use: Vec<bool>,
}

impl SimCamera {
    pub fn new(config: CameraConfig, clock: Clock, rng: WyRand) -> Self {
        Self {
            config,
            clock,
            rng,
            buffers: vec![Vec::new(); 2],
            in_use: vec![false; 2],
        }
    }

    fn stalled(&self) -> bool {
        match self.config.stall_at_ms {
            Some(at) => {
                let now = self.clock.get();
                now >= at && now < at.saturating_add(self.config.stall_for_ms)
            }
            None => false,
        }
    }

    fn next_frame_len(&mut self) -> usize {
        let jitter = self.config.jitter_bytes;
        let base = self.config.frame_bytes.max(JPEG_SOI.len() + JPEG_EOI.len());
        if jitter == 0 {
            return base;
        }
        let offset = (self.rng.next_u64() as usize) % (2 * jitter);
        (base.saturating_sub(jitter) + offset).max(JPEG_SOI.len() + JPEG_EOI.len())
    }
}

impl FrameSource for SimCamera {
    fn configure(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        let pool = config.buffer_count as usize;
        self.buffers = vec![Vec::new(); pool];
        self.in_use = vec![false; pool];

        let (width, height) = config.frame_size.dimensions();
        info!(
            width,
            height,
            quality = config.jpeg_quality,
            buffers = config.buffer_count,
            "capture configured"
        );
        Ok(())
    }

    fn acquire(&mut self) -> Option<FrameToken> {
        if self.stalled() {
            return None;
        }
        let slot = self.in_use.iter().position(|used| !used)?;
        let len = self.next_frame_len();

        let buffer = &mut self.buffers[slot];
        buffer.clear();
        buffer.extend_from_slice(&JPEG_SOI);
        buffer.resize(len - JPEG_EOI.len(), 0x5A);
        buffer.extend_from_slice(&JPEG_EOI);

        self.in_use[slot] = true;
        Some(FrameToken::new(slot as u8, buffer.len()))
    }

    fn bytes(&self, token: &FrameToken) -> &[u8] {
        &self.buffers[token.index() as usize][..token.len()]
    }

    fn release(&mut self, token: FrameToken) {
        self.in_use[token.index() as usize] = false;
    }
}

/// Joystick replaying the configured waypoints
pub struct ScriptedStick {
    script: Vec<StickWaypoint>,
    clock: Clock,
}

impl ScriptedStick {
    pub fn new(mut script: Vec<StickWaypoint>, clock: Clock) -> Self {
        script.sort_by_key(|w| w.at_ms);
        Self { script, clock }
    }
}

impl Joystick for ScriptedStick {
    fn read(&mut self) -> RawAxes {
        let now = self.clock.get();
        self.script
            .iter()
            .rev()
            .find(|w| w.at_ms <= now)
            .map(|w| RawAxes { x: w.x, y: w.y })
            .unwrap_or(RawAxes { x: 2048, y: 2048 })
    }
}

/// Raw button line for the level policy, held between the scripted press
/// and release times
pub struct ScriptedProbe {
    press_at_ms: Option<u32>,
    release_at_ms: Option<u32>,
    clock: Clock,
}

impl ButtonProbe for ScriptedProbe {
    fn is_pressed(&mut self) -> bool {
        let now = self.clock.get();
        match self.press_at_ms {
            Some(press) => now >= press && self.release_at_ms.map_or(true, |r| now < r),
            None => false,
        }
    }
}

/// Runtime choice between the two button policies
pub enum SimButton<'a> {
    Level(LevelButton<ScriptedProbe>),
    OneShot(LatchedButton<'a>),
}

impl SimButton<'_> {
    pub fn level(input: &InputConfig, clock: Clock) -> Self {
        SimButton::Level(LevelButton::new(ScriptedProbe {
            press_at_ms: input.press_at_ms,
            release_at_ms: input.release_at_ms,
            clock,
        }))
    }

    pub fn one_shot(latch: &OneShotLatch) -> SimButton<'_> {
        SimButton::OneShot(LatchedButton::new(latch))
    }
}

impl ButtonSource for SimButton<'_> {
    fn sample(&mut self) -> bool {
        match self {
            SimButton::Level(button) => button.sample(),
            SimButton::OneShot(button) => button.sample(),
        }
    }
}

/// Render target that validates the JPEG wrapper and counts frames
#[derive(Default)]
pub struct ConsoleSink {
    pub rendered: u64,
    pub rejected: u64,
}

impl FrameSink for ConsoleSink {
    fn render_jpeg(&mut self, jpeg: &[u8]) -> Result<(), RenderError> {
        if !jpeg.starts_with(&JPEG_SOI) || !jpeg.ends_with(&JPEG_EOI) {
            self.rejected += 1;
            warn!(bytes = jpeg.len(), "undecodable frame dropped");
            return Err(RenderError::Decode);
        }
        self.rendered += 1;
        debug!(bytes = jpeg.len(), "frame rendered");
        Ok(())
    }
}

/// Drive serial line on the camera node; prints what the vehicle MCU
/// would receive
pub struct DriveSerial {
    lines: Rc<Cell<u64>>,
}

impl DriveSerial {
    pub fn new(lines: Rc<Cell<u64>>) -> Self {
        Self { lines }
    }
}

impl ControlForward for DriveSerial {
    fn forward(&mut self, state: ControlState) {
        self.lines.set(self.lines.get() + 1);
        let line = format_drive_line(&state);
        info!(line = line.trim_end(), "drive");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::SeedableRng;

    use crate::config::CameraConfig;

    fn camera(config: CameraConfig, clock: Clock) -> SimCamera {
        SimCamera::new(config, clock, WyRand::seed_from_u64(1))
    }

    #[test]
    fn test_sim_camera_frames_carry_jpeg_markers() {
        let clock = Clock::default();
        let mut camera = camera(CameraConfig::default(), clock);

        let token = camera.acquire().unwrap();
        let bytes = camera.bytes(&token);
        assert!(bytes.starts_with(&JPEG_SOI));
        assert!(bytes.ends_with(&JPEG_EOI));
        camera.release(token);
    }

    #[test]
    fn test_sim_camera_pool_is_bounded() {
        let clock = Clock::default();
        let mut camera = camera(CameraConfig::default(), clock);

        let first = camera.acquire().unwrap();
        let second = camera.acquire().unwrap();
        assert!(camera.acquire().is_none());

        camera.release(first);
        let third = camera.acquire().unwrap();
        camera.release(second);
        camera.release(third);
    }

    #[test]
    fn test_sim_camera_stall_window() {
        let clock = Clock::default();
        let mut camera = camera(
            CameraConfig {
                stall_at_ms: Some(100),
                stall_for_ms: 50,
                ..CameraConfig::default()
            },
            clock.clone(),
        );

        clock.set(99);
        assert!(camera.acquire().is_some());
        clock.set(120);
        assert!(camera.acquire().is_none());
        clock.set(150);
        assert!(camera.acquire().is_some());
    }

    #[test]
    fn test_scripted_stick_holds_last_waypoint() {
        let clock = Clock::default();
        let mut stick = ScriptedStick::new(
            vec![
                StickWaypoint {
                    at_ms: 100,
                    x: 2600,
                    y: 2000,
                },
                StickWaypoint {
                    at_ms: 0,
                    x: 1900,
                    y: 2000,
                },
            ],
            clock.clone(),
        );

        assert_eq!(stick.read().x, 1900);
        clock.set(100);
        assert_eq!(stick.read().x, 2600);
        clock.set(9_999);
        assert_eq!(stick.read().x, 2600);
    }

    #[test]
    fn test_console_sink_rejects_missing_markers() {
        let mut sink = ConsoleSink::default();
        assert_eq!(sink.render_jpeg(&[0u8; 64]), Err(RenderError::Decode));
        assert_eq!(sink.rejected, 1);
        assert_eq!(sink.rendered, 0);
    }
}
