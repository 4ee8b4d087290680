//! Simulation configuration
//!
//! Loaded from a TOML file; every section and field has a default, so an
//! empty file (or no file at all) runs a sensible scenario.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use opsis_core::config::{ButtonPolicy, TimingConfig};

/// Top-level simulation configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub input: InputConfig,
    /// Node timing; defaults to the reference-hardware values
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Run length and determinism
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Virtual milliseconds to simulate
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,

    /// Seed for every random stream in the run
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// In-memory transport behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    /// Percentage of datagrams dropped in flight
    #[serde(default = "default_loss_percent")]
    pub loss_percent: u8,

    /// Percentage of control datagrams delivered truncated
    #[serde(default)]
    pub corrupt_percent: u8,
}

/// Synthetic capture device
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Nominal encoded frame size
    #[serde(default = "default_frame_bytes")]
    pub frame_bytes: usize,

    /// Uniform size jitter applied per frame
    #[serde(default = "default_jitter_bytes")]
    pub jitter_bytes: usize,

    /// Report fast external memory at the capacity probe
    #[serde(default = "default_true")]
    pub fast_memory: bool,

    /// Scripted capture stall: no buffers from `stall_at_ms` on
    #[serde(default)]
    pub stall_at_ms: Option<u32>,

    /// Length of the scripted stall
    #[serde(default = "default_stall_for_ms")]
    pub stall_for_ms: u32,
}

/// Scripted operator input on the display node
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Button semantics for the run
    #[serde(default)]
    pub button: ButtonPolicy,

    /// Press the button at this virtual time
    #[serde(default)]
    pub press_at_ms: Option<u32>,

    /// Release again (level policy only)
    #[serde(default)]
    pub release_at_ms: Option<u32>,

    /// Stick waypoints, applied in order of `at_ms`
    #[serde(default = "default_stick_script")]
    pub stick: Vec<StickWaypoint>,
}

/// One scripted stick position, held until the next waypoint
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StickWaypoint {
    pub at_ms: u32,
    pub x: u16,
    pub y: u16,
}

fn default_duration_ms() -> u32 {
    5_000
}

fn default_seed() -> u64 {
    0x6F70_7369 // "opsi"
}

fn default_loss_percent() -> u8 {
    5
}

fn default_frame_bytes() -> usize {
    12_000
}

fn default_jitter_bytes() -> usize {
    3_000
}

fn default_true() -> bool {
    true
}

fn default_stall_for_ms() -> u32 {
    500
}

fn default_stick_script() -> Vec<StickWaypoint> {
    vec![
        StickWaypoint {
            at_ms: 0,
            x: 1900,
            y: 2000,
        },
        StickWaypoint {
            at_ms: 1_000,
            x: 2600,
            y: 2000,
        },
        StickWaypoint {
            at_ms: 2_000,
            x: 1900,
            y: 2900,
        },
        StickWaypoint {
            at_ms: 3_000,
            x: 1900,
            y: 2000,
        },
    ]
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            seed: default_seed(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            loss_percent: default_loss_percent(),
            corrupt_percent: 0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_bytes: default_frame_bytes(),
            jitter_bytes: default_jitter_bytes(),
            fast_memory: true,
            stall_at_ms: None,
            stall_for_ms: default_stall_for_ms(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            button: ButtonPolicy::default(),
            press_at_ms: None,
            release_at_ms: None,
            stick: default_stick_script(),
        }
    }
}

impl SimConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}
