//! Cooperative node loops
//!
//! One `poll(now_ms)` step per loop iteration, non-blocking by
//! construction: every step returns a report for the firmware to log plus
//! a backoff hint to sleep before the next iteration. There is no
//! cancellation; an iteration always runs to completion.

pub mod camera;
pub mod display;

pub use camera::{boot_camera, handle_inbound_control, CameraNode, CameraPoll, MediaEvent};
pub use display::{handle_inbound_frame, DisplayNode, DisplayPoll, FrameRxError};
