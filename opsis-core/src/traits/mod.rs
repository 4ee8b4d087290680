//! Hardware abstraction traits
//!
//! These traits define the interface between the node loops and the
//! hardware-specific implementations (camera sensor driver, ESP-NOW
//! transport, ADC joystick, display driver).

pub mod camera;
pub mod input;
pub mod link;
pub mod render;

pub use camera::{CaptureError, FrameSource, FrameToken};
pub use input::{ButtonProbe, Joystick, RawAxes};
pub use link::{ControlForward, LinkError, PacketLink};
pub use render::{FrameSink, RenderError};
