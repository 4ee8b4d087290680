//! Control channel logic
//!
//! Everything between the physical joystick/button and the 2-byte control
//! payload: quantization, debouncing, the shared latest-value store, and
//! change/heartbeat dispatch.

pub mod debounce;
pub mod dispatch;
pub mod quantize;
pub mod store;

pub use debounce::{ButtonSource, LatchedButton, LevelButton, OneShotLatch};
pub use dispatch::{ControlDispatcher, SendTrigger};
pub use quantize::{quantize_direction, AxisThresholds};
pub use store::ControlCell;
