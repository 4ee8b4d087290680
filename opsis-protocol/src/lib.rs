//! Opsis Camera Link Wire Formats
//!
//! This crate defines the two payload formats exchanged over the ESP-NOW
//! datagram link between the camera node and the display node. The link
//! layer owns fragmentation, reassembly and per-datagram integrity; these
//! formats deliberately carry no version field and no checksum.
//!
//! # Control channel (display -> camera)
//!
//! Exactly 2 bytes:
//! ```text
//! ┌───────────┬────────┐
//! │ DIRECTION │ BUTTON │
//! │ i8, 1B    │ u8, 1B │
//! └───────────┴────────┘
//! ```
//!
//! `DIRECTION` is the quantized joystick reading in {-2,-1,0,1,2};
//! `BUTTON` is 0 or 1. Anything else is rejected on decode.
//!
//! # Media channel (camera -> display)
//!
//! One complete sensor-encoded JPEG byte stream per logical frame. The
//! length travels out-of-band in the receive callback; there is no
//! inter-frame header.

#![no_std]
#![deny(unsafe_code)]

pub mod control;
pub mod media;
pub mod peer;

pub use control::{ControlState, Direction, WireError, CONTROL_WIRE_LEN};
pub use media::{check_frame_len, MediaError, MAX_FRAME_LEN};
pub use peer::PeerAddress;
