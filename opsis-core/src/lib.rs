//! Board-agnostic pipeline logic for the Opsis camera link
//!
//! This crate contains everything the two nodes do that does not depend on
//! specific hardware:
//!
//! - Hardware abstraction traits (frame source, packet link, joystick,
//!   button probe, frame sink)
//! - Capacity-aware capture policy (boot-time configuration table)
//! - Transmit pacing for the media path
//! - Control-state store shared between receive callback and main loop
//! - Change/heartbeat dispatch for the control channel
//! - Level and one-shot button debouncing
//! - The cooperative node loops for the camera and display nodes
//!
//! Pin maps, sensor bring-up and the ESP-NOW driver live in the firmware
//! crates and reach this logic only through the traits.

#![no_std]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod control;
pub mod diag;
pub mod node;
pub mod traits;
