//! Control channel payload: the quantized remote-control reading.
//!
//! The control state is the sole payload of the control channel. It is
//! recreated on every sampling tick by the display node and overwrites the
//! camera node's last-accepted copy; stale intermediate samples are
//! intentionally dropped in favor of latency.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of an encoded control payload in bytes
pub const CONTROL_WIRE_LEN: usize = 2;

/// Errors raised while decoding an inbound control payload
///
/// A failed decode must leave the receiver's last good control state
/// untouched; a partially-valid update is never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Payload length is not [`CONTROL_WIRE_LEN`]
    Length { got: usize },
    /// Direction byte outside {-2..2}
    Direction(i8),
    /// Button byte outside {0, 1}
    Button(u8),
}

/// Quantized joystick direction
///
/// The five values match the drive commands the vehicle MCU understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(i8)]
pub enum Direction {
    Left = -2,
    Down = -1,
    #[default]
    Center = 0,
    Up = 1,
    Right = 2,
}

impl Direction {
    /// Wire representation (signed byte)
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Parse from the wire byte, rejecting out-of-range values
    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -2 => Some(Direction::Left),
            -1 => Some(Direction::Down),
            0 => Some(Direction::Center),
            1 => Some(Direction::Up),
            2 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// The 2-field remote-control reading exchanged on the control channel
///
/// Trivially copyable; transmitted verbatim as the wire payload through
/// [`ControlState::encode`] / [`ControlState::decode`], never via memory
/// reinterpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlState {
    /// Quantized joystick direction
    pub direction: Direction,
    /// Button pressed this sample
    pub pressed: bool,
}

impl ControlState {
    /// Centered stick, button released
    pub const fn neutral() -> Self {
        Self {
            direction: Direction::Center,
            pressed: false,
        }
    }

    /// Encode into the fixed 2-byte wire form
    pub fn encode(&self) -> [u8; CONTROL_WIRE_LEN] {
        [self.direction.as_i8() as u8, self.pressed as u8]
    }

    /// Decode and validate an inbound payload
    ///
    /// Rejects wrong lengths before touching the field bytes, then rejects
    /// out-of-range field values.
    pub fn decode(payload: &[u8]) -> Result<Self, WireError> {
        if payload.len() != CONTROL_WIRE_LEN {
            return Err(WireError::Length { got: payload.len() });
        }

        let raw_direction = payload[0] as i8;
        let direction =
            Direction::from_i8(raw_direction).ok_or(WireError::Direction(raw_direction))?;

        let pressed = match payload[1] {
            0 => false,
            1 => true,
            other => return Err(WireError::Button(other)),
        };

        Ok(Self { direction, pressed })
    }
}
