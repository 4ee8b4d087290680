//! Joystick quantization
//!
//! Collapses the raw 12-bit ADC pair into the five drive directions. The
//! dead band is asymmetric because the reference stick does not center
//! electrically; thresholds were measured on hardware. When both axes are
//! deflected the Y decision wins, preserving the drive behavior the
//! vehicle was tuned with.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use opsis_protocol::Direction;

use crate::traits::RawAxes;

/// Dead-band thresholds in raw ADC counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisThresholds {
    pub x_low: u16,
    pub x_high: u16,
    pub y_low: u16,
    pub y_high: u16,
}

impl Default for AxisThresholds {
    fn default() -> Self {
        Self {
            x_low: 1650,
            x_high: 2150,
            y_low: 1660,
            y_high: 2260,
        }
    }
}

/// Quantize one joystick sample into a drive direction
pub fn quantize_direction(axes: RawAxes, thresholds: &AxisThresholds) -> Direction {
    let mut direction = Direction::Center;

    if axes.x < thresholds.x_low {
        direction = Direction::Left;
    } else if axes.x > thresholds.x_high {
        direction = Direction::Right;
    }

    // Y overrides X when both are out of band
    if axes.y < thresholds.y_low {
        direction = Direction::Down;
    } else if axes.y > thresholds.y_high {
        direction = Direction::Up;
    }

    direction
}
