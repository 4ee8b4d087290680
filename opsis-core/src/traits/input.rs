//! Local input traits for the display node

/// One raw joystick sample (12-bit ADC counts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawAxes {
    pub x: u16,
    pub y: u16,
}

/// Analog joystick read every control-sampling tick
pub trait Joystick {
    /// Read both axes
    fn read(&mut self) -> RawAxes;
}

/// Raw digital button level
///
/// Implementations map the electrical level to logical pressed/released
/// (the reference hardware is active-low with an internal pull-up).
pub trait ButtonProbe {
    /// True while the button is physically held down
    fn is_pressed(&mut self) -> bool;
}
