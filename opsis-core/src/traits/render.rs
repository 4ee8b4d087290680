//! Frame render sink trait for the display node

/// Errors from handing a frame to the display driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// The driver could not decode the JPEG stream
    Decode,
    /// The driver is mid-flush and cannot take a frame now
    Busy,
}

/// Consumes validated JPEG frames for display
///
/// JPEG decoding and panel writes belong to the display driver; this trait
/// only delivers the validated byte stream. A failed render drops the
/// frame and keeps the previous image on screen.
pub trait FrameSink {
    /// Decode and display one complete JPEG frame
    fn render_jpeg(&mut self, jpeg: &[u8]) -> Result<(), RenderError>;
}
