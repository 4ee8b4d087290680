//! Media-path capture policy and pacing

pub mod pacer;
pub mod policy;

pub use pacer::TransmitPacer;
pub use policy::{select_capture_config, BufferTier, CaptureConfig, FrameSize};
