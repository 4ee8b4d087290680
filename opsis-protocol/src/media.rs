//! Media channel payload validation.
//!
//! A media datagram carries one complete JPEG byte stream; the length
//! arrives out-of-band from the link layer. The display node sizes its
//! receive buffer once at boot and rejects anything that cannot fit.

/// Default receive buffer capacity on the display node (96 KiB)
///
/// Sized for the worst observed HVGA frame with plenty of headroom.
pub const MAX_FRAME_LEN: usize = 96 * 1024;

/// Reasons an inbound media payload is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MediaError {
    /// Zero-length payload
    Empty,
    /// Payload longer than the receive buffer
    Oversize { got: usize, max: usize },
}

/// Validate an inbound media payload length against a buffer capacity
///
/// A rejected frame is dropped; the previously rendered frame stays on
/// screen.
pub fn check_frame_len(len: usize, capacity: usize) -> Result<(), MediaError> {
    if len == 0 {
        return Err(MediaError::Empty);
    }
    if len > capacity {
        return Err(MediaError::Oversize {
            got: len,
            max: capacity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(check_frame_len(0, MAX_FRAME_LEN), Err(MediaError::Empty));
    }

    #[test]
    fn test_rejects_oversize() {
        assert_eq!(
            check_frame_len(MAX_FRAME_LEN + 1, MAX_FRAME_LEN),
            Err(MediaError::Oversize {
                got: MAX_FRAME_LEN + 1,
                max: MAX_FRAME_LEN,
            })
        );
    }

    #[test]
    fn test_accepts_boundary() {
        assert_eq!(check_frame_len(1, MAX_FRAME_LEN), Ok(()));
        assert_eq!(check_frame_len(MAX_FRAME_LEN, MAX_FRAME_LEN), Ok(()));
    }
}
