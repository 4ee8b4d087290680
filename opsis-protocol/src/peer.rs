//! Link-layer peer addressing.
//!
//! ESP-NOW addresses peers by their 6-byte station MAC. The address is
//! configured once per node at boot; there is no multi-peer addressing.

use core::fmt::Write;

use heapless::String;

/// 6-byte link-layer identifier of the remote node
pub type PeerAddress = [u8; 6];

/// Render a peer address as colon-separated hex for diagnostics
pub fn format_peer(addr: &PeerAddress) -> String<17> {
    let mut out = String::new();
    for (i, byte) in addr.iter().enumerate() {
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_peer() {
        let addr: PeerAddress = [0xC0, 0x49, 0xEF, 0xE0, 0xDF, 0xB4];
        assert_eq!(format_peer(&addr).as_str(), "C0:49:EF:E0:DF:B4");
    }
}
