//! Bluetooth device addresses

use rand::RngCore;
use std::fmt;

/// A 48-bit Bluetooth device address.
///
/// Bytes are kept in the little-endian order used by HCI; the textual form
/// prints the most significant byte first (`AA:BB:CC:DD:EE:FF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    /// Generates a random static address (two most significant bits set).
    pub fn random_static() -> Self {
        let mut bytes = [0u8; 6];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes[5] |= 0xC0;
        Self { bytes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_msb_first() {
        let addr = BdAddr::new([0x55, 0x44, 0x33, 0x22, 0x11, 0x00]);
        assert_eq!(addr.to_string(), "00:11:22:33:44:55");
        assert_eq!(addr.as_slice(), &[0x55, 0x44, 0x33, 0x22, 0x11, 0x00]);
    }

    #[test]
    fn test_random_static_marks_top_bits() {
        let addr = BdAddr::random_static();
        assert_eq!(addr.bytes[5] & 0xC0, 0xC0);
    }
}
