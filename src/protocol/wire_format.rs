//! Wire format encoding and decoding.
//!
//! Implements the 6-byte packet header:
//! ```text
//! ┌──────────┬──────────┐
//! │ Packet ID│ Length   │
//! │ 2 bytes  │ 4 bytes  │
//! │ uint16 BE│ uint32 BE│
//! └──────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

use crate::error::{NetEventError, Result};

/// Header size in bytes (fixed, exactly 6).
pub const PACKET_HEADER_SIZE: usize = 6;

/// Default maximum payload size (16 MB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Reserved packet ID. As a response ID it means "no response".
pub const RESERVED_PACKET_ID: u16 = 0;

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Packet identifier (request id inbound, response id outbound).
    pub id: u16,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl PacketHeader {
    /// Create a new header.
    pub fn new(id: u16, payload_length: u32) -> Self {
        Self { id, payload_length }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use netevent_bus::protocol::PacketHeader;
    ///
    /// let header = PacketHeader::new(1234, 100);
    /// assert_eq!(header.encode(), [0x04, 0xD2, 0, 0, 0, 100]);
    /// ```
    pub fn encode(&self) -> [u8; PACKET_HEADER_SIZE] {
        let mut buf = [0u8; PACKET_HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `PACKET_HEADER_SIZE` (6 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.id.to_be_bytes());
        buf[2..6].copy_from_slice(&self.payload_length.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < PACKET_HEADER_SIZE {
            return None;
        }
        Some(Self {
            id: u16::from_be_bytes([buf[0], buf[1]]),
            payload_length: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
        })
    }

    /// Validate the header for protocol compliance.
    ///
    /// Checks:
    /// - Packet ID is not 0 (reserved)
    /// - Payload length doesn't exceed max
    pub fn validate(&self, max_payload_size: u32) -> Result<()> {
        if self.id == RESERVED_PACKET_ID {
            return Err(NetEventError::Protocol(
                "Packet ID 0 is reserved".to_string(),
            ));
        }

        if self.payload_length > max_payload_size {
            return Err(NetEventError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                self.payload_length, max_payload_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_big_endian_byte_order() {
        let header = PacketHeader::new(0x0102, 0x03040506);
        let bytes = header.encode();

        assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(PacketHeader::decode(&bytes), Some(header));
    }

    #[test]
    fn test_decode_too_short_buffer() {
        let buf = [0u8; 5];
        assert!(PacketHeader::decode(&buf).is_none());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut buf = PacketHeader::new(7, 3).encode().to_vec();
        buf.extend_from_slice(b"abc");
        assert_eq!(PacketHeader::decode(&buf), Some(PacketHeader::new(7, 3)));
    }

    #[test]
    fn test_validate_packet_id_zero_rejected() {
        let header = PacketHeader::new(0, 0);
        let result = header.validate(DEFAULT_MAX_PAYLOAD_SIZE);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Packet ID 0 is reserved"));
    }

    #[test]
    fn test_validate_payload_too_large() {
        let header = PacketHeader::new(1, 1_000_000);
        let result = header.validate(100);
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_min_max_values() {
        assert!(PacketHeader::new(1, 0)
            .validate(DEFAULT_MAX_PAYLOAD_SIZE)
            .is_ok());
        assert!(PacketHeader::new(u16::MAX, u32::MAX)
            .validate(u32::MAX)
            .is_ok());
    }
}
