//! Inbound and outbound packets.
//!
//! Payloads are held in `bytes::Bytes`, so splitting a read buffer into
//! packets and handing replies to a writer never copies the body.
//!
//! # Example
//!
//! ```
//! use netevent_bus::protocol::{OutboundPacket, Packet, RawPacket};
//! use bytes::Bytes;
//!
//! let packet = Packet::new(1234, Bytes::from_static(b"\x2a"));
//! assert_eq!(packet.id(), 1234);
//! assert_eq!(packet.len(), 1);
//!
//! let reply = OutboundPacket::new(4567, Bytes::from_static(b"\xcd\x03\x15"));
//! let mut buf = [0u8; 16];
//! let written = reply.encode_into(&mut buf, 2).unwrap();
//! assert_eq!(written, 9);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{PacketHeader, PACKET_HEADER_SIZE};
use crate::error::{NetEventError, Result};

/// Anything the dispatch table can route: an id plus payload bytes.
///
/// Transports with their own packet types implement this instead of copying
/// into [`Packet`].
pub trait RawPacket {
    /// Numeric packet identifier used for the table lookup.
    fn id(&self) -> u16;

    /// Raw payload bytes handed to the codec.
    fn payload(&self) -> &[u8];

    /// Payload length in bytes.
    fn len(&self) -> usize {
        self.payload().len()
    }

    /// True when the payload is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An inbound packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Request identifier.
    pub id: u16,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet.
    pub fn new(id: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Create a packet with an empty payload.
    pub fn empty(id: u16) -> Self {
        Self {
            id,
            payload: Bytes::new(),
        }
    }

    /// Create a packet by copying a payload slice.
    pub fn from_slice(id: u16, payload: &[u8]) -> Self {
        Self {
            id,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get a clone of the payload as Bytes (cheap, zero-copy).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }
}

impl RawPacket for Packet {
    #[inline]
    fn id(&self) -> u16 {
        self.id
    }

    #[inline]
    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl<'a> RawPacket for (u16, &'a [u8]) {
    #[inline]
    fn id(&self) -> u16 {
        self.0
    }

    #[inline]
    fn payload(&self) -> &[u8] {
        self.1
    }
}

/// A reply produced by a request/response handler, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    /// Response identifier registered with the handler.
    pub id: u16,
    /// Encoded response value.
    pub payload: Bytes,
}

impl OutboundPacket {
    /// Create a new outbound packet.
    pub fn new(id: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Header describing this packet on the wire.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the payload length does not fit the
    /// 4-byte length field.
    pub fn header(&self) -> Result<PacketHeader> {
        let payload_length = u32::try_from(self.payload.len()).map_err(|_| {
            NetEventError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                self.payload.len(),
                u32::MAX
            ))
        })?;
        Ok(PacketHeader::new(self.id, payload_length))
    }

    /// Check the packet against the limits a receiver enforces.
    ///
    /// # Errors
    ///
    /// Returns a protocol error for the reserved id 0 or a payload above
    /// `max_payload_size`.
    pub fn validate(&self, max_payload_size: u32) -> Result<()> {
        self.header()?.validate(max_payload_size)
    }

    /// Total framed size (header + payload).
    #[inline]
    pub fn frame_len(&self) -> usize {
        PACKET_HEADER_SIZE + self.payload.len()
    }

    /// Append the framed packet (header + payload) to a growable buffer.
    ///
    /// Nothing is appended if the header cannot be built.
    pub fn write_frame(&self, buf: &mut BytesMut) -> Result<()> {
        let header = self.header()?;
        buf.reserve(self.frame_len());
        buf.put_slice(&header.encode());
        buf.put_slice(&self.payload);
        Ok(())
    }

    /// Build the framed packet as a single contiguous buffer.
    pub fn to_frame(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.frame_len());
        self.write_frame(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Write the framed packet into `buf` starting at `offset`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`NetEventError::BufferTooSmall`] when the space after
    /// `offset` cannot hold the whole frame, or a protocol error when the
    /// payload length does not fit the header. Nothing is written in either
    /// case.
    pub fn encode_into(&self, buf: &mut [u8], offset: usize) -> Result<usize> {
        let header = self.header()?;
        let needed = self.frame_len();
        let available = buf.len().saturating_sub(offset);
        if available < needed {
            return Err(NetEventError::BufferTooSmall { needed, available });
        }

        let dst = &mut buf[offset..offset + needed];
        header.encode_into(&mut dst[..PACKET_HEADER_SIZE]);
        dst[PACKET_HEADER_SIZE..].copy_from_slice(&self.payload);
        Ok(needed)
    }
}

impl RawPacket for OutboundPacket {
    #[inline]
    fn id(&self) -> u16 {
        self.id
    }

    #[inline]
    fn payload(&self) -> &[u8] {
        &self.payload
    }
}
