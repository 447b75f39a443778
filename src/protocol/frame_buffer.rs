//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented packets:
//! - `WaitingForHeader`: Need at least 6 bytes
//! - `WaitingForPayload`: Header parsed, need N more payload bytes
//!
//! # Example
//!
//! ```
//! use netevent_bus::protocol::{FrameBuffer, OutboundPacket, RawPacket};
//!
//! let frame = OutboundPacket::new(1234, vec![0x2a]).to_frame().unwrap();
//!
//! let mut buffer = FrameBuffer::new();
//! assert!(buffer.push(&frame[..4]).unwrap().is_empty());
//!
//! let packets = buffer.push(&frame[4..]).unwrap();
//! assert_eq!(packets.len(), 1);
//! assert_eq!(packets[0].id(), 1234);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{PacketHeader, DEFAULT_MAX_PAYLOAD_SIZE, PACKET_HEADER_SIZE};
use super::Packet;
use crate::error::Result;

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for complete header (need 6 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for payload bytes.
    WaitingForPayload { header: PacketHeader },
}

/// Buffer for accumulating incoming bytes and extracting complete packets.
pub struct FrameBuffer {
    /// Accumulated bytes from stream reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed payload size.
    max_payload_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 64KB, max payload: 16MB.
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a new frame buffer with custom max payload size.
    pub fn with_max_payload(max_payload_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::WaitingForHeader,
            max_payload_size,
        }
    }

    /// Push data into the buffer and extract all complete packets.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if a header carries the reserved id 0 or
    /// announces a payload above `max_payload_size`. Packets completed
    /// before the bad header are lost with the error; use
    /// [`extend`](Self::extend) and [`next_packet`](Self::next_packet) to
    /// keep them. The buffer is left unusable afterwards; call
    /// [`clear`](Self::clear) or drop it.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Packet>> {
        self.extend(data);

        let mut packets = Vec::new();
        while let Some(packet) = self.next_packet()? {
            packets.push(packet);
        }

        Ok(packets)
    }

    /// Append data without extracting packets.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Extract the next complete packet, if one is buffered.
    ///
    /// # Errors
    ///
    /// Same header checks as [`push`](Self::push). Packets returned by
    /// earlier calls are unaffected.
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            match self.state {
                State::WaitingForHeader => {
                    let header = match PacketHeader::decode(&self.buffer) {
                        Some(h) => h,
                        None => return Ok(None),
                    };
                    header.validate(self.max_payload_size)?;

                    let _ = self.buffer.split_to(PACKET_HEADER_SIZE);

                    if header.payload_length == 0 {
                        return Ok(Some(Packet::new(header.id, Bytes::new())));
                    }

                    self.state = State::WaitingForPayload { header };
                }

                State::WaitingForPayload { header } => {
                    let remaining = header.payload_length as usize;
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }

                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForHeader;

                    return Ok(Some(Packet::new(header.id, payload)));
                }
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True while a packet has been started but not completed.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty() || matches!(self.state, State::WaitingForPayload { .. })
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{OutboundPacket, RawPacket};

    fn make_frame_bytes(id: u16, payload: &[u8]) -> Vec<u8> {
        OutboundPacket::new(id, payload.to_vec())
            .to_frame()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let packets = buffer.push(&make_frame_bytes(1, b"hello")).unwrap();

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].id(), 1);
        assert_eq!(packets[0].payload(), b"hello");
        assert!(buffer.is_empty());
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut buffer = FrameBuffer::new();

        let mut combined = make_frame_bytes(1, b"first");
        combined.extend(make_frame_bytes(2, b"second"));
        combined.extend(make_frame_bytes(3, b""));

        let packets = buffer.push(&combined).unwrap();

        let ids: Vec<u16> = packets.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(packets[2].is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fragmented_header() {
        let mut buffer = FrameBuffer::new();
        let frame = make_frame_bytes(1, b"test");

        assert!(buffer.push(&frame[..3]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForHeader");
        assert!(buffer.has_partial());

        let packets = buffer.push(&frame[3..]).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].payload(), b"test");
    }

    #[test]
    fn test_fragmented_payload() {
        let mut buffer = FrameBuffer::new();
        let payload = b"this is a longer payload that will be fragmented";
        let frame = make_frame_bytes(1, payload);

        let partial_len = PACKET_HEADER_SIZE + 10;
        assert!(buffer.push(&frame[..partial_len]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        let packets = buffer.push(&frame[partial_len..]).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].payload(), payload);
        assert_eq!(buffer.state_name(), "WaitingForHeader");
    }

    #[test]
    fn test_max_payload_validation() {
        let mut buffer = FrameBuffer::with_max_payload(100);
        let header = PacketHeader::new(1, 1000).encode();

        let result = buffer.push(&header);
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_reserved_id_rejected() {
        let mut buffer = FrameBuffer::new();
        let result = buffer.push(&make_frame_bytes(0, b"x"));
        assert!(result.unwrap_err().to_string().contains("reserved"));
    }

    #[test]
    fn test_next_packet_before_bad_header() {
        let mut buffer = FrameBuffer::new();

        let mut data = make_frame_bytes(7, b"ok");
        data.extend(PacketHeader::new(0, 0).encode());
        buffer.extend(&data);

        let first = buffer.next_packet().unwrap().unwrap();
        assert_eq!(first.id(), 7);
        assert_eq!(first.payload(), b"ok");

        let err = buffer.next_packet().unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_next_packet_waits_for_data() {
        let mut buffer = FrameBuffer::new();
        let frame = make_frame_bytes(3, b"abc");

        buffer.extend(&frame[..5]);
        assert!(buffer.next_packet().unwrap().is_none());

        buffer.extend(&frame[5..]);
        assert_eq!(buffer.next_packet().unwrap().unwrap().id(), 3);
        assert!(buffer.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = FrameBuffer::new();
        let frame = make_frame_bytes(1, b"test");

        buffer.push(&frame[..PACKET_HEADER_SIZE]).unwrap();
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        buffer.clear();

        assert_eq!(buffer.state_name(), "WaitingForHeader");
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        let frame = make_frame_bytes(1234, b"hi");

        let mut all = Vec::new();
        for byte in &frame {
            all.extend(buffer.push(&[*byte]).unwrap());
        }

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), 1234);
        assert_eq!(all[0].payload(), b"hi");
    }
}
