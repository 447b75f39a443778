//! Protocol module - packet types and stream framing.
//!
//! - 6-byte header encoding/decoding
//! - [`Packet`] / [`OutboundPacket`] and the [`RawPacket`] lookup trait
//! - Frame buffer for accumulating partial reads

mod frame_buffer;
mod packet;
mod wire_format;

pub use frame_buffer::FrameBuffer;
pub use packet::{OutboundPacket, Packet, RawPacket};
pub use wire_format::{
    PacketHeader, DEFAULT_MAX_PAYLOAD_SIZE, PACKET_HEADER_SIZE, RESERVED_PACKET_ID,
};
