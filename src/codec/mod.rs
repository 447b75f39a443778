//! Codec module - the boundary between packet bytes and typed values.
//!
//! The dispatch table never looks at payload bytes itself. Every registered
//! handler decodes its request and encodes its response through a [`Codec`]:
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (default)
//! - [`JsonCodec`] - JSON using `serde_json`
//!
//! # Design
//!
//! Codecs are marker structs with associated functions rather than values.
//! The bus carries the codec as a type parameter, so the choice is made at
//! compile time and costs nothing per packet.
//!
//! # Example
//!
//! ```
//! use netevent_bus::codec::{Codec, MsgPackCodec};
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod json;
mod msgpack;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;

/// Converts between payload bytes and typed requests/responses.
pub trait Codec: Send + Sync + 'static {
    /// Encode a value to payload bytes.
    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode payload bytes into a value.
    ///
    /// Fails when the bytes do not match the shape of `T` (truncated buffer,
    /// invalid tag, trailing length mismatch).
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError>;
}
