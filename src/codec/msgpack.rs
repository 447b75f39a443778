//! MsgPack codec using `rmp-serde`.
//!
//! Structs are written with `to_vec_named` (struct-as-map), so peers that
//! decode into dynamic maps see field names rather than positions.
//!
//! An empty payload decodes as msgpack `nil`: bodiless events arrive with
//! zero payload bytes and still decode into `()` or a unit struct.
//!
//! # Example
//!
//! ```
//! use netevent_bus::codec::{Codec, MsgPackCodec};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Move {
//!     entity: u32,
//!     x: f32,
//! }
//!
//! let msg = Move { entity: 42, x: 1.5 };
//! let encoded = MsgPackCodec::encode(&msg).unwrap();
//! let decoded: Move = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::error::CodecError;

const NIL: u8 = 0xc0;

/// MessagePack codec for structured data. The default codec of the bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    #[inline]
    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    #[inline]
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
        if bytes.is_empty() {
            return Ok(rmp_serde::from_slice(&[NIL])?);
        }
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Spawn {
        id: u32,
        name: String,
        active: bool,
    }

    #[test]
    fn test_encode_decode_struct() {
        let original = Spawn {
            id: 42,
            name: "goblin".to_string(),
            active: true,
        };

        let encoded = MsgPackCodec::encode(&original).unwrap();
        let decoded: Spawn = MsgPackCodec::decode(&encoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_unit_request_encoding() {
        let encoded = MsgPackCodec::encode(&()).unwrap();
        assert_eq!(encoded, vec![NIL]);
        MsgPackCodec::decode::<()>(&encoded).unwrap();
    }

    #[test]
    fn test_empty_payload_decodes_as_nil() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct Ping;

        MsgPackCodec::decode::<()>(&[]).unwrap();
        assert_eq!(MsgPackCodec::decode::<Ping>(&[]).unwrap(), Ping);
        assert_eq!(MsgPackCodec::decode::<Option<u32>>(&[]).unwrap(), None);
    }

    #[test]
    fn test_struct_uses_map_format() {
        let value = Spawn {
            id: 1,
            name: "x".to_string(),
            active: false,
        };

        let encoded = MsgPackCodec::encode(&value).unwrap();

        // fixmap (0x8X), not fixarray (0x9X)
        assert_eq!(
            encoded[0] & 0xF0,
            0x80,
            "Expected map format (0x8X), got {:02X}",
            encoded[0]
        );
    }

    #[test]
    fn test_decode_error_on_invalid_data() {
        let invalid = b"not valid msgpack";
        let result: Result<Spawn, CodecError> = MsgPackCodec::decode(invalid);
        assert!(matches!(result, Err(CodecError::MsgPackDecode(_))));
    }

    #[test]
    fn test_decode_error_on_truncated_buffer() {
        let encoded = MsgPackCodec::encode(&"a longer string value").unwrap();
        let result: Result<String, CodecError> =
            MsgPackCodec::decode(&encoded[..encoded.len() - 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_error_on_wrong_type() {
        let encoded = MsgPackCodec::encode(&"text").unwrap();
        let result: Result<i32, CodecError> = MsgPackCodec::decode(&encoded);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_payload_is_not_a_number() {
        let result: Result<i32, CodecError> = MsgPackCodec::decode(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_number_types() {
        let n: i32 = -12345;
        let encoded = MsgPackCodec::encode(&n).unwrap();
        let decoded: i32 = MsgPackCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, n);

        let n: f64 = 3.14159;
        let encoded = MsgPackCodec::encode(&n).unwrap();
        let decoded: f64 = MsgPackCodec::decode(&encoded).unwrap();
        assert!((decoded - n).abs() < f64::EPSILON);
    }

    #[test]
    fn test_binary_buffer() {
        let data: Vec<u8> = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        let encoded = MsgPackCodec::encode(&serde_bytes::Bytes::new(&data)).unwrap();

        // bin8
        assert_eq!(encoded[0], 0xc4, "Expected bin8 format");

        let decoded: serde_bytes::ByteBuf = MsgPackCodec::decode(&encoded).unwrap();
        assert_eq!(decoded.as_ref(), &data);
    }
}
