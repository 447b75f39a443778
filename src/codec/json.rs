//! JSON codec using `serde_json`.
//!
//! Larger on the wire than MsgPack, but readable in packet captures.
//! An empty payload decodes as `null`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;
use crate::error::CodecError;

/// JSON codec for structured data.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    #[inline]
    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    #[inline]
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
        if bytes.is_empty() {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Chat {
        channel: u8,
        text: String,
    }

    #[test]
    fn test_encode_is_plain_json() {
        let msg = Chat {
            channel: 2,
            text: "hi".to_string(),
        };
        let encoded = JsonCodec::encode(&msg).unwrap();
        assert_eq!(encoded, br#"{"channel":2,"text":"hi"}"#.to_vec());

        let decoded: Chat = JsonCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_empty_payload_is_null() {
        JsonCodec::decode::<()>(&[]).unwrap();
        assert_eq!(JsonCodec::decode::<Option<Chat>>(&[]).unwrap(), None);
    }

    #[test]
    fn test_decode_error_on_missing_field() {
        let result: Result<Chat, CodecError> = JsonCodec::decode(br#"{"channel":2}"#);
        assert!(matches!(result, Err(CodecError::Json(_))));
    }
}
