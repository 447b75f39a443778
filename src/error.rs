//! Error types for netevent-bus.

use thiserror::Error;

/// Errors raised at the codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main error type for all bus operations.
#[derive(Debug, Error)]
pub enum NetEventError {
    /// Payload bytes do not match the request type registered for the packet id.
    #[error("Failed to decode packet {packet_id}: {source}")]
    Decode {
        /// Id of the inbound packet.
        packet_id: u16,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// Handler output could not be serialized.
    #[error("Failed to encode response {response_id}: {source}")]
    Encode {
        /// Response id the value was tagged with.
        response_id: u16,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },

    /// Destination buffer cannot hold the encoded packet.
    #[error("Buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available after the write offset.
        available: usize,
    },

    /// Protocol error (reserved id, oversized payload, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error on the session stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetEventError {
    /// True for the error kinds caused by malformed inbound bytes.
    pub fn is_decode(&self) -> bool {
        matches!(self, NetEventError::Decode { .. })
    }
}

/// Result type alias using NetEventError.
pub type Result<T> = std::result::Result<T, NetEventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_keeps_source() {
        let source = rmp_serde::from_slice::<i32>(&[0xc1]).unwrap_err();
        let err = NetEventError::Decode {
            packet_id: 7,
            source: CodecError::from(source),
        };

        assert!(err.is_decode());
        assert!(err.to_string().starts_with("Failed to decode packet 7"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_buffer_too_small_message() {
        let err = NetEventError::BufferTooSmall {
            needed: 10,
            available: 4,
        };
        assert!(!err.is_decode());
        assert_eq!(
            err.to_string(),
            "Buffer too small: need 10 bytes, 4 available"
        );
    }
}
