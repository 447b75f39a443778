//! Session pump: drives a frozen [`NetEventBus`] over a byte stream.
//!
//! A [`Session`] reads framed packets from any `AsyncRead`, dispatches each
//! one with the caller's context, and writes reply frames to any
//! `AsyncWrite`. The bus itself never logs; the session decides what to do
//! with unhandled ids and failing handlers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use netevent_bus::codec::{Codec, MsgPackCodec};
//! use netevent_bus::protocol::OutboundPacket;
//! use netevent_bus::{NetEventBus, Session};
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut builder = NetEventBus::<u32>::builder();
//! builder.register_reply(1234, 4567, |_: &mut u32, n: &mut i32| Some(*n + 1));
//! let session = Session::new(Arc::new(builder.build()));
//!
//! let (mut peer, stream) = tokio::io::duplex(1024);
//! let (reader, writer) = tokio::io::split(stream);
//!
//! let request = OutboundPacket::new(1234, MsgPackCodec::encode(&41).unwrap());
//! peer.write_all(&request.to_frame().unwrap()).await.unwrap();
//! peer.shutdown().await.unwrap();
//!
//! let stats = session.run(&mut 0, reader, writer).await.unwrap();
//! assert_eq!(stats.replied, 1);
//!
//! let mut reply = Vec::new();
//! peer.read_to_end(&mut reply).await.unwrap();
//! assert_eq!(&reply[..2], &4567u16.to_be_bytes());
//! # });
//! ```
//!
//! `demos/events.rs` runs the same pump behind a TCP listener.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::handler::{NetEventBus, Outcome};
use crate::protocol::{FrameBuffer, Packet, DEFAULT_MAX_PAYLOAD_SIZE};

/// Default read buffer size (64 KB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Largest payload accepted from the peer.
    pub max_payload_size: u32,
    /// Size of the buffer used for each stream read.
    pub read_buffer_size: usize,
    /// End the session on the first undecodable packet instead of skipping it.
    pub stop_on_decode_error: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            stop_on_decode_error: false,
        }
    }
}

/// Counters collected over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Packets read from the stream.
    pub received: u64,
    /// Reply packets written back.
    pub replied: u64,
    /// Packets with no registered handler.
    pub unhandled: u64,
    /// Packets whose decode or reply encode failed.
    pub failed: u64,
}

/// Pumps one byte stream through a shared bus.
pub struct Session<Ctx> {
    bus: Arc<NetEventBus<Ctx>>,
    config: SessionConfig,
}

impl<Ctx> Clone for Session<Ctx> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
            config: self.config.clone(),
        }
    }
}

impl<Ctx> Session<Ctx> {
    /// Create a session with the default configuration.
    pub fn new(bus: Arc<NetEventBus<Ctx>>) -> Self {
        Self::with_config(bus, SessionConfig::default())
    }

    /// Create a session with an explicit configuration.
    pub fn with_config(bus: Arc<NetEventBus<Ctx>>, config: SessionConfig) -> Self {
        Self { bus, config }
    }

    /// Set the largest payload accepted from the peer.
    ///
    /// Default: 16 MB
    pub fn max_payload_size(mut self, limit: u32) -> Self {
        self.config.max_payload_size = limit;
        self
    }

    /// Set the read buffer size.
    ///
    /// Default: 64 KB
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size.max(1);
        self
    }

    /// End the session on the first undecodable packet.
    ///
    /// Default: false (the packet is logged and skipped)
    pub fn stop_on_decode_error(mut self, stop: bool) -> Self {
        self.config.stop_on_decode_error = stop;
        self
    }

    /// The bus this session dispatches into.
    pub fn bus(&self) -> &Arc<NetEventBus<Ctx>> {
        &self.bus
    }

    /// The active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run until the peer closes the stream.
    ///
    /// Replies produced by one read are written and flushed together. The
    /// writer is shut down when the peer closes its side.
    ///
    /// # Errors
    ///
    /// I/O errors, framing violations (reserved id, oversized payload) and,
    /// with `stop_on_decode_error`, the first decode error end the session.
    /// Packets read before the failure are still dispatched and their
    /// replies flushed before the error is returned.
    ///
    /// Replies larger than `max_payload_size` are dropped and counted as
    /// failed, like replies that fail to encode.
    pub async fn run<R, W>(&self, ctx: &mut Ctx, mut reader: R, mut writer: W) -> Result<SessionStats>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut frames = FrameBuffer::with_max_payload(self.config.max_payload_size);
        let mut buf = vec![0u8; self.config.read_buffer_size.max(1)];
        let mut out = BytesMut::new();
        let mut stats = SessionStats::default();

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                if frames.has_partial() {
                    tracing::warn!(buffered = frames.len(), "Stream closed mid-packet");
                }
                break;
            }

            frames.extend(&buf[..n]);
            let mut failure = None;
            loop {
                let packet = match frames.next_packet() {
                    Ok(Some(packet)) => packet,
                    Ok(None) => break,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                };
                stats.received += 1;
                if let Err(e) = self.dispatch_packet(ctx, &packet, &mut out, &mut stats) {
                    failure = Some(e);
                    break;
                }
            }

            if !out.is_empty() {
                writer.write_all(&out).await?;
                writer.flush().await?;
                out.clear();
            }

            if let Some(e) = failure {
                return Err(e);
            }
        }

        writer.shutdown().await?;
        tracing::debug!(?stats, "Session closed");
        Ok(stats)
    }

    /// Dispatch a single packet and queue its reply frame.
    fn dispatch_packet(
        &self,
        ctx: &mut Ctx,
        packet: &Packet,
        out: &mut BytesMut,
        stats: &mut SessionStats,
    ) -> Result<()> {
        match self.bus.dispatch(ctx, packet) {
            Ok(Outcome::HandledWithReply(reply)) => {
                match reply
                    .validate(self.config.max_payload_size)
                    .and_then(|()| reply.write_frame(out))
                {
                    Ok(()) => stats.replied += 1,
                    Err(e) => {
                        stats.failed += 1;
                        tracing::error!("Dropping reply {} to packet {}: {}", reply.id, packet.id, e);
                    }
                }
            }
            Ok(Outcome::HandledNoReply) => {}
            Ok(Outcome::NoHandler) => {
                stats.unhandled += 1;
                tracing::warn!(packet_id = packet.id, "No handler registered, dropping packet");
            }
            Err(e) if e.is_decode() => {
                stats.failed += 1;
                if self.config.stop_on_decode_error {
                    return Err(e);
                }
                tracing::warn!("Dropping undecodable packet: {}", e);
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Handler error for packet {}: {}", packet.id, e);
            }
        }
        Ok(())
    }
}
