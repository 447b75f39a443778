//! # netevent-bus
//!
//! Typed network event bus. Packets carry a 16-bit id; handlers are
//! registered per id and receive the decoded request together with an
//! opaque context (a world handle, a connection, a player entity).
//!
//! ## Architecture
//!
//! - **Registration** ([`NetEventBusBuilder`]): fire-and-forget and
//!   request/response handlers, registered once at start-up
//! - **Dispatch** ([`NetEventBus`]): frozen `id -> handler` table,
//!   lookup-decode-invoke-encode per packet, shareable across threads
//! - **Codec** ([`codec`]): MsgPack by default, JSON available
//! - **Session** ([`Session`]): optional pump over any async byte stream
//!
//! ## Example
//!
//! ```
//! use netevent_bus::codec::{Codec, MsgPackCodec};
//! use netevent_bus::protocol::Packet;
//! use netevent_bus::{NetEventBus, Outcome};
//!
//! #[derive(Default)]
//! struct World {
//!     hits: u32,
//! }
//!
//! let mut builder = NetEventBus::<World>::builder();
//! builder.register_reply(1234, 4567, |world: &mut World, damage: &mut i32| {
//!     world.hits += 1;
//!     Some(100 - *damage)
//! });
//! let bus = builder.build();
//!
//! let mut world = World::default();
//! let packet = Packet::new(1234, MsgPackCodec::encode(&42).unwrap());
//!
//! match bus.dispatch(&mut world, &packet).unwrap() {
//!     Outcome::HandledWithReply(reply) => {
//!         assert_eq!(reply.id, 4567);
//!         assert_eq!(MsgPackCodec::decode::<i32>(&reply.payload).unwrap(), 58);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod codec;
pub mod error;
pub mod handler;
pub mod protocol;

mod session;

pub use error::{CodecError, NetEventError};
pub use handler::{NetEventBus, NetEventBusBuilder, Outcome, Route, RouteGroup};
pub use session::{Session, SessionConfig, SessionStats, DEFAULT_READ_BUFFER_SIZE};
