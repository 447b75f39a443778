//! Handler module - registration and dispatch.
//!
//! Provides:
//! - [`NetEventBusBuilder`] - registers handlers by request id
//! - [`NetEventBus`] - frozen table that dispatches packets
//! - [`RouteGroup`] - registers all handlers of one service object
//!
//! # Example
//!
//! ```
//! use netevent_bus::handler::NetEventBus;
//!
//! #[derive(serde::Deserialize)]
//! struct Move {
//!     x: i32,
//!     y: i32,
//! }
//!
//! struct Player {
//!     pos: (i32, i32),
//! }
//!
//! let mut builder = NetEventBus::<Player>::builder();
//!
//! // Fire-and-forget
//! builder.register_void(100, |player: &mut Player, m: &mut Move| {
//!     player.pos = (m.x, m.y);
//! });
//!
//! // Request/response: the reply is tagged with id 201
//! builder.register_reply(200, 201, |player: &mut Player, _: &mut ()| {
//!     Some(player.pos)
//! });
//!
//! let bus = builder.build();
//! assert_eq!(bus.len(), 2);
//! ```

mod registry;
mod typed;

pub use registry::{NetEventBus, NetEventBusBuilder, Outcome, Route, RouteGroup};
pub use typed::{Handler, ReplyHandler, VoidHandler};
