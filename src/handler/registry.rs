//! Handler registration and the frozen dispatch table.
//!
//! Registration happens on a [`NetEventBusBuilder`] while the application
//! starts. [`NetEventBusBuilder::build`] freezes it into a [`NetEventBus`],
//! which has no mutation API and can be shared across threads behind an
//! `Arc`.
//!
//! # Example
//!
//! ```
//! use netevent_bus::codec::{Codec, MsgPackCodec};
//! use netevent_bus::handler::{NetEventBus, Outcome};
//! use netevent_bus::protocol::Packet;
//!
//! struct World {
//!     pings: u32,
//! }
//!
//! let mut builder = NetEventBus::<World>::builder();
//! builder
//!     .register_void(1111, |world: &mut World, _: &mut ()| world.pings += 1)
//!     .register_reply(1234, 4567, |_: &mut World, n: &mut i32| Some(*n * 2));
//! let bus = builder.build();
//!
//! let mut world = World { pings: 0 };
//! let outcome = bus.dispatch(&mut world, &Packet::empty(1111)).unwrap();
//! assert_eq!(outcome, Outcome::HandledNoReply);
//! assert_eq!(world.pings, 1);
//!
//! let request = Packet::new(1234, MsgPackCodec::encode(&21).unwrap());
//! let reply = bus.dispatch(&mut world, &request).unwrap().into_reply().unwrap();
//! assert_eq!(reply.id, 4567);
//! assert_eq!(MsgPackCodec::decode::<i32>(&reply.payload).unwrap(), 42);
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::typed::{Handler, ReplyHandler, VoidHandler};
use crate::codec::{Codec, MsgPackCodec};
use crate::error::Result;
use crate::protocol::{OutboundPacket, RawPacket, RESERVED_PACKET_ID};

/// Result of dispatching one packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No handler is registered for the packet id. Nothing ran.
    NoHandler,
    /// The handler ran and produced no reply.
    HandledNoReply,
    /// The handler ran and produced a reply tagged with its response id.
    HandledWithReply(OutboundPacket),
}

impl Outcome {
    /// True if a handler ran.
    #[inline]
    pub fn is_handled(&self) -> bool {
        !matches!(self, Outcome::NoHandler)
    }

    /// Borrow the reply, if any.
    #[inline]
    pub fn reply(&self) -> Option<&OutboundPacket> {
        match self {
            Outcome::HandledWithReply(packet) => Some(packet),
            _ => None,
        }
    }

    /// Take the reply, if any.
    #[inline]
    pub fn into_reply(self) -> Option<OutboundPacket> {
        match self {
            Outcome::HandledWithReply(packet) => Some(packet),
            _ => None,
        }
    }
}

/// Description of one registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Request id the handler is registered under.
    pub request_id: u16,
    /// Response id replies are tagged with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<u16>,
    /// Rust type name of the request.
    pub request_type: &'static str,
    /// Rust type name of the response, for request/response handlers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<&'static str>,
}

/// A set of handlers backed by one shared object.
///
/// Implement this on a service type to register all of its routes in one
/// call to [`NetEventBusBuilder::install`].
///
/// ```
/// use std::sync::Arc;
/// use netevent_bus::handler::{NetEventBus, NetEventBusBuilder, RouteGroup};
///
/// struct Shop {
///     price: u32,
/// }
///
/// impl RouteGroup<u32> for Shop {
///     fn register(self: Arc<Self>, bus: &mut NetEventBusBuilder<u32>) {
///         bus.register_reply(10, 11, move |gold: &mut u32, qty: &mut u32| {
///             let cost = self.price * *qty;
///             (*gold >= cost).then(|| {
///                 *gold -= cost;
///                 *gold
///             })
///         });
///     }
/// }
///
/// let mut builder = NetEventBus::<u32>::builder();
/// builder.install(Arc::new(Shop { price: 5 }));
/// assert!(builder.build().contains(10));
/// ```
pub trait RouteGroup<Ctx, C: Codec = MsgPackCodec>: Send + Sync + 'static {
    /// Register every route of this group.
    fn register(self: Arc<Self>, bus: &mut NetEventBusBuilder<Ctx, C>);
}

/// Mutable registration phase of a [`NetEventBus`].
pub struct NetEventBusBuilder<Ctx, C = MsgPackCodec> {
    handlers: HashMap<u16, Box<dyn Handler<Ctx>>>,
    _codec: PhantomData<fn() -> C>,
}

impl<Ctx> NetEventBusBuilder<Ctx, MsgPackCodec> {
    /// Create a new empty builder using the MsgPack codec.
    pub fn new() -> Self {
        Self::with_codec()
    }
}

impl<Ctx, C: Codec> NetEventBusBuilder<Ctx, C> {
    /// Create a new empty builder using codec `C`.
    pub fn with_codec() -> Self {
        Self {
            handlers: HashMap::new(),
            _codec: PhantomData,
        }
    }

    /// Register a fire-and-forget handler.
    ///
    /// The payload is decoded as `T` and `handler` runs with the dispatch
    /// context and the request. Replaces any handler already registered
    /// for `request_id`.
    pub fn register_void<T, F>(&mut self, request_id: u16, handler: F) -> &mut Self
    where
        F: Fn(&mut Ctx, &mut T) + Send + Sync + 'static,
        T: DeserializeOwned + 'static,
    {
        let entry = VoidHandler::<F, T, C>::new(request_id, handler);
        self.insert(request_id, Box::new(entry))
    }

    /// Register a request/response handler.
    ///
    /// When `handler` returns `Some(value)`, the value is encoded and tagged
    /// with `response_id`. A `response_id` of 0 means no response is
    /// expected: the handler still runs and its value is dropped.
    /// Replaces any handler already registered for `request_id`.
    pub fn register_reply<T, R, F>(
        &mut self,
        request_id: u16,
        response_id: u16,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(&mut Ctx, &mut T) -> Option<R> + Send + Sync + 'static,
        T: DeserializeOwned + 'static,
        R: Serialize + 'static,
    {
        let response_id = (response_id != RESERVED_PACKET_ID).then_some(response_id);
        let entry = ReplyHandler::<F, T, R, C>::new(request_id, response_id, handler);
        self.insert(request_id, Box::new(entry))
    }

    /// Register all routes of a [`RouteGroup`].
    pub fn install<G>(&mut self, group: Arc<G>) -> &mut Self
    where
        G: RouteGroup<Ctx, C>,
    {
        group.register(self);
        self
    }

    fn insert(&mut self, request_id: u16, handler: Box<dyn Handler<Ctx>>) -> &mut Self {
        if let Some(previous) = self.handlers.insert(request_id, handler) {
            tracing::debug!(
                request_id,
                previous = previous.request_type(),
                "replacing registered handler"
            );
        }
        self
    }

    /// Check whether a handler is registered for `request_id`.
    pub fn contains(&self, request_id: u16) -> bool {
        self.handlers.contains_key(&request_id)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Freeze the registrations into a dispatch table.
    pub fn build(self) -> NetEventBus<Ctx> {
        NetEventBus {
            handlers: self.handlers,
        }
    }
}

impl<Ctx> Default for NetEventBusBuilder<Ctx, MsgPackCodec> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen dispatch table mapping request ids to handlers.
///
/// # Thread Safety
///
/// `NetEventBus` is `Send + Sync`: every handler is `Send + Sync` and the
/// table cannot be modified after [`NetEventBusBuilder::build`]. Wrap it in
/// an `Arc` to dispatch from several threads or tasks at once, each with its
/// own context.
pub struct NetEventBus<Ctx> {
    handlers: HashMap<u16, Box<dyn Handler<Ctx>>>,
}

impl<Ctx> NetEventBus<Ctx> {
    /// Start registering handlers using the MsgPack codec.
    pub fn builder() -> NetEventBusBuilder<Ctx, MsgPackCodec> {
        NetEventBusBuilder::new()
    }

    /// Start registering handlers using codec `C`.
    pub fn builder_with_codec<C: Codec>() -> NetEventBusBuilder<Ctx, C> {
        NetEventBusBuilder::with_codec()
    }

    /// Dispatch one packet.
    ///
    /// Looks up the handler for `packet.id()`, decodes the payload into the
    /// registered request type, runs the handler with `ctx` and returns the
    /// reply, if any.
    ///
    /// # Errors
    ///
    /// - [`NetEventError::Decode`](crate::NetEventError::Decode) if the
    ///   payload does not decode; the handler is not run.
    /// - [`NetEventError::Encode`](crate::NetEventError::Encode) if the
    ///   handler's response cannot be encoded.
    pub fn dispatch<P>(&self, ctx: &mut Ctx, packet: &P) -> Result<Outcome>
    where
        P: RawPacket + ?Sized,
    {
        let handler = match self.handlers.get(&packet.id()) {
            Some(h) => h,
            None => return Ok(Outcome::NoHandler),
        };

        Ok(match handler.call(ctx, packet.payload())? {
            Some(reply) => Outcome::HandledWithReply(reply),
            None => Outcome::HandledNoReply,
        })
    }

    /// Check whether a handler is registered for `request_id`.
    pub fn contains(&self, request_id: u16) -> bool {
        self.handlers.contains_key(&request_id)
    }

    /// Response id registered for `request_id`, if it is a
    /// request/response route.
    pub fn response_id(&self, request_id: u16) -> Option<u16> {
        self.handlers
            .get(&request_id)
            .and_then(|h| h.response_id())
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All registered routes, ordered by request id.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .handlers
            .iter()
            .map(|(&request_id, h)| Route {
                request_id,
                response_id: h.response_id(),
                request_type: h.request_type(),
                response_type: h.response_type(),
            })
            .collect();
        routes.sort_by_key(|r| r.request_id);
        routes
    }
}

impl<Ctx> std::fmt::Debug for NetEventBus<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetEventBus")
            .field("routes", &self.routes())
            .finish()
    }
}
