//! Typed handler wrappers.
//!
//! Each registration is stored as a `Box<dyn Handler<Ctx>>`. The two
//! implementations below keep the concrete request/response types and the
//! codec as type parameters, and expose one erased signature to the table.

use std::any::type_name;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::Codec;
use crate::error::{NetEventError, Result};
use crate::protocol::OutboundPacket;

/// A registered handler with its request type erased.
pub trait Handler<Ctx>: Send + Sync {
    /// Decode `payload`, run the handler and build the reply, if any.
    fn call(&self, ctx: &mut Ctx, payload: &[u8]) -> Result<Option<OutboundPacket>>;

    /// Response id replies are tagged with (`None` for fire-and-forget).
    fn response_id(&self) -> Option<u16>;

    /// Name of the request type.
    fn request_type(&self) -> &'static str;

    /// Name of the response type (`None` for fire-and-forget).
    fn response_type(&self) -> Option<&'static str>;
}

fn decode<C: Codec, T: DeserializeOwned>(request_id: u16, payload: &[u8]) -> Result<T> {
    C::decode(payload).map_err(|source| NetEventError::Decode {
        packet_id: request_id,
        source,
    })
}

/// Fire-and-forget handler: decodes `T`, runs `F`, never replies.
pub struct VoidHandler<F, T, C> {
    request_id: u16,
    handler: F,
    _phantom: PhantomData<fn() -> (T, C)>,
}

impl<F, T, C> VoidHandler<F, T, C> {
    /// Create a new fire-and-forget handler for `request_id`.
    pub fn new(request_id: u16, handler: F) -> Self {
        Self {
            request_id,
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<Ctx, F, T, C> Handler<Ctx> for VoidHandler<F, T, C>
where
    F: Fn(&mut Ctx, &mut T) + Send + Sync + 'static,
    T: DeserializeOwned + 'static,
    C: Codec,
{
    fn call(&self, ctx: &mut Ctx, payload: &[u8]) -> Result<Option<OutboundPacket>> {
        let mut request: T = decode::<C, T>(self.request_id, payload)?;
        (self.handler)(ctx, &mut request);
        Ok(None)
    }

    fn response_id(&self) -> Option<u16> {
        None
    }

    fn request_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn response_type(&self) -> Option<&'static str> {
        None
    }
}

/// Request/response handler: decodes `T`, runs `F`, encodes the `R` it
/// returns under the registered response id.
pub struct ReplyHandler<F, T, R, C> {
    request_id: u16,
    response_id: Option<u16>,
    handler: F,
    _phantom: PhantomData<fn() -> (T, R, C)>,
}

impl<F, T, R, C> ReplyHandler<F, T, R, C> {
    /// Create a new request/response handler.
    ///
    /// A `response_id` of `None` runs the handler and drops its value.
    pub fn new(request_id: u16, response_id: Option<u16>, handler: F) -> Self {
        Self {
            request_id,
            response_id,
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<Ctx, F, T, R, C> Handler<Ctx> for ReplyHandler<F, T, R, C>
where
    F: Fn(&mut Ctx, &mut T) -> Option<R> + Send + Sync + 'static,
    T: DeserializeOwned + 'static,
    R: Serialize + 'static,
    C: Codec,
{
    fn call(&self, ctx: &mut Ctx, payload: &[u8]) -> Result<Option<OutboundPacket>> {
        let mut request: T = decode::<C, T>(self.request_id, payload)?;
        let response = (self.handler)(ctx, &mut request);

        let (Some(value), Some(response_id)) = (response, self.response_id) else {
            return Ok(None);
        };

        let data = C::encode(&value).map_err(|source| NetEventError::Encode {
            response_id,
            source,
        })?;
        Ok(Some(OutboundPacket::new(response_id, data)))
    }

    fn response_id(&self) -> Option<u16> {
        self.response_id
    }

    fn request_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn response_type(&self) -> Option<&'static str> {
        Some(type_name::<R>())
    }
}
