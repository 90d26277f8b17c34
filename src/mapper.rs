//! Handler normalization.
//!
//! A [`Route`](crate::Route) carries its handler as a [`HandlerValue`], a
//! closed set of accepted representations. A [`HandlerMapper`] turns that
//! value into the canonical [`BoxedHandler`] before decorators and
//! registrars see it.
//!
//! The [`DefaultMapper`] accepts:
//!
//! 1. [`HandlerValue::Handler`] — already canonical, returned unchanged.
//! 2. [`HandlerValue::Writer`] — a function `Fn(&mut ResponseWriter, &Request)`,
//!    wrapped so that each request gets a fresh [`ResponseWriter`].
//! 3. [`HandlerValue::Opaque`] — inspected at runtime; a stored
//!    [`BoxedHandler`] or [`WriterFn`] is handled as above.
//!
//! Anything else fails with [`Error::HandlerMapping`]. Configure a custom
//! mapper with [`RegistrationOptions::mapper`](crate::RegistrationOptions::mapper)
//! to accept other representations; it replaces all of the above.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler, RequestHandler};
use crate::request::Request;
use crate::response::ResponseWriter;

/// A writer-style handler function.
pub type WriterFn = Arc<dyn Fn(&mut ResponseWriter, &Request) + Send + Sync + 'static>;

/// The handler value a route is declared with.
#[derive(Clone)]
pub enum HandlerValue {
    /// Already a canonical handler.
    Handler(BoxedHandler),
    /// A plain two-argument function over a response writer and a request.
    Writer(WriterFn),
    /// Any other value, left for the active mapper to interpret.
    Opaque {
        value: Arc<dyn Any + Send + Sync>,
        type_name: &'static str,
    },
}

impl HandlerValue {
    /// A type implementing [`RequestHandler`].
    pub fn handler(handler: impl RequestHandler) -> Self {
        Self::Handler(Arc::new(handler))
    }

    /// An `async fn(Request) -> impl IntoResponse`.
    pub fn func(handler: impl Handler) -> Self {
        Self::Handler(handler.into_boxed_handler())
    }

    /// A function that fills a [`ResponseWriter`] for a request.
    pub fn writer<F>(f: F) -> Self
    where
        F: Fn(&mut ResponseWriter, &Request) + Send + Sync + 'static,
    {
        Self::Writer(Arc::new(f))
    }

    /// An arbitrary value; only a mapper that recognises it can register it.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque { value: Arc::new(value), type_name: any::type_name::<T>() }
    }

    /// Best-effort name of the underlying type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Handler(_) => any::type_name::<BoxedHandler>(),
            Self::Writer(_) => any::type_name::<WriterFn>(),
            Self::Opaque { type_name, .. } => *type_name,
        }
    }
}

impl From<BoxedHandler> for HandlerValue {
    fn from(handler: BoxedHandler) -> Self {
        Self::Handler(handler)
    }
}

impl fmt::Debug for HandlerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Writer(_) => f.write_str("Writer(..)"),
            Self::Opaque { type_name, .. } => write!(f, "Opaque({type_name})"),
        }
    }
}

/// Strategy normalizing a [`HandlerValue`] into a canonical handler.
pub trait HandlerMapper: Send + Sync {
    fn map_handler(&self, value: &HandlerValue) -> Result<BoxedHandler, Error>;
}

/// Accepts canonical handlers and writer functions, directly or stored
/// inside [`HandlerValue::Opaque`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMapper;

impl HandlerMapper for DefaultMapper {
    fn map_handler(&self, value: &HandlerValue) -> Result<BoxedHandler, Error> {
        match value {
            HandlerValue::Handler(handler) => Ok(Arc::clone(handler)),
            HandlerValue::Writer(f) => Ok(writer_handler(Arc::clone(f))),
            HandlerValue::Opaque { value, type_name } => {
                if let Some(handler) = value.downcast_ref::<BoxedHandler>() {
                    return Ok(Arc::clone(handler));
                }
                if let Some(f) = value.downcast_ref::<WriterFn>() {
                    return Ok(writer_handler(Arc::clone(f)));
                }
                Err(Error::HandlerMapping { type_name: *type_name })
            }
        }
    }
}

/// Wraps a writer function as a canonical handler.
pub fn writer_handler(f: WriterFn) -> BoxedHandler {
    Arc::new(WriterHandler(f))
}

struct WriterHandler(WriterFn);

impl RequestHandler for WriterHandler {
    fn call(&self, req: Request) -> BoxFuture {
        let f = Arc::clone(&self.0);
        // Runs inside the future so panic-recovering middlewares see it.
        Box::pin(async move {
            let mut writer = ResponseWriter::new();
            f(&mut writer, &req);
            writer.into_response()
        })
    }
}

/// A mapper backed by a closure.
pub struct FnMapper<F>(F);

/// Lifts a closure into a [`HandlerMapper`].
///
/// ```rust
/// use tsu_controller::mapper::{self, DefaultMapper, HandlerMapper, HandlerValue};
/// use tsu_controller::{Error, Handler, Request, Response};
///
/// // Accept plain `&'static str` values as fixed text responses.
/// let custom = mapper::from_fn(|value: &HandlerValue| match value {
///     HandlerValue::Opaque { value, type_name } => match value.downcast_ref::<&'static str>() {
///         Some(text) => {
///             let text = *text;
///             Ok((move |_req: Request| async move { Response::text(text) }).into_boxed_handler())
///         }
///         None => Err(Error::HandlerMapping { type_name: *type_name }),
///     },
///     other => DefaultMapper.map_handler(other),
/// });
///
/// assert!(custom.map_handler(&HandlerValue::opaque("pong")).is_ok());
/// ```
pub fn from_fn<F>(f: F) -> FnMapper<F>
where
    F: Fn(&HandlerValue) -> Result<BoxedHandler, Error> + Send + Sync,
{
    FnMapper(f)
}

impl<F> HandlerMapper for FnMapper<F>
where
    F: Fn(&HandlerValue) -> Result<BoxedHandler, Error> + Send + Sync,
{
    fn map_handler(&self, value: &HandlerValue) -> Result<BoxedHandler, Error> {
        (self.0)(value)
    }
}
