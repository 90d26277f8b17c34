//! Canonical request handlers and type erasure.
//!
//! # What "canonical" means
//!
//! Every route ends up as one [`BoxedHandler`]: an `Arc` around a
//! [`RequestHandler`] trait object. Mappers produce it, decorators and
//! middlewares wrap it, registrars hand it to the router. Nothing downstream
//! of the mapper ever sees the original handler type.
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ hello.into_boxed_handler()               ← Handler blanket impl
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn RequestHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_response() })  ← BoxFuture
//! ```
//!
//! Types that need state implement [`RequestHandler`] directly and are
//! already canonical once wrapped in an `Arc`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let the host runtime move the future across threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Something that can process one request/response exchange.
///
/// Implement this on your own types when a handler carries state:
///
/// ```rust
/// use tsu_controller::{BoxFuture, Request, RequestHandler, Response};
///
/// struct Greeter {
///     greeting: &'static str,
/// }
///
/// impl RequestHandler for Greeter {
///     fn call(&self, req: Request) -> BoxFuture {
///         let body = format!("{}, {}!", self.greeting, req.param("name").unwrap_or("anonymous"));
///         Box::pin(async move { Response::text(body) })
///     }
/// }
/// ```
pub trait RequestHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// The canonical handler, shared across concurrent requests.
///
/// Cloning costs one atomic increment.
pub type BoxedHandler = Arc<dyn RequestHandler>;

/// Implemented for every `async fn` usable as a route handler:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a typed `async fn` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> RequestHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;

    async fn created(_req: Request) -> StatusCode {
        StatusCode::CREATED
    }

    #[tokio::test]
    async fn async_fn_becomes_canonical_handler() {
        let handler = created.into_boxed_handler();
        let res = handler.call(Request::new(Method::POST, "/users")).await;
        assert_eq!(res.status_code(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn closure_sees_the_request() {
        let handler = (|req: Request| async move { req.path().to_owned() }).into_boxed_handler();
        let res = handler.call(Request::new(Method::GET, "/echo/path")).await;
        assert_eq!(res.body(), b"/echo/path");
    }
}
