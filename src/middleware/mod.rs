//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, panic recovery, request-id
//! injection, authentication-header inspection. This module provides the
//! composition mechanism only; the behaviours themselves belong to the
//! application.
//!
//! # Order
//!
//! [`apply`] makes the **first** middleware the outermost layer. For
//! middlewares `[a, b, c]` around handler `h`, every request runs
//!
//! ```text
//! a → b → c → h        (code before `next.run(req).await`)
//! h → c → b → a        (code after it)
//! ```
//!
//! A middleware that returns without calling [`Next::run`] stops the
//! request there; nothing deeper runs.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::StatusCode;
//! use tsu_controller::middleware::{self, Middleware, Next};
//! use tsu_controller::{Handler, Request, Response};
//!
//! async fn require_token(req: Request, next: Next) -> Response {
//!     if req.header("authorization").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.run(req).await
//! }
//!
//! # async fn hello(_req: Request) -> &'static str { "hello" }
//! let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(require_token)];
//! let handler = middleware::apply(hello.into_boxed_handler(), &chain);
//! # let _ = handler;
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::decorator::Decorator;
use crate::handler::{BoxFuture, BoxedHandler, RequestHandler};
use crate::request::Request;
use crate::response::IntoResponse;

/// A cross-cutting behaviour wrapped around a handler.
///
/// Implemented automatically for any
/// `Fn(Request, Next) -> impl Future<Output = impl IntoResponse>`; implement
/// it directly when the middleware carries state.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let fut = self(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The rest of the chain, as seen from one middleware.
#[derive(Clone)]
pub struct Next {
    handler: BoxedHandler,
}

impl Next {
    pub fn new(handler: BoxedHandler) -> Self {
        Self { handler }
    }

    /// Continues the chain with `req`.
    ///
    /// The deeper handler is invoked when the returned future is first
    /// polled, so a panic below surfaces inside it.
    pub fn run(self, req: Request) -> BoxFuture {
        Box::pin(async move { self.handler.call(req).await })
    }

    pub fn into_handler(self) -> BoxedHandler {
        self.handler
    }
}

/// One layer: a middleware plus the handler it defers to.
struct Chain {
    middleware: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl RequestHandler for Chain {
    fn call(&self, req: Request) -> BoxFuture {
        self.middleware.handle(req, Next::new(Arc::clone(&self.next)))
    }
}

/// Returns `handler` wrapped in `middleware`, first element outermost.
pub fn apply(handler: BoxedHandler, middleware: &[Arc<dyn Middleware>]) -> BoxedHandler {
    middleware.iter().rev().fold(handler, |next, m| {
        Arc::new(Chain { middleware: Arc::clone(m), next })
    })
}

/// Decorator form of [`apply`], used by
/// [`RegistrationOptions::middlewares`](crate::RegistrationOptions::middlewares).
#[derive(Clone, Default)]
pub struct Stack {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

impl FromIterator<Arc<dyn Middleware>> for Stack {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Middleware>>>(iter: I) -> Self {
        Self { middleware: iter.into_iter().collect() }
    }
}

impl Decorator for Stack {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        apply(handler, &self.middleware)
    }
}
