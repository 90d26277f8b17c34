//! # tsu-controller
//!
//! Declarative controller registration and middleware chaining for HTTP
//! routers.
//!
//! ## The contract
//!
//! A controller lists its routes. This crate turns each route's handler into
//! one canonical request handler, wraps it in the configured decorators and
//! middlewares, and binds it onto whatever router you hand in through a
//! registrar. That is all. It does not serve HTTP and it does not match
//! paths; the host and the router do.
//!
//! - [`mapper`] — normalizes a route's [`HandlerValue`](mapper::HandlerValue)
//!   into a [`BoxedHandler`]
//! - [`decorator`] / [`middleware`] — ordered chains, first element outermost
//! - [`registrar`] — binds a handler onto a router ([`Bind`] for the common shape)
//! - [`register_controller`] — the registration pass tying them together
//!
//! ## Quick start
//!
//! ```rust
//! use std::io::Write;
//! use http::Method;
//! use tsu_controller::mapper::HandlerValue;
//! use tsu_controller::middleware::Next;
//! use tsu_controller::{ContentType, Controller, Request, RegistrationOptions, Response, Route, Router};
//!
//! struct Hello;
//!
//! impl Controller for Hello {
//!     fn routes(&self) -> Vec<Route> {
//!         vec![
//!             Route::new(Method::GET, "/hello", HandlerValue::writer(|w, req| {
//!                 let name = req.header("x-name").unwrap_or("anonymous");
//!                 let _ = write!(w, "Hello, {name}!");
//!             })),
//!             Route::new(Method::POST, "/echo", HandlerValue::func(echo)),
//!         ]
//!     }
//! }
//!
//! async fn echo(req: Request) -> Response {
//!     Response::builder().bytes(ContentType::OctetStream, req.body().to_vec())
//! }
//!
//! async fn timing(req: Request, next: Next) -> Response {
//!     let started = std::time::Instant::now();
//!     let res = next.run(req).await;
//!     tracing::info!(elapsed = ?started.elapsed(), "request handled");
//!     res
//! }
//!
//! let mut router = Router::new();
//! let options = RegistrationOptions::<Router>::new().middleware(timing);
//! options.register(&mut router, &Hello).unwrap();
//! ```

mod controller;
mod error;
mod handler;
mod options;
mod request;
mod response;
mod router;

pub mod decorator;
pub mod mapper;
pub mod middleware;
pub mod registrar;

pub use controller::{Controller, Route, must_register_controller, register_controller};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, Handler, RequestHandler};
pub use options::{OverrideScope, RegistrationOptions};
pub use registrar::{Bind, Registrar};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder, ResponseWriter};
pub use router::Router;
