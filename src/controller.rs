//! Controllers and the registration pass.
//!
//! A [`Controller`] declares its routes; [`register_controller`] binds them:
//!
//! ```text
//! controller.routes()                       ← declared order
//!        ↓ for each route
//! mapper.map_handler(route.handler())       ← canonical BoxedHandler
//!        ↓
//! decorator::decorate(handler, decorators)  ← only if any are configured
//!        ↓
//! registrar.register_handler(router, …)     ← route override, else current
//! ```
//!
//! The first failing step aborts the pass and its error is returned. Routes
//! bound before the failure stay bound.
//!
//! ```rust
//! use tsu_controller::{register_controller, Request, RegistrationOptions, Route, Router};
//! use tsu_controller::mapper::HandlerValue;
//! use tsu_controller::Controller;
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn routes(&self) -> Vec<Route> {
//!         vec![
//!             Route::new(http::Method::GET, "/users/{id}", HandlerValue::func(get_user)),
//!             Route::new(http::Method::DELETE, "/users/{id}", HandlerValue::func(delete_user)),
//!         ]
//!     }
//! }
//!
//! async fn get_user(req: Request) -> String {
//!     format!("user {}", req.param("id").unwrap_or("unknown"))
//! }
//!
//! async fn delete_user(_req: Request) -> http::StatusCode {
//!     http::StatusCode::NO_CONTENT
//! }
//!
//! let mut router = Router::new();
//! register_controller(&mut router, &Users, &RegistrationOptions::new()).unwrap();
//! assert!(router.lookup(&http::Method::GET, "/users/7").is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::{debug, info, warn};

use crate::decorator;
use crate::error::Error;
use crate::mapper::HandlerValue;
use crate::options::{OverrideScope, RegistrationOptions};
use crate::registrar::{Registrar, RouteInfo};
use crate::router::Router;

/// One declared route.
///
/// `method` and `pattern` are passed to the registrar untouched; their
/// meaning is up to the router.
pub struct Route<R: ?Sized = Router> {
    method: Method,
    pattern: String,
    handler: HandlerValue,
    registrar: Option<Arc<dyn Registrar<R>>>,
}

impl<R: ?Sized> Route<R> {
    pub fn new(method: Method, pattern: impl Into<String>, handler: HandlerValue) -> Self {
        Self { method, pattern: pattern.into(), handler, registrar: None }
    }

    /// Binds this route with `registrar` instead of the configured one.
    pub fn with_registrar(mut self, registrar: impl Registrar<R> + 'static) -> Self {
        self.registrar = Some(Arc::new(registrar));
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn handler(&self) -> &HandlerValue { &self.handler }
    pub fn registrar(&self) -> Option<&Arc<dyn Registrar<R>>> { self.registrar.as_ref() }

    pub fn info(&self) -> RouteInfo<'_> {
        RouteInfo { method: &self.method, pattern: &self.pattern }
    }
}

impl<R: ?Sized> fmt::Debug for Route<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handler", &self.handler)
            .field("registrar", &self.registrar.is_some())
            .finish()
    }
}

/// A collaborator exposing routes to register on routers of type `R`.
///
/// Controllers indifferent to the router type implement it for every `R`:
///
/// ```rust
/// use tsu_controller::{Controller, Route, mapper::HandlerValue};
///
/// struct Health;
///
/// impl<R: ?Sized> Controller<R> for Health {
///     fn routes(&self) -> Vec<Route<R>> {
///         vec![Route::new(http::Method::GET, "/healthz", HandlerValue::writer(|w, _| {
///             use std::io::Write;
///             let _ = w.write_all(b"ok");
///         }))]
///     }
/// }
/// ```
pub trait Controller<R: ?Sized = Router> {
    fn routes(&self) -> Vec<Route<R>>;
}

/// Registers every route of `controller` on `router`, in declared order.
///
/// Returns the first error any step raises; nothing is rolled back.
pub fn register_controller<R, C>(
    router: &mut R,
    controller: &C,
    options: &RegistrationOptions<R>,
) -> Result<(), Error>
where
    R: ?Sized,
    C: Controller<R> + ?Sized,
{
    let routes = controller.routes();
    let mut current = &options.registrar;

    for route in &routes {
        bind_route(router, route, current, options).inspect_err(|e| {
            warn!(method = %route.method(), pattern = route.pattern(), error = %e, "route registration failed");
        })?;
        if let (Some(own), OverrideScope::Sticky) = (route.registrar(), options.override_scope) {
            current = own;
        }
    }

    info!(routes = routes.len(), "controller registered");
    Ok(())
}

fn bind_route<R: ?Sized>(
    router: &mut R,
    route: &Route<R>,
    current: &Arc<dyn Registrar<R>>,
    options: &RegistrationOptions<R>,
) -> Result<(), Error> {
    let mut handler = options.mapper.map_handler(route.handler())?;
    if !options.decorators.is_empty() {
        handler = decorator::decorate(handler, &options.decorators);
    }
    let registrar = route.registrar().unwrap_or(current);
    registrar.register_handler(router, handler, route)?;
    debug!(method = %route.method(), pattern = route.pattern(), "route registered");
    Ok(())
}

/// Like [`register_controller`], but panics on failure.
///
/// For startup wiring, where a registration failure means the process
/// cannot serve anyway.
///
/// # Panics
///
/// Panics with the registration error.
pub fn must_register_controller<R, C>(router: &mut R, controller: &C, options: &RegistrationOptions<R>)
where
    R: ?Sized,
    C: Controller<R> + ?Sized,
{
    if let Err(e) = register_controller(router, controller, options) {
        panic!("failed to register controller: {e}");
    }
}
