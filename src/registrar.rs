//! Route registrars.
//!
//! A [`Registrar`] is the adapter between the orchestrator and one kind of
//! router: it knows how to bind a `(method, pattern, handler)` triple onto a
//! concrete router value. The orchestrator depends on this trait only and
//! never on a router type.
//!
//! | Registrar | Router requirement | Bound pattern |
//! |---|---|---|
//! | [`BindRegistrar`] (default) | `R: Bind` | `"<METHOD> <PATTERN>"` |
//! | [`from_fn`] | anything the closure accepts | closure decides |
//! | [`for_type`] | checked at registration time | closure decides |
//!
//! Routers with method-scoped registration calls (one call per method, path
//! template as a separate argument) get a small [`from_fn`] adapter:
//!
//! ```rust
//! use tsu_controller::{registrar, BoxedHandler, Route, Router};
//!
//! let method_scoped = registrar::from_fn(
//!     |router: &mut Router, handler: BoxedHandler, route: &Route<Router>| {
//!         router.route(route.method().clone(), route.pattern(), handler)
//!     },
//! );
//! # let _ = method_scoped;
//! ```

use std::any::{self, Any};
use std::marker::PhantomData;

use tracing::debug;

use crate::controller::Route;
use crate::error::Error;
use crate::handler::BoxedHandler;

/// The minimal router capability the default registrar needs: bind a
/// combined `"<METHOD> <PATTERN>"` string to a handler.
pub trait Bind {
    fn bind(&mut self, pattern: &str, handler: BoxedHandler) -> Result<(), Error>;
}

/// Strategy binding one route's handler onto a router of type `R`.
pub trait Registrar<R: ?Sized>: Send + Sync {
    fn register_handler(&self, router: &mut R, handler: BoxedHandler, route: &Route<R>) -> Result<(), Error>;
}

/// Binds `"<METHOD> <PATTERN>"` through [`Bind`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BindRegistrar;

impl<R: Bind + ?Sized> Registrar<R> for BindRegistrar {
    fn register_handler(&self, router: &mut R, handler: BoxedHandler, route: &Route<R>) -> Result<(), Error> {
        let pattern = format!("{} {}", route.method(), route.pattern());
        debug!(pattern = %pattern, "binding route");
        router.bind(&pattern, handler)
    }
}

/// A registrar backed by a closure.
pub struct FnRegistrar<F>(F);

/// Lifts a closure into a [`Registrar`].
pub fn from_fn<R, F>(f: F) -> FnRegistrar<F>
where
    R: ?Sized,
    F: Fn(&mut R, BoxedHandler, &Route<R>) -> Result<(), Error> + Send + Sync,
{
    FnRegistrar(f)
}

impl<R, F> Registrar<R> for FnRegistrar<F>
where
    R: ?Sized,
    F: Fn(&mut R, BoxedHandler, &Route<R>) -> Result<(), Error> + Send + Sync,
{
    fn register_handler(&self, router: &mut R, handler: BoxedHandler, route: &Route<R>) -> Result<(), Error> {
        (self.0)(router, handler, route)
    }
}

/// A registrar written for router type `T`, usable wherever the router type
/// is only known to be `'static`.
///
/// Registration fails with [`Error::RouterMismatch`] naming both types when
/// the router handed in is not a `T`.
pub struct TypedRegistrar<T, F> {
    f: F,
    _router: PhantomData<fn(&mut T)>,
}

/// Builds a [`TypedRegistrar`] for routers of type `T`.
///
/// ```rust
/// use tsu_controller::{registrar, Router};
/// use tsu_controller::registrar::Registrar;
///
/// let for_router = registrar::for_type::<Router, _>(|router, handler, route| {
///     router.route(route.method().clone(), route.pattern(), handler)
/// });
///
/// fn is_registrar<R: 'static>(_: &impl Registrar<R>) {}
/// is_registrar::<Router>(&for_router);
/// is_registrar::<String>(&for_router); // fails at registration time instead
/// ```
pub fn for_type<T, F>(f: F) -> TypedRegistrar<T, F>
where
    T: Any,
    F: Fn(&mut T, BoxedHandler, &RouteInfo<'_>) -> Result<(), Error> + Send + Sync,
{
    TypedRegistrar { f, _router: PhantomData }
}

impl<R, T, F> Registrar<R> for TypedRegistrar<T, F>
where
    R: Any,
    T: Any,
    F: Fn(&mut T, BoxedHandler, &RouteInfo<'_>) -> Result<(), Error> + Send + Sync,
{
    fn register_handler(&self, router: &mut R, handler: BoxedHandler, route: &Route<R>) -> Result<(), Error> {
        let router: &mut dyn Any = router;
        match router.downcast_mut::<T>() {
            Some(router) => (self.f)(router, handler, &route.info()),
            None => Err(Error::RouterMismatch {
                expected: any::type_name::<T>(),
                actual: any::type_name::<R>(),
            }),
        }
    }
}

/// Method and pattern of a route, independent of the router type.
#[derive(Clone, Copy, Debug)]
pub struct RouteInfo<'a> {
    pub method: &'a http::Method,
    pub pattern: &'a str,
}

impl RouteInfo<'_> {
    pub fn method(&self) -> &http::Method { self.method }
    pub fn pattern(&self) -> &str { self.pattern }
}
