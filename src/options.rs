//! Registration options.

use std::sync::Arc;

use crate::controller::{self, Controller};
use crate::decorator::Decorator;
use crate::error::Error;
use crate::mapper::{DefaultMapper, HandlerMapper};
use crate::middleware::{Middleware, Stack};
use crate::registrar::{Bind, BindRegistrar, Registrar};

/// How far a per-route registrar override reaches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OverrideScope {
    /// The override applies to its own route only.
    #[default]
    Route,
    /// The override becomes the registrar for every later route of the same
    /// registration pass that does not carry its own.
    Sticky,
}

/// Everything one registration pass needs besides the router and the
/// controller.
///
/// Built once with the consuming setters below, then passed by reference to
/// [`register_controller`](crate::register_controller) as often as needed.
///
/// | Field | Default |
/// |---|---|
/// | mapper | [`DefaultMapper`] |
/// | registrar | [`BindRegistrar`] (requires `R: Bind`) |
/// | decorators | none |
/// | override scope | [`OverrideScope::Route`] |
///
/// ```rust
/// use tsu_controller::{decorator, RegistrationOptions, Router};
///
/// let options = RegistrationOptions::<Router>::new()
///     .decorator(decorator::from_fn(|h| h));
/// assert_eq!(options.decorators().len(), 1);
/// ```
pub struct RegistrationOptions<R: ?Sized> {
    pub(crate) mapper: Arc<dyn HandlerMapper>,
    pub(crate) registrar: Arc<dyn Registrar<R>>,
    pub(crate) decorators: Vec<Arc<dyn Decorator>>,
    pub(crate) override_scope: OverrideScope,
}

impl<R: Bind + ?Sized> RegistrationOptions<R> {
    /// Defaults for routers that expose [`Bind`].
    pub fn new() -> Self {
        Self::with_registrar(BindRegistrar)
    }
}

impl<R: Bind + ?Sized> Default for RegistrationOptions<R> {
    fn default() -> Self { Self::new() }
}

impl<R: ?Sized> RegistrationOptions<R> {
    /// Defaults, with `registrar` in place of [`BindRegistrar`]. Routers
    /// without [`Bind`] start here.
    pub fn with_registrar(registrar: impl Registrar<R> + 'static) -> Self {
        Self {
            mapper: Arc::new(DefaultMapper),
            registrar: Arc::new(registrar),
            decorators: Vec::new(),
            override_scope: OverrideScope::default(),
        }
    }

    /// Replaces the handler mapper.
    pub fn mapper(mut self, mapper: impl HandlerMapper + 'static) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    /// Replaces the registrar used by routes without their own.
    pub fn registrar(mut self, registrar: impl Registrar<R> + 'static) -> Self {
        self.registrar = Arc::new(registrar);
        self
    }

    /// Appends a decorator. Earlier decorators wrap later ones.
    pub fn decorator(mut self, decorator: impl Decorator + 'static) -> Self {
        self.decorators.push(Arc::new(decorator));
        self
    }

    /// Appends one middleware as a decorator.
    pub fn middleware(self, middleware: impl Middleware) -> Self {
        self.middlewares([Arc::new(middleware) as Arc<dyn Middleware>])
    }

    /// Appends a decorator that applies `middlewares` in the given order.
    pub fn middlewares<I>(self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.decorator(middlewares.into_iter().collect::<Stack>())
    }

    pub fn override_scope(mut self, scope: OverrideScope) -> Self {
        self.override_scope = scope;
        self
    }

    pub fn decorators(&self) -> &[Arc<dyn Decorator>] {
        &self.decorators
    }

    pub fn scope(&self) -> OverrideScope {
        self.override_scope
    }

    /// Registers every route of `controller` on `router`.
    ///
    /// Same as [`register_controller`](crate::register_controller).
    pub fn register<C>(&self, router: &mut R, controller: &C) -> Result<(), Error>
    where
        C: Controller<R> + ?Sized,
    {
        controller::register_controller(router, controller, self)
    }
}
