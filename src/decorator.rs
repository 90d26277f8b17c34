//! Decorator chains.
//!
//! A [`Decorator`] is a pure composition step: it receives a handler and
//! returns a handler that wraps it. Side effects only happen later, when the
//! wrapped handler runs.
//!
//! [`decorate`] applies a list so that the first decorator ends up
//! outermost: `[a, b, c]` around `h` behaves as `a(b(c(h)))`.

use std::sync::Arc;

use crate::handler::BoxedHandler;

/// Wraps a canonical handler in another one.
pub trait Decorator: Send + Sync {
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler;
}

/// A decorator backed by a closure.
pub struct FnDecorator<F>(F);

/// Lifts a closure into a [`Decorator`].
pub fn from_fn<F>(f: F) -> FnDecorator<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    FnDecorator(f)
}

impl<F> Decorator for FnDecorator<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync,
{
    fn decorate(&self, handler: BoxedHandler) -> BoxedHandler {
        (self.0)(handler)
    }
}

/// Wraps `terminal` in `decorators`, first element outermost.
///
/// Built back to front: the last decorator wraps `terminal` first.
pub fn decorate(terminal: BoxedHandler, decorators: &[Arc<dyn Decorator>]) -> BoxedHandler {
    decorators.iter().rev().fold(terminal, |current, d| d.decorate(current))
}
