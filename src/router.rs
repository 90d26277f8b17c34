//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup via [`matchit`]. This is
//! the bundled registration target: it implements [`Bind`] for the default
//! registrar and offers method-scoped [`Router::route`] for custom ones.
//! Matching itself is matchit's; this type only keeps the trees.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler, RequestHandler};
use crate::registrar::Bind;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup, then share it (e.g. in an `Arc`) with the
/// serving loop, which calls [`Router::handle`] per request.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if matchit rejects the path (malformed or conflicting).
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.route(method, path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Method-scoped registration.
    pub fn route(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .map_err(|e| Error::invalid_route(path, e))
    }

    pub fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Dispatches one request: fills its path parameters and calls the
    /// matching handler, or answers `404 Not Found`.
    pub async fn handle(&self, mut req: Request) -> Response {
        match self.lookup(&req.method, &req.path) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

/// Accepts `"<METHOD> <PATTERN>"`, e.g. `"GET /users/{id}"`.
impl Bind for Router {
    fn bind(&mut self, pattern: &str, handler: BoxedHandler) -> Result<(), Error> {
        let (method, path) = pattern
            .split_once(' ')
            .ok_or_else(|| Error::invalid_route(pattern, "expected `<METHOD> <PATTERN>`"))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| Error::invalid_route(pattern, e))?;
        self.route(method, path.trim_start(), handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_user(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("unknown"))
    }

    #[tokio::test]
    async fn dispatches_with_params() {
        let router = Router::new().on(Method::GET, "/users/{id}", get_user);

        let res = router.handle(Request::new(Method::GET, "/users/42")).await;
        assert_eq!(res.body(), b"user 42");

        let res = router.handle(Request::new(Method::POST, "/users/42")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = router.handle(Request::new(Method::GET, "/posts")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn binds_combined_pattern() {
        let mut router = Router::new();
        router.bind("DELETE /users/{id}", get_user.into_boxed_handler()).unwrap();

        assert!(router.lookup(&Method::DELETE, "/users/1").is_some());
        assert!(router.lookup(&Method::GET, "/users/1").is_none());
    }

    #[test]
    fn rejects_malformed_patterns() {
        let mut router = Router::new();
        let handler = get_user.into_boxed_handler();

        let err = router.bind("/users", Arc::clone(&handler)).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute { ref pattern, .. } if pattern == "/users"));

        router.bind("GET /users/{id}", Arc::clone(&handler)).unwrap();
        let err = router.bind("GET /users/{id}", handler).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute { .. }));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn on_panics_on_conflicting_route() {
        let _ = Router::new()
            .on(Method::GET, "/users/{id}", get_user)
            .on(Method::GET, "/users/{id}", get_user);
    }
}
