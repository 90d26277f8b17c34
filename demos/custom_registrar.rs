//! Registering onto routers that do not speak `"<METHOD> <PATTERN>"`.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example custom_registrar

use std::collections::BTreeMap;

use http::Method;
use tsu_controller::mapper::HandlerValue;
use tsu_controller::{
    BoxedHandler, Controller, Error, OverrideScope, RegistrationOptions, Request, Route, Router,
    registrar,
};

/// A router keyed by `(method, path)` with no pattern syntax at all.
#[derive(Default)]
struct Table {
    entries: BTreeMap<(String, String), BoxedHandler>,
}

impl Table {
    fn insert(&mut self, method: &Method, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        let key = (method.to_string(), path.to_owned());
        if self.entries.contains_key(&key) {
            return Err(Error::InvalidRoute {
                pattern: path.to_owned(),
                reason: "already registered".to_owned(),
            });
        }
        self.entries.insert(key, handler);
        Ok(())
    }
}

/// Works on any router type.
struct Status;

impl<R: ?Sized> Controller<R> for Status {
    fn routes(&self) -> Vec<Route<R>> {
        vec![
            Route::new(Method::GET, "/status", HandlerValue::func(status)),
            Route::new(Method::GET, "/version", HandlerValue::func(version)),
        ]
    }
}

async fn status(_req: Request) -> &'static str {
    "ok"
}

async fn version(_req: Request) -> &'static str {
    env!("CARGO_PKG_VERSION")
}

struct Admin;

impl Controller for Admin {
    fn routes(&self) -> Vec<Route> {
        vec![
            Route::new(Method::GET, "/users", HandlerValue::func(status)),
            // Bound under /internal regardless of the configured registrar.
            Route::new(Method::POST, "/reindex", HandlerValue::func(status)).with_registrar(
                registrar::from_fn(|router: &mut Router, handler, route: &Route<Router>| {
                    router.route(route.method().clone(), &format!("/internal{}", route.pattern()), handler)
                }),
            ),
            Route::new(Method::DELETE, "/cache", HandlerValue::func(status)),
        ]
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    // Method-scoped registration with a path prefix.
    let prefixed = registrar::from_fn(|router: &mut Router, handler, route: &Route<Router>| {
        router.route(route.method().clone(), &format!("/api{}", route.pattern()), handler)
    });

    let mut router = Router::new();
    RegistrationOptions::with_registrar(prefixed).register(&mut router, &Admin)?;
    RegistrationOptions::new().register(&mut router, &Status)?;

    // With a sticky override, /cache follows /reindex under /internal.
    let mut sticky = Router::new();
    RegistrationOptions::new()
        .override_scope(OverrideScope::Sticky)
        .register(&mut sticky, &Admin)?;
    println!("sticky: DELETE /internal/cache: {}", sticky.lookup(&Method::DELETE, "/internal/cache").is_some());

    for (method, path) in [
        (Method::GET, "/api/users"),
        (Method::POST, "/internal/reindex"),
        (Method::DELETE, "/api/cache"),
        (Method::GET, "/status"),
    ] {
        println!("{method} {path}: {}", router.lookup(&method, path).is_some());
    }

    // A router without `Bind`, reached through a type-checked registrar.
    let mut table = Table::default();
    let options = RegistrationOptions::with_registrar(registrar::for_type::<Table, _>(
        |table, handler, route| table.insert(route.method(), route.pattern(), handler),
    ));
    options.register(&mut table, &Status)?;
    for (method, path) in table.entries.keys() {
        println!("table: {method} {path}");
    }

    Ok(())
}
