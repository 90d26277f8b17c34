use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use tsu_controller::mapper::{self, HandlerValue};
use tsu_controller::middleware::{self, Middleware, Next};
use tsu_controller::registrar::{self, RouteInfo};
use tsu_controller::{
    Bind, BoxedHandler, Controller, Error, OverrideScope, Registrar, RegistrationOptions, Request,
    RequestHandler,
    Response, ResponseWriter, Route, Router, decorator, must_register_controller, register_controller,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Records every `bind` call instead of routing.
#[derive(Default)]
struct MockMux {
    bound: Vec<(String, BoxedHandler)>,
}

impl MockMux {
    fn patterns(&self) -> Vec<&str> {
        self.bound.iter().map(|(p, _)| p.as_str()).collect()
    }

    fn handler(&self, pattern: &str) -> &BoxedHandler {
        &self.bound.iter().find(|(p, _)| p == pattern).unwrap().1
    }
}

impl Bind for MockMux {
    fn bind(&mut self, pattern: &str, handler: BoxedHandler) -> Result<(), Error> {
        self.bound.push((pattern.to_owned(), handler));
        Ok(())
    }
}

/// A controller whose routes are built by a closure on every call.
struct Routes<R: ?Sized>(Box<dyn Fn() -> Vec<Route<R>>>);

impl<R: ?Sized> Controller<R> for Routes<R> {
    fn routes(&self) -> Vec<Route<R>> {
        (self.0)()
    }
}

fn hello<R: ?Sized>(method: Method, pattern: &str) -> Route<R> {
    Route::new(method, pattern, HandlerValue::writer(|w, req| {
        let _ = write!(w, "hello from {}", req.path());
    }))
}

fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

/// A registrar that only counts how often it is asked to bind.
fn counting<R: Bind + ?Sized + 'static>(calls: &Arc<AtomicUsize>) -> impl Registrar<R> + 'static {
    let calls = Arc::clone(calls);
    registrar::from_fn(move |router: &mut R, handler: BoxedHandler, route: &Route<R>| {
        calls.fetch_add(1, Ordering::SeqCst);
        router.bind(&format!("counted {}", route.pattern()), handler)
    })
}

// ── Default path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn registers_writer_function_with_combined_pattern() {
    let controller: Routes<MockMux> = Routes(Box::new(|| vec![hello(Method::GET, "/api/function")]));
    let mut mux = MockMux::default();

    register_controller(&mut mux, &controller, &RegistrationOptions::new()).unwrap();

    assert_eq!(mux.patterns(), ["GET /api/function"]);
    let res = mux.handler("GET /api/function").call(get("/api/function")).await;
    assert_eq!(res.body(), b"hello from /api/function");
}

#[test]
fn binds_once_per_route_in_declared_order() {
    let controller: Routes<MockMux> = Routes(Box::new(|| {
        vec![
            hello(Method::GET, "/a"),
            hello(Method::POST, "/b"),
            hello(Method::DELETE, "/c/{id}"),
        ]
    }));
    let mut mux = MockMux::default();

    RegistrationOptions::new().register(&mut mux, &controller).unwrap();

    assert_eq!(mux.patterns(), ["GET /a", "POST /b", "DELETE /c/{id}"]);
}

#[test]
fn unmappable_handler_registers_nothing() {
    let controller: Routes<MockMux> =
        Routes(Box::new(|| vec![Route::new(Method::GET, "/", HandlerValue::opaque(17_i64))]));
    let mut mux = MockMux::default();

    let err = register_controller(&mut mux, &controller, &RegistrationOptions::new()).unwrap_err();

    assert!(matches!(err, Error::HandlerMapping { type_name: "i64" }));
    assert!(mux.bound.is_empty());
}

#[test]
fn first_error_aborts_without_rollback() {
    let controller: Routes<MockMux> = Routes(Box::new(|| {
        vec![
            hello(Method::GET, "/first"),
            Route::new(Method::GET, "/broken", HandlerValue::opaque("not a handler")),
            hello(Method::GET, "/never"),
        ]
    }));
    let mut mux = MockMux::default();

    let err = register_controller(&mut mux, &controller, &RegistrationOptions::new()).unwrap_err();

    assert!(matches!(err, Error::HandlerMapping { .. }));
    assert_eq!(mux.patterns(), ["GET /first"]);
}

#[tokio::test]
async fn custom_mapper_replaces_default() {
    let controller: Routes<MockMux> = Routes(Box::new(|| {
        vec![Route::new(Method::GET, "/ping", HandlerValue::opaque("pong"))]
    }));
    let text_mapper = mapper::from_fn(|value: &HandlerValue| match value {
        HandlerValue::Opaque { value, type_name } => {
            let text: &'static str = *value
                .downcast_ref::<&'static str>()
                .ok_or(Error::HandlerMapping { type_name: *type_name })?;
            Ok(mapper::writer_handler(Arc::new(move |w: &mut ResponseWriter, _: &Request| {
                let _ = w.write_all(text.as_bytes());
            })))
        }
        other => Err(Error::HandlerMapping { type_name: other.type_name() }),
    });
    let mut mux = MockMux::default();

    RegistrationOptions::new().mapper(text_mapper).register(&mut mux, &controller).unwrap();

    let res = mux.handler("GET /ping").call(get("/ping")).await;
    assert_eq!(res.body(), b"pong");
}

// ── Router mismatch ───────────────────────────────────────────────────────────

#[test]
fn router_mismatch_names_the_router_type() {
    let for_router = registrar::for_type::<Router, _>(|router, handler, route: &RouteInfo<'_>| {
        router.route(route.method().clone(), route.pattern(), handler)
    });
    let controller: Routes<Vec<String>> = Routes(Box::new(|| vec![hello(Method::GET, "/")]));
    let mut not_a_router: Vec<String> = Vec::new();

    let err = register_controller(
        &mut not_a_router,
        &controller,
        &RegistrationOptions::with_registrar(for_router),
    )
    .unwrap_err();

    match err {
        Error::RouterMismatch { expected, actual } => {
            assert_eq!(expected, std::any::type_name::<Router>());
            assert_eq!(actual, std::any::type_name::<Vec<String>>());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(not_a_router.is_empty());
}

#[tokio::test]
async fn typed_registrar_binds_matching_router() {
    let for_router = registrar::for_type::<Router, _>(|router, handler, route: &RouteInfo<'_>| {
        router.route(route.method().clone(), route.pattern(), handler)
    });
    let controller: Routes<Router> = Routes(Box::new(|| vec![hello(Method::GET, "/users/{id}")]));
    let mut router = Router::new();

    register_controller(&mut router, &controller, &RegistrationOptions::with_registrar(for_router)).unwrap();

    let res = router.handle(get("/users/9")).await;
    assert_eq!(res.body(), b"hello from /users/9");
}

// ── Per-route registrar overrides ─────────────────────────────────────────────

fn override_controller(calls: Arc<AtomicUsize>) -> Routes<MockMux> {
    Routes(Box::new(move || {
        vec![
            hello(Method::GET, "/plain"),
            hello(Method::GET, "/own").with_registrar(counting::<MockMux>(&calls)),
            hello(Method::GET, "/after"),
        ]
    }))
}

#[test]
fn override_is_route_local_by_default() {
    let own_calls = Arc::new(AtomicUsize::new(0));
    let global_calls = Arc::new(AtomicUsize::new(0));
    let mut mux = MockMux::default();

    let options = RegistrationOptions::with_registrar(counting::<MockMux>(&global_calls));
    assert_eq!(options.scope(), OverrideScope::Route);
    options.register(&mut mux, &override_controller(Arc::clone(&own_calls))).unwrap();

    assert_eq!(mux.patterns(), ["counted /plain", "counted /own", "counted /after"]);
    assert_eq!(own_calls.load(Ordering::SeqCst), 1);
    assert_eq!(global_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn sticky_override_persists_for_later_routes() {
    let own_calls = Arc::new(AtomicUsize::new(0));
    let mut mux = MockMux::default();

    RegistrationOptions::new()
        .override_scope(OverrideScope::Sticky)
        .register(&mut mux, &override_controller(Arc::clone(&own_calls)))
        .unwrap();

    assert_eq!(mux.patterns(), ["GET /plain", "counted /own", "counted /after"]);
    assert_eq!(own_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn sticky_override_does_not_leak_into_next_pass() {
    let own_calls = Arc::new(AtomicUsize::new(0));
    let options = RegistrationOptions::new().override_scope(OverrideScope::Sticky);

    let mut first = MockMux::default();
    options.register(&mut first, &override_controller(Arc::clone(&own_calls))).unwrap();

    let mut second = MockMux::default();
    let plain: Routes<MockMux> = Routes(Box::new(|| vec![hello(Method::GET, "/plain")]));
    options.register(&mut second, &plain).unwrap();

    assert_eq!(second.patterns(), ["GET /plain"]);
}

// ── Decorators and middlewares ────────────────────────────────────────────────

type Log = Arc<Mutex<Vec<&'static str>>>;

/// Logs `name` before and after the rest of the chain.
fn recorder(name: &'static str, log: &Log) -> Arc<dyn Middleware> {
    let log = Arc::clone(log);
    Arc::new(move |req: Request, next: Next| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(name);
            let res = next.run(req).await;
            log.lock().unwrap().push(name);
            res
        }
    })
}

#[tokio::test]
async fn decorators_and_middlewares_wrap_in_declared_order() {
    let log = Log::default();

    let outer = [recorder("outer", &log)];
    let options = RegistrationOptions::<Router>::new()
        .decorator(decorator::from_fn(move |h| middleware::apply(h, &outer)))
        .middlewares([recorder("first", &log), recorder("second", &log)])
        .middlewares([recorder("third", &log)]);

    let handler_log = Arc::clone(&log);
    let controller: Routes<Router> = Routes(Box::new(move || {
        let log = Arc::clone(&handler_log);
        vec![Route::new(Method::GET, "/", HandlerValue::writer(move |_, _| {
            log.lock().unwrap().push("handler");
        }))]
    }));

    let mut router = Router::new();
    options.register(&mut router, &controller).unwrap();
    router.handle(get("/")).await;

    assert_eq!(
        *log.lock().unwrap(),
        ["outer", "first", "second", "third", "handler", "third", "second", "first", "outer"]
    );
}

#[tokio::test]
async fn short_circuiting_middleware_hides_the_handler() {
    let handled = Arc::new(AtomicUsize::new(0));
    let deny = |_req: Request, _next: Next| async { StatusCode::UNAUTHORIZED };

    let counter = Arc::clone(&handled);
    let controller: Routes<Router> = Routes(Box::new(move || {
        let counter = Arc::clone(&counter);
        vec![Route::new(Method::GET, "/secret", HandlerValue::writer(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))]
    }));

    let mut router = Router::new();
    RegistrationOptions::new().middleware(deny).register(&mut router, &controller).unwrap();
    let res: Response = router.handle(get("/secret")).await;

    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(handled.load(Ordering::SeqCst), 0);
}

// ── Panicking entry point ─────────────────────────────────────────────────────

#[test]
fn must_register_succeeds_quietly() {
    let controller: Routes<MockMux> = Routes(Box::new(|| vec![hello(Method::GET, "/ok")]));
    let mut mux = MockMux::default();
    must_register_controller(&mut mux, &controller, &RegistrationOptions::new());
    assert_eq!(mux.patterns(), ["GET /ok"]);
}

#[test]
#[should_panic(expected = "failed to register controller")]
fn must_register_panics_on_failure() {
    let controller: Routes<MockMux> =
        Routes(Box::new(|| vec![Route::new(Method::GET, "/", HandlerValue::opaque(()))]));
    let mut mux = MockMux::default();
    must_register_controller(&mut mux, &controller, &RegistrationOptions::new());
}
