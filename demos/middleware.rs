//! Middleware and decorators configured once for a whole controller.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example middleware
//!
//! Requests are dispatched in-process; nothing listens on a socket.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures::FutureExt;
use http::{Method, StatusCode};
use tracing::{error, info};
use tsu_controller::mapper::HandlerValue;
use tsu_controller::middleware::{Middleware, Next};
use tsu_controller::{
    BoxFuture, Controller, RegistrationOptions, Request, Response, Route, Router, decorator,
    register_controller,
};

struct Reports;

impl Controller for Reports {
    fn routes(&self) -> Vec<Route> {
        vec![
            Route::new(Method::GET, "/reports/{id}", HandlerValue::func(report)),
            Route::new(Method::GET, "/reports/{id}/broken", HandlerValue::func(broken)),
        ]
    }
}

async fn report(req: Request) -> String {
    format!("report {}", req.param("id").unwrap_or("?"))
}

async fn broken(_req: Request) -> Response {
    panic!("report renderer crashed")
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.path().to_owned();
    let started = Instant::now();
    let res = next.run(req).await;
    info!(%method, %path, status = %res.status_code(), elapsed = ?started.elapsed(), "request");
    res
}

/// Turns a panic anywhere below into `500 Internal Server Error`.
async fn recover(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("unknown panic");
            error!(panic = msg, "handler panicked");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Stamps every response with a sequence number.
struct RequestCounter {
    seen: AtomicU64,
}

impl Middleware for RequestCounter {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        Box::pin(async move {
            let res = next.run(req).await;
            info!(request = n, "counted");
            res
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let counter: Arc<dyn Middleware> = Arc::new(RequestCounter { seen: AtomicU64::new(0) });
    let options = RegistrationOptions::<Router>::new()
        .decorator(decorator::from_fn(|handler| {
            info!("decorating handler");
            handler
        }))
        .middlewares([
            Arc::new(log_requests) as Arc<dyn Middleware>,
            Arc::new(recover) as Arc<dyn Middleware>,
            counter,
        ]);

    let mut router = Router::new();
    if let Err(e) = register_controller(&mut router, &Reports, &options) {
        error!("registration failed: {e}");
        return;
    }

    for path in ["/reports/7", "/reports/7/broken", "/missing"] {
        let res = router.handle(Request::new(Method::GET, path)).await;
        println!("GET {path} -> {} {}", res.status_code(), String::from_utf8_lossy(res.body()));
    }
}
