//! Controllers registered onto the bundled router and served over hyper.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/hello -H 'x-name: alice'
//!   curl -X POST http://localhost:3000/echo -d 'ping'
//!   curl http://localhost:3000/users/42
//!   curl -X DELETE http://localhost:3000/users/42

use std::convert::Infallible;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tsu_controller::mapper::HandlerValue;
use tsu_controller::{
    BoxFuture, Controller, IntoResponse, Request, RequestHandler, RegistrationOptions, Response,
    ResponseWriter, Route, Router, must_register_controller,
};

/// A stateful handler: greets with a configured salutation.
struct Hello {
    salutation: &'static str,
}

impl RequestHandler for Hello {
    fn call(&self, req: Request) -> BoxFuture {
        let name = req.header("x-name").unwrap_or("anonymous").to_owned();
        let body = format!("{}, {name}!", self.salutation);
        Box::pin(async move { body.into_response() })
    }
}

struct Greetings;

impl Controller for Greetings {
    fn routes(&self) -> Vec<Route> {
        vec![
            Route::new(Method::GET, "/hello", HandlerValue::handler(Hello { salutation: "Hello" })),
            Route::new(Method::POST, "/echo", HandlerValue::writer(echo)),
        ]
    }
}

fn echo(w: &mut ResponseWriter, req: &Request) {
    w.set_header("content-type", "text/plain");
    let _ = w.write_all(req.body());
}

struct Users;

impl Controller for Users {
    fn routes(&self) -> Vec<Route> {
        vec![
            Route::new(Method::GET, "/users/{id}", HandlerValue::func(get_user)),
            Route::new(Method::DELETE, "/users/{id}", HandlerValue::func(delete_user)),
        ]
    }
}

async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let mut router = Router::new();
    let options = RegistrationOptions::new();
    must_register_controller(&mut router, &Greetings, &options);
    must_register_controller(&mut router, &Users, &options);

    serve("0.0.0.0:3000".parse().expect("valid socket address"), router).await
}

/// Accepts connections until Ctrl-C or SIGTERM, then drains in-flight ones.
async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let router = Arc::new(router);
    info!(%addr, "listening");

    let mut tasks = tokio::task::JoinSet::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let router = Arc::clone(&router);
                let io = TokioIo::new(stream);

                tasks.spawn(async move {
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(&router, req).await }
                    });

                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(io, svc)
                        .await
                    {
                        error!(%peer, "connection error: {e}");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}

    info!("stopped");
    Ok(())
}

async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let response = match body.collect().await {
        Ok(collected) => {
            let req = http::Request::from_parts(parts, collected.to_bytes());
            router.handle(Request::from(req)).await
        }
        Err(e) => {
            error!("failed to read request body: {e}");
            Response::status(StatusCode::BAD_REQUEST)
        }
    };
    Ok(response.into_http().map(Full::new))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }
}
