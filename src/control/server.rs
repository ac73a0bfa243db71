//! HTTP control server.
//!
//! Serves `/stats`, `/rules` and `/rules/set` on `127.0.0.1:<port>` from a
//! background tokio task. The server is created idle; [`ControlServer::start`]
//! binds and spawns it, [`ControlServer::stop`] drains it within a deadline.

use super::{BotInfo, Rule};
use crate::error::ControlError;
use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};

/// Maximum time spent reading request headers, and separately the body.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time spent producing a response.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause after a failed `accept` before retrying.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 64 * 1024;

type SharedInfo = Arc<dyn BotInfo>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

/// Body of `POST /rules/set`. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct SetRuleRequest {
    name: Option<String>,
    key: Option<String>,
    value: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Handler for GET /stats.
async fn stats_handler(State(info): State<SharedInfo>) -> Response {
    match info.stats() {
        Some(stats) => Json(stats).into_response(),
        None => error_response(StatusCode::INTERNAL_SERVER_ERROR, "stats unavailable"),
    }
}

/// Handler for GET /rules.
async fn rules_handler(State(info): State<SharedInfo>) -> Json<Vec<Rule>> {
    Json(info.rules().unwrap_or_default())
}

/// Handler for POST /rules/set.
async fn set_rule_handler(State(info): State<SharedInfo>, request: Request) -> Response {
    let body = match tokio::time::timeout(
        READ_TIMEOUT,
        to_bytes(request.into_body(), MAX_BODY_BYTES),
    )
    .await
    {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            return error_response(StatusCode::BAD_REQUEST, format!("failed to read body: {e}"));
        }
        Err(_) => {
            return error_response(StatusCode::REQUEST_TIMEOUT, "timed out reading request body");
        }
    };

    let request: SetRuleRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("invalid JSON body: {e}"));
        }
    };

    let Some(name) = request.name.filter(|n| !n.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "name is required");
    };
    let Some(key) = request.key.filter(|k| !k.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "key is required");
    };
    let value = request.value.unwrap_or_default();

    match info.set_rule(&name, &key, &value) {
        Ok(()) => {
            info!(rule = %name, key = %key, "Rule updated via control API");
            Json(StatusBody { status: "ok" }).into_response()
        }
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            warn!(
                rule = %name,
                key = %key,
                error = %e,
                code = e.error_code(),
                "Rule update failed"
            );
            error_response(status, e.to_string())
        }
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

/// Bound the whole request/response cycle and log it.
async fn request_guard(request: Request, next: Next) -> Response {
    let span = crate::telemetry::spans::control_request(
        request.method().as_str(),
        request.uri().path(),
    );
    async move {
        let response = match tokio::time::timeout(WRITE_TIMEOUT, next.run(request)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(timeout = ?WRITE_TIMEOUT, "Control request timed out");
                error_response(StatusCode::SERVICE_UNAVAILABLE, "request timed out")
            }
        };
        debug!(status = response.status().as_u16(), "Control request served");
        response
    }
    .instrument(span)
    .await
}

/// Build the control API router over `info`.
pub fn router(info: SharedInfo) -> Router {
    Router::new()
        .route(
            "/stats",
            get(stats_handler)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/rules",
            get(rules_handler)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/rules/set",
            post(set_rule_handler).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(from_fn(request_guard))
        .with_state(info)
}

/// Accept loop. Each connection runs on its own task in a `JoinSet`, so
/// aborting this task also aborts every connection it spawned.
///
/// Once `shutdown` fires (or its sender is dropped) the listener is closed,
/// every connection is asked to finish its current request, and the loop
/// waits for them.
async fn serve(listener: TcpListener, app: Router, mut shutdown: oneshot::Receiver<()>) {
    let (drain_tx, drain_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let conn = serve_connection(stream, peer, app.clone(), drain_rx.clone());
                    connections.spawn(conn);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to accept control connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    let _ = drain_tx.send(true);
    debug!(connections = connections.len(), "Draining control connections");
    while connections.join_next().await.is_some() {}
}

/// Serve one HTTP/1 connection. Request headers must arrive within
/// [`READ_TIMEOUT`] or the connection is closed.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    app: Router,
    mut drain: watch::Receiver<bool>,
) {
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(READ_TIMEOUT);
    let conn = builder.serve_connection(TokioIo::new(stream), TowerToHyperService::new(app));
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                debug!(peer = %peer, error = %e, "Control connection closed with error");
            }
            return;
        }
        _ = drain.changed() => {}
    }

    conn.as_mut().graceful_shutdown();
    if let Err(e) = conn.await {
        debug!(peer = %peer, error = %e, "Control connection closed with error");
    }
}

struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Loopback-only HTTP control server.
///
/// `start` fails while already listening; `stop` is a no-op when not
/// listening. After `stop` the server may be started again.
pub struct ControlServer {
    port: u16,
    info: SharedInfo,
    running: Mutex<Option<Running>>,
}

impl ControlServer {
    /// Create an idle server for `port` (0 picks an ephemeral port).
    pub fn new(port: u16, info: SharedInfo) -> Self {
        Self {
            port,
            info,
            running: Mutex::new(None),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address of the live listener, if started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.addr)
    }

    pub async fn is_listening(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Bind `127.0.0.1:<port>` and start serving in the background.
    ///
    /// Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, ControlError> {
        let mut running = self.running.lock().await;
        if let Some(current) = running.as_ref() {
            return Err(ControlError::AlreadyStarted(current.addr));
        }

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ControlError::Bind { addr, source })?;
        let bound = listener
            .local_addr()
            .map_err(|source| ControlError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(Arc::clone(&self.info));
        let task = tokio::spawn(serve(listener, app, shutdown_rx));

        info!(addr = %bound, "Control server listening");
        *running = Some(Running {
            addr: bound,
            shutdown: shutdown_tx,
            task,
        });
        Ok(bound)
    }

    /// Stop serving, letting in-flight requests finish until `deadline`.
    ///
    /// Past the deadline the serving task and every open connection are
    /// aborted. An expired deadline is accepted and shuts down immediately.
    /// Never fails when not listening.
    pub async fn stop(&self, deadline: Instant) -> Result<(), ControlError> {
        // Take the handle and release the lock before waiting.
        let Some(running) = self.running.lock().await.take() else {
            debug!("Control server not listening; stop is a no-op");
            return Ok(());
        };

        let Running {
            addr,
            shutdown,
            mut task,
        } = running;
        let _ = shutdown.send(());

        match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(Ok(())) => info!(addr = %addr, "Control server stopped"),
            Ok(Err(e)) => warn!(addr = %addr, error = %e, "Control server task ended abnormally"),
            Err(_) => {
                warn!(addr = %addr, "Control server drain deadline passed; aborting");
                task.abort();
            }
        }
        Ok(())
    }
}
