//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Stops accepting new connections.
//! 2. Closes idle keep-alive connections and lets in-flight requests finish,
//!    for at most [`DRAIN_TIMEOUT`].
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.
//!
//! A properties update is a read-modify-write against the daemon, so
//! draining matters: a killed task can leave the panel unsure whether the
//! write landed.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};
use crate::status::Status;

/// Longest a shutdown waits for busy connections.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest request body read into memory. Bigger bodies get `413`.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
}

impl Server {
    /// Binds the listening socket. Port `0` picks an ephemeral port; read it
    /// back with [`local_addr`](Server::local_addr).
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains in-flight
    /// connections.
    ///
    /// Idle keep-alive connections are closed at once; busy ones get
    /// [`DRAIN_TIMEOUT`] to finish before they are dropped.
    pub async fn serve_with_shutdown<F>(self, router: Router, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let Self { listener, addr } = self;
        let router = Arc::new(router);
        let builder = ConnBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();

        info!(%addr, "mcprops listening");

        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even with connections queued.
                biased;

                () = &mut signal => {
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
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(router, req, peer).await }
                    });

                    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), svc);
                    let conn = graceful.watch(conn.into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            debug!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);
        tokio::select! {
            () = graceful.shutdown() => {}
            () = tokio::time::sleep(DRAIN_TIMEOUT) => {
                warn!(remaining = tasks.len(), "drain timeout elapsed, dropping connections");
            }
        }
        tasks.shutdown().await;

        info!("mcprops stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response. Every failure becomes a
/// status code, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
    peer: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_owned();
    let raw_method = parts.method.clone();

    let response = match Method::try_from(&parts.method) {
        Err(()) => Response::status(Status::MethodNotAllowed),
        Ok(method) => match router.lookup(method, &path) {
            Route::Found(handler, params) => match Limited::new(body, MAX_BODY_BYTES).collect().await {
                Ok(collected) => {
                    let req = Request::new(parts, method, collected.to_bytes(), params);
                    handler.call(req).await
                }
                Err(e) if e.is::<LengthLimitError>() => {
                    warn!(%peer, limit = MAX_BODY_BYTES, "request body too large");
                    Response::status(Status::PayloadTooLarge)
                }
                Err(e) => {
                    warn!(%peer, "failed to read request body: {e}");
                    Response::status(Status::BadRequest)
                }
            },
            Route::MethodNotAllowed => Response::status(Status::MethodNotAllowed),
            Route::NotFound => Response::status(Status::NotFound),
        },
    };

    info!(
        method = %raw_method,
        %path,
        status = u16::from(response.status_code()),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only
/// Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => { term.recv().await; }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
