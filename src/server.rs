//! HTTP server wrapper and process signal handling.
//!
//! The server shares the bus shutdown token: once it fires, the listener
//! stops accepting connections and in-flight requests are allowed to
//! finish.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::error::BusError;

/// Builds the application router with request tracing and timeouts.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves `app` on `listener` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an I/O error if the server fails while accepting connections.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Waits for the server and the bus once shutdown has been requested.
///
/// The bus drain is always awaited, even if the server task failed or
/// panicked. Errors are reported afterwards, the bus error first.
///
/// # Errors
///
/// Returns the first failure among the bus and server tasks.
pub async fn join_shutdown(
    server: JoinHandle<std::io::Result<()>>,
    bus: JoinHandle<Result<(), BusError>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let served = server.await;
    bus.await??;
    served??;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Waits for SIGINT, SIGTERM or SIGQUIT.
///
/// # Errors
///
/// Returns an error if the signal listeners cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for Ctrl-C.
///
/// # Errors
///
/// Returns an error if the signal listener cannot be registered.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
