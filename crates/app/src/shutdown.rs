//! Serving with a bounded graceful shutdown

use std::future::Future;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::{net::TcpListener, signal, sync::oneshot, task::JoinError};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] JoinError),

    #[error("shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Resolves once the process receives Ctrl+C (SIGINT) or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

/// Serve `app` until an OS shutdown signal, then drain within `timeout`.
pub async fn serve(listener: TcpListener, app: Router, timeout: Duration) -> Result<(), ServeError> {
    serve_until(listener, app, shutdown_signal(), timeout).await
}

/// Serve `app` until `shutdown` resolves, then drain within `timeout`.
///
/// In-flight requests are given until the deadline; past it the server task
/// is aborted and [`ServeError::ShutdownTimeout`] returned.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    timeout: Duration,
) -> Result<(), ServeError>
where
    F: Future<Output = ()>,
{
    let (trigger, triggered) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = triggered.await;
    });
    let mut handle = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut handle => {
            // Server stopped before anyone asked it to
            result??;
            return Ok(());
        }
        _ = shutdown => {}
    }

    let _ = trigger.send(());

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(result) => {
            result??;
            info!("Server shutdown complete");
            Ok(())
        }
        Err(_) => {
            handle.abort();
            error!(timeout = ?timeout, "Shutdown timeout exceeded");
            Err(ServeError::ShutdownTimeout(timeout))
        }
    }
}
