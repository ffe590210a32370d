//! Listener lifecycle: bind, serve, drain, stop.
//!
//! The accept loop runs on its own task. The caller's control flow waits on
//! a shutdown future; when it resolves, the accept loop is told to stop
//! through a one-shot channel and the drain is bounded by a timeout.
//!
//! ```text
//! Starting -> Listening -> Draining -> Stopped
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinError;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Listener bound, accept loop not yet running.
    Starting,
    /// Accepting connections and serving requests.
    Listening,
    /// No longer accepting; waiting for in-flight requests.
    Draining,
    /// Terminal.
    Stopped,
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "Starting"),
            Self::Listening => write!(f, "Listening"),
            Self::Draining => write!(f, "Draining"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Fatal lifecycle failures; each one ends the process with a non-zero code.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot start server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server forced to shutdown: in-flight requests did not finish within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
    #[error("accept loop task failed: {0}")]
    Join(String),
}

impl From<JoinError> for LifecycleError {
    fn from(e: JoinError) -> Self {
        Self::Join(e.to_string())
    }
}

pub struct Lifecycle {
    listener: TcpListener,
    local_addr: SocketAddr,
    app: Router,
    drain_timeout: Duration,
    phase: watch::Sender<LifecyclePhase>,
}

impl Lifecycle {
    /// Bind the listener. The returned value is in [`LifecyclePhase::Starting`].
    pub async fn bind(
        addr: &str,
        app: Router,
        drain_timeout: Duration,
    ) -> Result<Self, LifecycleError> {
        let bind_err = |source: std::io::Error| LifecycleError::Bind { addr: addr.to_string(), source };
        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;
        let (phase, _) = watch::channel(LifecyclePhase::Starting);
        info!(service = "server", event = "bound", %local_addr, "listener bound");
        Ok(Self { listener, local_addr, app, drain_timeout, phase })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Observe phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecyclePhase> {
        self.phase.subscribe()
    }

    /// Serve until `shutdown` resolves, then drain.
    ///
    /// Returns `Ok(())` once every in-flight request has finished within the
    /// drain timeout, and [`LifecycleError::ShutdownTimeout`] otherwise. Requests
    /// still running at the timeout are abandoned, not cancelled.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()>,
    {
        let Self { listener, local_addr, app, drain_timeout, phase } = self;
        let (drain_tx, drain_rx) = oneshot::channel::<()>();

        let mut accept_loop = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    let _ = drain_rx.await;
                })
                .await
        });
        phase.send_replace(LifecyclePhase::Listening);
        info!(service = "server", event = "listening", %local_addr, "server listening");

        tokio::select! {
            res = &mut accept_loop => {
                // Accept loop ended without being asked to.
                phase.send_replace(LifecyclePhase::Stopped);
                error!(service = "server", event = "accept_loop_exited", "accept loop exited before shutdown");
                return res?.map_err(LifecycleError::from);
            }
            _ = shutdown => {}
        }

        phase.send_replace(LifecyclePhase::Draining);
        info!(
            service = "server",
            event = "draining",
            timeout_ms = drain_timeout.as_millis() as u64,
            "shutdown signal received, initiating graceful shutdown"
        );
        let _ = drain_tx.send(());

        let drained = tokio::time::timeout(drain_timeout, &mut accept_loop).await;
        phase.send_replace(LifecyclePhase::Stopped);
        match drained {
            Ok(res) => {
                res??;
                info!(service = "server", event = "stopped", "server exited gracefully");
                Ok(())
            }
            Err(_) => {
                accept_loop.abort();
                error!(
                    service = "server",
                    event = "shutdown_timeout",
                    timeout_ms = drain_timeout.as_millis() as u64,
                    "server forced to shutdown"
                );
                Err(LifecycleError::ShutdownTimeout { timeout: drain_timeout })
            }
        }
    }
}
