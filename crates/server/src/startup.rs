use axum::Router;
use configs::AppConfig;
use tracing::{error, info};

use crate::lifecycle::{Lifecycle, LifecycleError};
use crate::routes;
use crate::state::AppState;

/// Router over a fresh, empty store.
pub fn build_app(cfg: &AppConfig) -> Router {
    routes::build_router(AppState::from_config(cfg))
}

/// Resolves on the first SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!(service = "server", event = "shutdown_signal", signal = "SIGINT", "received interrupt");
        }
        Err(e) => {
            // Without a handler the process can only be killed; keep serving.
            error!(service = "server", event = "signal_handler_failed", error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    }
}

/// Public entry: build the app, serve it and drain on SIGINT.
pub async fn run(cfg: AppConfig) -> Result<(), LifecycleError> {
    let app = build_app(&cfg);
    let addr = cfg.bind_addr();
    info!(service = "server", event = "starting", %addr, "server starting");
    let server = Lifecycle::bind(&addr, app, cfg.drain_timeout()).await?;
    server.run_until(shutdown_signal()).await
}
