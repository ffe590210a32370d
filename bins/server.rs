use dotenvy::dotenv;
use server::LifecycleError;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // .env first so RUST_LOG / LOG_FORMAT take effect
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "server", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    init_logging();

    // Service context for log correlation (nothing sensitive)
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic hook: log unhandled panics with the service id before unwinding
    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "server",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    // config.toml (or CONFIG_PATH), then env overrides; invalid config is fatal
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "server", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    let worker_threads = cfg.server.worker_threads;

    // Tokio runtime sized from server.worker_threads
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    // Startup event
    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        addr = %cfg.bind_addr(),
        drain_timeout_secs = cfg.shutdown.drain_timeout_secs,
        "server service starting"
    );

    // Serve until SIGINT, then drain within shutdown.drain_timeout_secs
    let outcome = rt.block_on(server::run(cfg));
    // Requests abandoned by a forced shutdown must not keep the process alive.
    rt.shutdown_background();

    // Clean drain exits 0; bind failure or drain timeout exits non-zero
    match outcome {
        Ok(()) => {
            info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e @ LifecycleError::Bind { .. }) => {
            error!(service = "server", event = "bind_failed", error = %e, "cannot start server");
            std::process::ExitCode::FAILURE
        }
        Err(e) => {
            error!(service = "server", event = "run_failed", %service_id, pid, error = %e, "server stopped abnormally");
            std::process::ExitCode::FAILURE
        }
    }
}
