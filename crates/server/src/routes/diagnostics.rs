use axum::extract::State;
use tracing::info;

use crate::state::AppState;

/// GET /slow
///
/// Sleeps for the configured delay before answering; used to observe
/// draining during shutdown.
pub async fn slow(State(state): State<AppState>) -> &'static str {
    info!(delay_ms = state.slow_delay.as_millis() as u64, "starting slow request");
    tokio::time::sleep(state.slow_delay).await;
    info!("finished slow request");
    "Finally, I am done."
}
