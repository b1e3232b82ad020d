use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe both storage backends, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let backend = state.backend();
    let realtime_online = backend.realtime().is_online();
    match backend.health_check().await {
        Ok(()) => HealthResponse::ok(realtime_online),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded(realtime_online)
        }
    }
}
