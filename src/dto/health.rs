use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the realtime database currently accepts writes.
    pub realtime_online: bool,
}

impl HealthResponse {
    /// Every backend reachable.
    pub fn ok(realtime_online: bool) -> Self {
        Self {
            status: "ok".to_string(),
            realtime_online,
        }
    }

    /// Document store or realtime database unreachable.
    pub fn degraded(realtime_online: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            realtime_online,
        }
    }
}
