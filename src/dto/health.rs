use serde::Serialize;
use utoipa::ToSchema;

/// Health states reported by the `/healthcheck` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Storage is reachable and the tracker is fully operational.
    Ok,
    /// Running without a storage backend; reads and writes will fail.
    Degraded,
}

/// Payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall backend health.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Report a fully operational backend.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// Report a backend running in degraded mode.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}
