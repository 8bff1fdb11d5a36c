/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Roster and lineup read-through service.
pub mod roster_service;
/// Session lifecycle management (start, snapshot, finalize, abandon).
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage reconnection supervisor.
pub mod storage_supervisor;
/// Live tracking operations: actions, score, serve, rotation, substitutions.
pub mod tracker_service;
