use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::{info, warn};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    services::sse_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/live",
    tag = "sse",
    responses((status = 200, description = "Live tracking SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime tracking events to connected frontends.
pub async fn live_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_live(&state);
    info!("New live SSE connection");
    let handshake = Handshake {
        stream: "live".to_string(),
        message: format!("connected to the {} live feed", state.config().team_name()),
        degraded: state.is_degraded().await,
    };
    match ServerEvent::json(Some("handshake".to_string()), &handshake) {
        Ok(event) => state.live_sse().broadcast(event),
        Err(err) => warn!(error = %err, "failed to serialize SSE handshake"),
    }
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/live", get(live_stream))
}
