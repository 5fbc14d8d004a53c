use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use crate::services::webhooks::{CinemaEventPayload, WebhookService};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/cinema", post(handle_cinema_webhook))
}

/// Accepts catalog change events. Deltas are applied best-effort, so the
/// response is 200 whether or not the delta matched anything.
async fn handle_cinema_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CinemaEventPayload>,
) -> impl IntoResponse {
    tracing::info!("Received cinema webhook: action={}", payload.action);

    WebhookService::apply_delta(&state.db, &payload.action, &payload.movie).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "accepted" })),
    )
}
