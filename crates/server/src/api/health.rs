use axum::{Json, extract::State};

use crate::{dto::HealthResponse, state::SharedState};

pub async fn healthz(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        feed_loaded: state.feed_loaded(),
    })
}
