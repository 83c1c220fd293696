use axum::{extract::State, Json};
use tracing::info;

use crate::models::{MemoryResponse, StatusResponse};
use crate::state::AppState;

/// Empties the engine cache; engines are rebuilt on the next request.
pub async fn clear_cache(State(state): State<AppState>) -> Json<StatusResponse> {
    let removed = state.engines.clear();
    info!("Cleared {} cached engines", removed);
    Json(StatusResponse {
        status: "cache cleared".to_string(),
    })
}

pub async fn reset_session(State(state): State<AppState>) -> Json<StatusResponse> {
    let mut session = state.session.lock().await;
    session.reset();
    state.persist(&session);
    Json(StatusResponse {
        status: "session reset".to_string(),
    })
}

pub async fn memory(State(state): State<AppState>) -> Json<MemoryResponse> {
    let session = state.session.lock().await;
    Json(MemoryResponse {
        topics: session.memory().topics().to_vec(),
    })
}
