use axum::{extract::State, http::StatusCode, Json};
use sfcore_ai_engine::metrics::RuntimeMetrics;
use tracing::warn;

use crate::models::HealthResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (turns, topics) = {
        let session = state.session.lock().await;
        (session.history().len(), session.memory().len())
    };
    let metrics = tokio::task::spawn_blocking(RuntimeMetrics::capture)
        .await
        .unwrap_or_else(|e| {
            warn!("Metrics capture failed: {}", e);
            RuntimeMetrics::default()
        });

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            turns,
            topics,
            cached_engines: state.engines.len(),
            process_rss_mb: metrics.process_rss_mb,
            total_mem_mb: metrics.total_mem_mb,
        }),
    )
}
