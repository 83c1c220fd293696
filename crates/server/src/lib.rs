pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/chat", post(handlers::chat::chat_handler))
        .route("/api/clear-cache", post(handlers::session::clear_cache))
        .route("/api/reset", post(handlers::session::reset_session))
        .route("/api/memory", get(handlers::session::memory))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::{ChatResponse, HealthResponse, MemoryResponse};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use sfcore_ai_conversation::{GenerationRequest, TextGenerator};
    use sfcore_ai_engine::EngineCache;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Echoes the prompt like a full-text pipeline, then a fixed continuation.
    #[derive(Default)]
    struct EchoEngine;

    #[async_trait]
    impl TextGenerator for EchoEngine {
        async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            Ok(format!("{} Tokio schedules async tasks", request.prompt))
        }
    }

    #[derive(Default)]
    struct DownEngine;

    #[async_trait]
    impl TextGenerator for DownEngine {
        async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn app_with<E: TextGenerator + Default + 'static>(settings: Settings) -> (Router, AppState) {
        let engines = EngineCache::new(Arc::new(|_model: &str| -> anyhow::Result<Arc<dyn TextGenerator>> {
            Ok(Arc::new(E::default()))
        }));
        let state = AppState::new(settings, engines);
        (build_router(state.clone()), state)
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let (app, state) = app_with::<EchoEngine>(Settings::default());

        let response = app
            .clone()
            .oneshot(chat_request(serde_json::json!({
                "message": "How does tokio work?",
                "max_tokens": 64,
                "memory": true
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ChatResponse = json_body(response).await;
        assert_eq!(body.response, "Tokio schedules async tasks");
        assert_eq!(body.tokens_used, 64);
        assert_eq!(body.model, "default");

        let session = state.session.lock().await;
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.memory().topics(), ["schedules", "async", "tasks"]);
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let (app, state) = app_with::<EchoEngine>(Settings::default());
        let response = app
            .oneshot(chat_request(serde_json::json!({ "message": "   " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.session.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_fields_are_bad_request() {
        let (app, state) = app_with::<EchoEngine>(Settings::default());
        let bodies = [
            serde_json::json!({ "message": "hello", "max_tokens": 4294967295u32 }),
            serde_json::json!({ "message": "hello", "max_tokens": 5 }),
            serde_json::json!({ "message": "hello", "temperature": -1.0 }),
            serde_json::json!({ "message": "hello", "temperature": 2.5 }),
            serde_json::json!({ "message": "x".repeat(2001) }),
        ];

        for body in bodies {
            let response = app.clone().oneshot(chat_request(body.clone())).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        }
        assert!(state.session.lock().await.history().is_empty());

        // Bounds are inclusive
        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "x".repeat(2000),
                "temperature": 2.0,
                "max_tokens": 200
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_backend_failure_is_service_unavailable() {
        let (app, state) = app_with::<DownEngine>(Settings::default());
        let response = app
            .oneshot(chat_request(serde_json::json!({ "message": "hello" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.session.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_health_memory_reset_and_clear_cache() {
        let (app, state) = app_with::<EchoEngine>(Settings::default());
        app.clone()
            .oneshot(chat_request(serde_json::json!({ "message": "hello", "memory": true })))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let health: HealthResponse = json_body(response).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.turns, 1);
        assert_eq!(health.cached_engines, 1);
        assert!(health.total_mem_mb > 0.0);

        let response = app
            .clone()
            .oneshot(Request::get("/api/memory").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let memory: MemoryResponse = json_body(response).await;
        assert!(!memory.topics.is_empty());

        let response = app
            .clone()
            .oneshot(Request::post("/api/reset").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.session.lock().await.state().is_empty());

        let response = app
            .oneshot(Request::post("/api/clear-cache").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.engines.is_empty());
    }

    #[tokio::test]
    async fn test_history_file_written_after_turn() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut settings = Settings::default();
        settings.chat.history_path = Some(path.to_string_lossy().into_owned());

        let (app, _state) = app_with::<EchoEngine>(settings.clone());
        app.oneshot(chat_request(serde_json::json!({ "message": "remember this" })))
            .await
            .unwrap();

        let restored = sfcore_ai_conversation::SessionPersistence::load(&path);
        assert_eq!(restored.history.len(), 1);

        // A new server instance picks the conversation back up
        let (_app, state) = app_with::<EchoEngine>(settings);
        assert_eq!(state.session.lock().await.history().len(), 1);
    }
}
