use crate::error::ApiError;
use crate::models::{ChatRequest, ChatResponse};
use crate::state::AppState;
use axum::{extract::State, Json};
use std::time::Instant;
use tracing::info;

const MAX_MESSAGE_CHARS: usize = 2000;
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=2.0;
const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 10..=200;

fn validate(request: &ChatRequest) -> Result<(), ApiError> {
    let message_chars = request.message.chars().count();
    if message_chars > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "message is {} chars, limit is {}",
            message_chars, MAX_MESSAGE_CHARS
        )));
    }
    if let Some(temperature) = request.temperature {
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(ApiError::BadRequest(format!(
                "temperature must be between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }
    }
    if let Some(max_tokens) = request.max_tokens {
        if !MAX_TOKENS_RANGE.contains(&max_tokens) {
            return Err(ApiError::BadRequest(format!(
                "max_tokens must be between {} and {}",
                MAX_TOKENS_RANGE.start(),
                MAX_TOKENS_RANGE.end()
            )));
        }
    }
    Ok(())
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let start_time = Instant::now();

    validate(&request)?;

    let model = request
        .model
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.settings.llm.default_model.clone());
    let memory_enabled = request.memory.unwrap_or(state.settings.chat.memory_enabled);
    let system = request.system.as_deref().unwrap_or("");

    info!(
        "Chat request: model={}, message_len={}, memory={}",
        model,
        request.message.len(),
        memory_enabled
    );

    let mut session = state.session.lock().await;

    let mut generation = session.submit_turn(&request.message, system)?;
    if let Some(temperature) = request.temperature {
        generation.temperature = temperature;
    }
    if let Some(max_tokens) = request.max_tokens {
        generation.max_tokens = max_tokens;
    }
    let generation = generation.with_model(model.clone());

    let engine = match state.engines.get_or_create(&model) {
        Ok(engine) => engine,
        Err(e) => {
            session.fail_turn();
            return Err(ApiError::LlmError(format!("{:#}", e)));
        }
    };

    let reply = session
        .run_request(engine.as_ref(), &generation, &request.message, memory_enabled)
        .await?;

    state.persist(&session);

    info!(
        "Chat completed in {} ms ({} turns in history)",
        start_time.elapsed().as_millis(),
        session.history().len()
    );

    Ok(Json(ChatResponse {
        response: reply,
        tokens_used: generation.max_tokens,
        model,
    }))
}
