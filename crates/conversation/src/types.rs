use serde::{Deserialize, Serialize};

use crate::history::HistoryBuffer;
use crate::memory::MemoryStore;

/// One user message paired with the assistant reply to it.
///
/// Serialized as a two-element array `[user, assistant]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Turn {
    user: String,
    assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn assistant(&self) -> &str {
        &self.assistant
    }
}

impl From<(String, String)> for Turn {
    fn from((user, assistant): (String, String)) -> Self {
        Self { user, assistant }
    }
}

impl From<Turn> for (String, String) {
    fn from(turn: Turn) -> Self {
        (turn.user, turn.assistant)
    }
}

/// Sampling knobs forwarded untouched to the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 80,
            temperature: 0.8,
            top_k: 50,
            top_p: 0.95,
        }
    }
}

/// Everything a backend needs for one completion call. Not retained after the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    /// Backend selector for multi-model hosts, ignored by the core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: String, params: SamplingParams) -> Self {
        Self {
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_k: params.top_k,
            top_p: params.top_p,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// The unit of persistence: turn history plus retained topics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub history: HistoryBuffer,
    pub memory: MemoryStore,
}

impl SessionState {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.memory.is_empty()
    }
}
