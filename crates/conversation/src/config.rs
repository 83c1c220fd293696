use serde::{Deserialize, Serialize};

use crate::types::SamplingParams;

/// Session-level knobs. Every field has a default so hosts can embed this in
/// a partially filled config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of recent turns flattened into each prompt
    pub history_window: usize,

    /// Maximum retained topics
    pub memory_cap: usize,

    /// Keywords kept from each exchange before updating memory
    pub keywords_per_turn: usize,

    pub sampling: SamplingParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_window: 2,
            memory_cap: 10,
            keywords_per_turn: 3,
            sampling: SamplingParams::default(),
        }
    }
}

/// Prompt layout and reply bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Used when the caller passes an empty system instruction
    pub default_system_instruction: String,
    pub user_marker: String,
    pub assistant_marker: String,
    pub conversation_label: String,

    /// Character budget for the "Previous context" block
    pub context_char_budget: usize,

    /// Hard cap on extracted replies, in characters
    pub max_reply_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            default_system_instruction: "You are a helpful AI assistant.".to_string(),
            user_marker: "User:".to_string(),
            assistant_marker: "Assistant:".to_string(),
            conversation_label: "Conversation:".to_string(),
            context_char_budget: 200,
            max_reply_chars: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: SessionConfig = serde_json::from_str(r#"{"history_window": 3}"#).unwrap();
        assert_eq!(cfg.history_window, 3);
        assert_eq!(cfg.memory_cap, 10);
        assert_eq!(cfg.sampling.max_tokens, 80);

        let prompt: PromptConfig = serde_json::from_str(r#"{"max_reply_chars": 500}"#).unwrap();
        assert_eq!(prompt.max_reply_chars, 500);
        assert_eq!(prompt.assistant_marker, "Assistant:");
    }
}
