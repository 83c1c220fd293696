use tracing::debug;

use crate::config::PromptConfig;
use crate::types::Turn;

/// Builds completion prompts and pulls the reply back out of raw backend output.
///
/// Both directions use the same markers, so whatever `build_prompt` ends with
/// is what `extract_reply` searches for.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    config: PromptConfig,
}

impl PromptAssembler {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn build_prompt(&self, system_instruction: &str, history_window: &[Turn], user_text: &str) -> String {
        self.build_prompt_with_topics(system_instruction, history_window, &[], user_text)
    }

    /// Layout:
    ///
    /// ```text
    /// <system>[\n\nPrevious context:\n<context cut to budget>][\n\nKnown topics: a, b]
    ///
    /// Conversation:
    /// [<context>\n]User: <user text>
    /// Assistant:
    /// ```
    pub fn build_prompt_with_topics(
        &self,
        system_instruction: &str,
        history_window: &[Turn],
        topics: &[String],
        user_text: &str,
    ) -> String {
        let context = Self::flatten(history_window);
        let budgeted = truncate_chars(&context, self.config.context_char_budget);
        let system = self.build_system_section(system_instruction, budgeted, topics);

        let mut prompt = String::with_capacity(system.len() + context.len() + user_text.len() + 64);
        prompt.push_str(&system);
        prompt.push_str("\n\n");
        prompt.push_str(&self.config.conversation_label);
        prompt.push('\n');
        if !context.is_empty() {
            prompt.push_str(&context);
            prompt.push('\n');
        }
        prompt.push_str(&self.config.user_marker);
        prompt.push(' ');
        prompt.push_str(user_text);
        prompt.push('\n');
        prompt.push_str(&self.config.assistant_marker);

        debug!(
            "Built prompt: {} chars, {} context turns, {} topics",
            prompt.chars().count(),
            history_window.len(),
            topics.len()
        );
        prompt
    }

    fn build_system_section(&self, system_instruction: &str, context: &str, topics: &[String]) -> String {
        let base = if system_instruction.trim().is_empty() {
            self.config.default_system_instruction.as_str()
        } else {
            system_instruction
        };

        let mut parts = vec![base.to_string()];
        if !context.is_empty() {
            parts.push(format!("Previous context:\n{}", context));
        }
        if !topics.is_empty() {
            parts.push(format!("Known topics: {}", topics.join(", ")));
        }
        parts.join("\n\n")
    }

    /// User and assistant texts interleaved, space-joined.
    fn flatten(turns: &[Turn]) -> String {
        turns
            .iter()
            .flat_map(|turn| [turn.user(), turn.assistant()])
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Text after the last assistant marker, trimmed. Without a marker the raw
    /// output is used as is. Either way the result is cut to `max_reply_chars`.
    pub fn extract_reply(&self, raw_output: &str) -> String {
        let reply = match raw_output.rfind(&self.config.assistant_marker) {
            Some(idx) => raw_output[idx + self.config.assistant_marker.len()..].trim(),
            None => raw_output,
        };
        truncate_chars(reply, self.config.max_reply_chars).to_string()
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(PromptConfig::default())
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
