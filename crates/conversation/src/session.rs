use tracing::{debug, error, info, warn};

use crate::config::{PromptConfig, SessionConfig};
use crate::error::{ConversationError, Result};
use crate::generator::TextGenerator;
use crate::history::HistoryBuffer;
use crate::keywords::KeywordExtractor;
use crate::memory::MemoryStore;
use crate::prompt_assembler::PromptAssembler;
use crate::types::{GenerationRequest, SessionState, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// A request was handed out and its output has not come back yet
    TurnInProgress,
    Terminated,
}

/// Single-conversation turn loop over a [`SessionState`].
///
/// Not synchronized: a host serving concurrent callers must serialize each
/// submit/complete pair itself.
pub struct ConversationSession {
    config: SessionConfig,
    assembler: PromptAssembler,
    state: SessionState,
    phase: SessionPhase,
}

impl ConversationSession {
    pub fn new(config: SessionConfig, prompt_config: PromptConfig) -> Self {
        Self::start(config, prompt_config, SessionState::default())
    }

    /// Start from a previously persisted state (or an empty one).
    pub fn start(config: SessionConfig, prompt_config: PromptConfig, initial_state: SessionState) -> Self {
        let mut session = Self {
            assembler: PromptAssembler::new(prompt_config),
            state: SessionState {
                history: HistoryBuffer::new(),
                memory: MemoryStore::with_cap(config.memory_cap),
            },
            config,
            phase: SessionPhase::Idle,
        };
        session.restore(initial_state);
        info!(
            "Conversation session started ({} turns, {} topics)",
            session.state.history.len(),
            session.state.memory.len()
        );
        session
    }

    /// Build the request for the next turn. Empty input is rejected without
    /// touching any state.
    pub fn submit_turn(&mut self, user_text: &str, system_instruction: &str) -> Result<GenerationRequest> {
        self.ensure_active()?;
        if user_text.trim().is_empty() {
            warn!("Rejected empty user turn");
            return Err(ConversationError::InputRejected("user text is empty".to_string()));
        }

        let window = self.state.history.window(self.config.history_window);
        let prompt = self.assembler.build_prompt_with_topics(
            system_instruction,
            window,
            self.state.memory.topics(),
            user_text,
        );

        self.phase = SessionPhase::TurnInProgress;
        Ok(GenerationRequest::new(prompt, self.config.sampling))
    }

    /// Record the backend output for `user_text` and return the cleaned reply.
    pub fn complete_turn(&mut self, user_text: &str, raw_output: &str, memory_enabled: bool) -> Result<String> {
        self.ensure_active()?;
        if raw_output.trim().is_empty() {
            return Err(ConversationError::GenerationFailure("backend returned empty output".to_string()));
        }

        let reply = self.assembler.extract_reply(raw_output);
        if reply.trim().is_empty() {
            return Err(ConversationError::GenerationFailure("no reply after assistant marker".to_string()));
        }

        self.state.history.append(Turn::new(user_text, reply.clone()));

        if memory_enabled {
            let mut keywords = KeywordExtractor::extract(user_text);
            keywords.extend(KeywordExtractor::extract(&reply));
            let skip = keywords.len().saturating_sub(self.config.keywords_per_turn);
            self.state.memory.update(keywords.into_iter().skip(skip));
        }

        self.phase = SessionPhase::Idle;
        debug!("Turn completed, history length {}", self.state.history.len());
        Ok(reply)
    }

    /// Abandon the in-progress turn after a backend failure. State is unchanged.
    pub fn fail_turn(&mut self) {
        if self.phase == SessionPhase::TurnInProgress {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Submit, generate and complete in one call.
    pub async fn run_turn(
        &mut self,
        generator: &dyn TextGenerator,
        user_text: &str,
        system_instruction: &str,
        memory_enabled: bool,
    ) -> Result<String> {
        let request = self.submit_turn(user_text, system_instruction)?;
        self.run_request(generator, &request, user_text, memory_enabled).await
    }

    /// Execute an already submitted request. Hosts that tweak the request
    /// (model, per-call sampling) between submit and generate use this.
    pub async fn run_request(
        &mut self,
        generator: &dyn TextGenerator,
        request: &GenerationRequest,
        user_text: &str,
        memory_enabled: bool,
    ) -> Result<String> {
        let raw_output = match generator.generate(request).await {
            Ok(output) => output,
            Err(e) => {
                error!("Generation failed: {:#}", e);
                self.fail_turn();
                return Err(ConversationError::GenerationFailure(e.to_string()));
            }
        };

        self.complete_turn(user_text, &raw_output, memory_enabled).map_err(|e| {
            self.fail_turn();
            e
        })
    }

    /// Clear history and memory and go back to a freshly started session.
    pub fn reset(&mut self) {
        self.state.history.clear();
        self.state.memory.clear();
        if self.phase != SessionPhase::Terminated {
            self.phase = SessionPhase::Idle;
        }
        info!("Conversation session reset");
    }

    pub fn terminate(&mut self) {
        self.phase = SessionPhase::Terminated;
        info!("Conversation session terminated");
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Replace the whole state. The memory cap of this session is re-applied.
    pub fn restore(&mut self, state: SessionState) {
        let SessionState { history, mut memory } = state;
        memory.set_cap(self.config.memory_cap);
        self.state = SessionState { history, memory };
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.state.history
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.state.memory
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn prompt_config(&self) -> &PromptConfig {
        self.assembler.config()
    }

    fn ensure_active(&self) -> Result<()> {
        if self.phase == SessionPhase::Terminated {
            return Err(ConversationError::InputRejected("session is terminated".to_string()));
        }
        Ok(())
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new(SessionConfig::default(), PromptConfig::default())
    }
}
