//! SFCore AI Conversation - session core for prompt-completion chat
//!
//! Provides single-session conversation state management with:
//! - Windowed turn history
//! - Naive keyword memory with a hard cap
//! - Prompt assembly and reply extraction around a stateless backend
//! - Flat JSON persistence of {history, memory}

mod config;
mod error;
mod generator;
mod history;
mod keywords;
mod memory;
mod persistence;
mod prompt_assembler;
mod session;
mod stopwords;
pub mod types;

pub use config::{PromptConfig, SessionConfig};
pub use error::{ConversationError, Result};
pub use generator::TextGenerator;
#[cfg(test)]
pub use generator::MockTextGenerator;
pub use history::HistoryBuffer;
pub use keywords::KeywordExtractor;
pub use memory::{MemorySnapshot, MemoryStore};
pub use persistence::SessionPersistence;
pub use prompt_assembler::PromptAssembler;
pub use session::{ConversationSession, SessionPhase};
pub use stopwords::StopWordFilter;
pub use types::{GenerationRequest, SamplingParams, SessionState, Turn};
