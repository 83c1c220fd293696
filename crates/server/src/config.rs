use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use sfcore_ai_conversation::{PromptConfig, SessionConfig};
use sfcore_ai_engine::EngineOptions;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
    pub session: SessionConfig,
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            chat: ChatConfig::default(),
            session: SessionConfig::default(),
            prompt: default_prompt_config(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Model used when a request does not name one
    pub default_model: String,
    pub return_full_text: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let engine = EngineOptions::default();
        Self {
            base_url: engine.base_url,
            timeout_seconds: engine.timeout_seconds,
            default_model: "default".to_string(),
            return_full_text: engine.return_full_text,
        }
    }
}

impl LlmConfig {
    /// Shared options for every cached engine; the cache fills in the model.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            base_url: self.base_url.clone(),
            model: None,
            timeout_seconds: self.timeout_seconds,
            return_full_text: self.return_full_text,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ChatConfig {
    /// Default for requests that do not set `memory`
    pub memory_enabled: bool,

    /// Session file loaded at startup and rewritten after every turn
    pub history_path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
    /// Daily-rotated files land here as `<file_prefix>.<date>.log`
    pub dir: String,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,sfcore_ai_server=debug,sfcore_ai_conversation=debug".to_string(),
            format: LogFormat::Pretty,
            dir: "logs".to_string(),
            file_prefix: "chat-server".to_string(),
        }
    }
}

/// HTTP replies get a wider cap than the CLI transcript
fn default_prompt_config() -> PromptConfig {
    PromptConfig {
        max_reply_chars: 500,
        ..PromptConfig::default()
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
