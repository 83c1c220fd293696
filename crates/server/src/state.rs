use sfcore_ai_conversation::{ConversationSession, SessionPersistence};
use sfcore_ai_engine::EngineCache;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Settings;

/// Shared across handlers. The session mutex is held for a whole
/// submit -> generate -> complete cycle so turns never interleave.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<ConversationSession>>,
    pub engines: EngineCache,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings, engines: EngineCache) -> Self {
        let initial = match &settings.chat.history_path {
            Some(path) => {
                info!("Restoring session from {}", path);
                SessionPersistence::load(path)
            }
            None => Default::default(),
        };
        let session = ConversationSession::start(settings.session.clone(), settings.prompt.clone(), initial);

        Self {
            session: Arc::new(Mutex::new(session)),
            engines,
            settings: Arc::new(settings),
        }
    }

    /// Write the session file if one is configured. Failures are logged only.
    pub fn persist(&self, session: &ConversationSession) {
        let Some(path) = &self.settings.chat.history_path else {
            return;
        };
        if let Err(e) = SessionPersistence::save(path, &session.snapshot()) {
            warn!("{}", e);
        }
    }
}
