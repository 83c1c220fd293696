use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConversationError, Result};
use crate::history::HistoryBuffer;
use crate::memory::{MemorySnapshot, MemoryStore};
use crate::types::{SessionState, Turn};

/// On-disk shape: `{"history": [[user, assistant], ...], "memory": {"topics": [...]}}`
#[derive(Serialize)]
struct SessionDocument<'a> {
    history: &'a [Turn],
    memory: MemorySnapshot,
}

/// Flat JSON save/load of a [`SessionState`].
pub struct SessionPersistence;

impl SessionPersistence {
    /// Pretty-printed, unicode left unescaped. Written to a temporary sibling
    /// and renamed so a crash never leaves a half-written file behind.
    pub fn save(path: impl AsRef<Path>, state: &SessionState) -> Result<()> {
        let path = path.as_ref();
        let write_err = |reason: String| ConversationError::PersistenceWrite {
            path: path.to_path_buf(),
            reason,
        };

        let document = SessionDocument {
            history: state.history.turns(),
            memory: state.memory.snapshot(),
        };
        let contents = serde_json::to_string_pretty(&document).map_err(|e| write_err(e.to_string()))?;

        let tmp_path = tmp_path_for(path);
        fs::write(&tmp_path, contents).map_err(|e| write_err(e.to_string()))?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e.to_string()));
        }

        info!(
            "Session saved to {} ({} turns, {} topics)",
            path.display(),
            state.history.len(),
            state.memory.len()
        );
        Ok(())
    }

    /// Never fails: a missing, unreadable or corrupt file yields an empty state.
    pub fn load(path: impl AsRef<Path>) -> SessionState {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No session file at {}, starting fresh", path.display());
            return SessionState::default();
        }

        match Self::try_load(path) {
            Ok(state) => state,
            Err(e) => {
                warn!("{}; starting with an empty session", e);
                SessionState::default()
            }
        }
    }

    /// Like [`load`](Self::load) but reports why the file could not be used.
    ///
    /// Only document-level problems are errors. A malformed `history` or
    /// `memory` section is reset to empty on its own.
    pub fn try_load(path: impl AsRef<Path>) -> Result<SessionState> {
        let path = path.as_ref();
        let read_err = |reason: String| ConversationError::PersistenceRead {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
        let document: serde_json::Value =
            serde_json::from_str(&contents).map_err(|e| read_err(e.to_string()))?;
        let object = document
            .as_object()
            .ok_or_else(|| read_err("top-level value is not a JSON object".to_string()))?;

        let mut history = HistoryBuffer::new();
        if let Some(data) = object.get("history") {
            history.restore(data);
        }

        // The session applies its own cap on start/restore.
        let mut memory = MemoryStore::unbounded();
        if let Some(data) = object.get("memory") {
            memory.restore(data);
        }

        info!(
            "Session loaded from {} ({} turns, {} topics)",
            path.display(),
            history.len(),
            memory.len()
        );
        Ok(SessionState { history, memory })
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
