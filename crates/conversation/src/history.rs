use tracing::warn;

use crate::types::Turn;

/// Append-only turn log. Only full clear removes entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryBuffer {
    turns: Vec<Turn>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The last `n` turns in conversation order (fewer if history is shorter).
    pub fn window(&self, n: usize) -> &[Turn] {
        &self.turns[self.turns.len().saturating_sub(n)..]
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Replace state wholesale. Anything that is not a list of
    /// `[user, assistant]` string pairs resets the buffer to empty.
    pub fn restore(&mut self, data: &serde_json::Value) {
        match serde_json::from_value::<Vec<Turn>>(data.clone()) {
            Ok(turns) => self.turns = turns,
            Err(e) => {
                warn!("Malformed history data, resetting to empty: {}", e);
                self.turns.clear();
            }
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for HistoryBuffer {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
