use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const DEFAULT_MEMORY_CAP: usize = 10;

/// Persisted shape of the memory section: `{"topics": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Bounded list of retained topic keywords.
///
/// Ordered by insertion; a keyword inserted again moves to the newest
/// position. Never holds more than `cap` topics.
///
/// Equality compares the retained topics only.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    topics: Vec<String>,
    cap: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_MEMORY_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            topics: Vec::with_capacity(cap.min(DEFAULT_MEMORY_CAP)),
            cap,
        }
    }

    /// No trimming until a cap is set; used when loading saved topics
    /// before the owning session knows its configured cap.
    pub fn unbounded() -> Self {
        Self::with_cap(usize::MAX)
    }

    /// Append, keep only the latest occurrence of each keyword, then keep the last `cap`.
    pub fn update<I, S>(&mut self, new_keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.extend(new_keywords.into_iter().map(Into::into));
        self.normalize();
        debug!("Memory updated: {} topics retained", self.topics.len());
    }

    fn normalize(&mut self) {
        let mut seen = HashSet::with_capacity(self.topics.len());
        let mut kept: Vec<String> = self
            .topics
            .drain(..)
            .rev()
            .filter(|topic| seen.insert(topic.clone()))
            .take(self.cap)
            .collect();
        kept.reverse();
        self.topics = kept;
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            topics: self.topics.clone(),
        }
    }

    /// Replace state wholesale. Anything that is not `{"topics": [string, ...]}`
    /// resets the store to empty.
    pub fn restore(&mut self, data: &serde_json::Value) {
        match serde_json::from_value::<MemorySnapshot>(data.clone()) {
            Ok(snapshot) => {
                self.topics = snapshot.topics;
                self.normalize();
            }
            Err(e) => {
                warn!("Malformed memory data, resetting to empty: {}", e);
                self.topics.clear();
            }
        }
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// The newest `n` topics, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        &self.topics[self.topics.len().saturating_sub(n)..]
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Change the cap, trimming the oldest topics if needed.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.normalize();
    }
}

impl PartialEq for MemoryStore {
    fn eq(&self, other: &Self) -> bool {
        self.topics == other.topics
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
