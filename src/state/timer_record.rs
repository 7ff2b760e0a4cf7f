//! Timer record structure and its in-place mutations

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque timer identifier, unique within the collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for TimerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TimerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub id: TimerId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Total seconds
    pub duration: u64,
    /// Seconds left, `0..=duration`
    pub remaining_time: u64,
    pub is_running: bool,
}

/// Fields for a new timer, already validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDraft {
    pub title: String,
    pub description: String,
    pub duration: u64,
}

/// Partial update for an existing timer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<u64>,
}

impl TimerRecord {
    /// Create a stopped timer with a full countdown and a fresh id
    pub fn new(draft: TimerDraft) -> Self {
        Self {
            id: TimerId::generate(),
            title: draft.title,
            description: draft.description,
            duration: draft.duration,
            remaining_time: draft.duration,
            is_running: false,
        }
    }

    /// Whether a ticker should be driving this timer
    pub fn is_counting_down(&self) -> bool {
        self.is_running && self.remaining_time > 0
    }

    /// Decrement one second if running, returns whether anything changed.
    /// `is_running` is left as is when the countdown hits zero.
    pub fn tick(&mut self) -> bool {
        if !self.is_running || self.remaining_time == 0 {
            return false;
        }
        self.remaining_time -= 1;
        true
    }

    pub fn toggle(&mut self) {
        self.is_running = !self.is_running;
    }

    pub fn restart(&mut self) {
        self.remaining_time = self.duration;
        self.is_running = false;
    }

    /// Merge the provided fields. Any edit restarts the countdown from the
    /// (possibly new) duration; the running flag is kept.
    pub fn apply(&mut self, update: TimerUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        self.remaining_time = self.duration;
    }

    /// Reset state that must not survive a process restart
    pub fn normalize_on_load(&mut self) {
        self.is_running = false;
        if self.remaining_time == 0 || self.remaining_time > self.duration {
            self.remaining_time = self.duration;
        }
    }
}
