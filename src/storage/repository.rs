//! Timer collection persistence adapter

use std::{collections::HashSet, sync::Arc};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::state::TimerRecord;

/// Key under which the whole timer collection is stored
pub const TIMERS_KEY: &str = "timers";

/// Reads and writes the full timer collection as one JSON blob
#[derive(Clone)]
pub struct TimerRepository {
    store: Arc<dyn KeyValueStore>,
}

impl TimerRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted collection, normalized for a fresh process.
    /// Missing, unreadable or corrupt data yields an empty collection.
    pub fn load(&self) -> Vec<TimerRecord> {
        match self.read() {
            Ok(stored) => {
                let mut seen = HashSet::new();
                let mut timers = Vec::with_capacity(stored.len());
                for mut timer in stored {
                    if timer.duration == 0 {
                        warn!("Dropping stored timer {} with zero duration", timer.id);
                        continue;
                    }
                    if !seen.insert(timer.id.clone()) {
                        warn!("Dropping stored timer with duplicate id {}", timer.id);
                        continue;
                    }
                    timer.normalize_on_load();
                    timers.push(timer);
                }
                debug!("Loaded {} timers", timers.len());
                timers
            }
            Err(e) => {
                warn!("Failed to load timers, starting empty: {:#}", e);
                Vec::new()
            }
        }
    }

    fn read(&self) -> Result<Vec<TimerRecord>> {
        let Some(blob) = self.store.get(TIMERS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&blob).context("Failed to parse stored timers")
    }

    /// Replace the persisted collection
    pub fn save(&self, timers: &[TimerRecord]) -> Result<()> {
        let blob = serde_json::to_string(timers).context("Failed to serialize timers")?;
        self.store.set(TIMERS_KEY, &blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn repo_with(blob: &str) -> TimerRepository {
        TimerRepository::new(Arc::new(MemoryStore::with_entry(TIMERS_KEY, blob)))
    }

    #[test]
    fn load_normalizes_running_and_finished_timers() {
        let repo = repo_with(
            r#"[
                {"id":"a","title":"Tea","description":"","duration":60,"remainingTime":0,"isRunning":true},
                {"id":"b","title":"Eggs","description":"soft","duration":300,"remainingTime":120,"isRunning":true}
            ]"#,
        );

        let timers = repo.load();

        assert_eq!(timers.len(), 2);
        assert_eq!(timers[0].remaining_time, 60);
        assert!(!timers[0].is_running);
        assert_eq!(timers[1].remaining_time, 120);
        assert!(!timers[1].is_running);
    }

    #[test]
    fn load_drops_zero_duration_and_duplicate_records() {
        let repo = repo_with(
            r#"[
                {"id":"a","title":"Broken","description":"","duration":0,"remainingTime":0,"isRunning":true},
                {"id":"b","title":"Tea","description":"","duration":60,"remainingTime":30,"isRunning":false},
                {"id":"b","title":"Copy","description":"","duration":90,"remainingTime":90,"isRunning":false}
            ]"#,
        );

        let timers = repo.load();

        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].title, "Tea");
        assert!(timers.iter().all(|t| t.remaining_time > 0));
    }

    #[test]
    fn load_tolerates_corrupt_blob() {
        assert!(repo_with("{not json").load().is_empty());
    }

    #[test]
    fn load_of_empty_store_is_empty() {
        let repo = TimerRepository::new(Arc::new(MemoryStore::new()));
        assert!(repo.load().is_empty());
    }

    #[test]
    fn save_writes_whole_collection_in_order() {
        let store = Arc::new(MemoryStore::new());
        let repo = TimerRepository::new(store.clone());
        let timers = repo_with(
            r#"[
                {"id":"x","title":"One","description":"","duration":10,"remainingTime":4,"isRunning":false},
                {"id":"y","title":"Two","description":"","duration":20,"remainingTime":20,"isRunning":false}
            ]"#,
        )
        .load();

        repo.save(&timers).unwrap();

        let raw = store.raw(TIMERS_KEY).unwrap();
        assert!(raw.find("\"x\"").unwrap() < raw.find("\"y\"").unwrap());
        assert_eq!(repo.load(), timers);
    }
}
