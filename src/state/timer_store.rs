//! Authoritative timer collection with write-through persistence

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use super::{TimerDraft, TimerId, TimerRecord, TimerUpdate};
use crate::storage::TimerRepository;

/// Single source of truth for all timer records.
///
/// Every mutation is a read-modify-write of the latest collection and writes
/// the whole collection back before the lock is released, so no caller can
/// observe a half-applied change. Unknown ids are ignored.
pub struct TimerStore {
    timers: Mutex<Vec<TimerRecord>>,
    repository: TimerRepository,
}

impl TimerStore {
    /// Build a store from whatever the repository holds
    pub fn load(repository: TimerRepository) -> Self {
        let timers = repository.load();
        info!("Timer store ready with {} timers", timers.len());
        Self {
            timers: Mutex::new(timers),
            repository,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TimerRecord>> {
        self.timers.lock().unwrap_or_else(|poisoned| {
            warn!("Timer store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Write the collection through; failures leave memory authoritative
    fn persist(&self, timers: &[TimerRecord]) {
        if let Err(e) = self.repository.save(timers) {
            error!("Failed to save timers: {:#}", e);
        }
    }

    /// Apply `mutate` to the timer with `id` and persist.
    /// Returns the updated record, or `None` when the id is unknown.
    fn update<F>(&self, id: &TimerId, mutate: F) -> Option<TimerRecord>
    where
        F: FnOnce(&mut TimerRecord),
    {
        let mut timers = self.lock();
        let updated = timers.iter_mut().find(|t| &t.id == id).map(|timer| {
            mutate(timer);
            timer.clone()
        });
        self.persist(&timers);
        updated
    }

    /// Current collection in insertion order
    pub fn snapshot(&self) -> Vec<TimerRecord> {
        self.lock().clone()
    }

    pub fn get(&self, id: &TimerId) -> Option<TimerRecord> {
        self.lock().iter().find(|t| &t.id == id).cloned()
    }

    /// Insert a new stopped timer
    pub fn add(&self, draft: TimerDraft) -> TimerRecord {
        let mut timers = self.lock();
        let mut timer = TimerRecord::new(draft);
        while timers.iter().any(|t| t.id == timer.id) {
            timer.id = TimerId::generate();
        }
        info!("Adding timer {} ({:?}, {}s)", timer.id, timer.title, timer.duration);
        timers.push(timer.clone());
        self.persist(&timers);
        timer
    }

    /// Remove a timer, returns whether it existed
    pub fn delete(&self, id: &TimerId) -> bool {
        let mut timers = self.lock();
        let before = timers.len();
        timers.retain(|t| &t.id != id);
        let removed = timers.len() != before;
        if removed {
            info!("Deleted timer {}", id);
        } else {
            debug!("Delete ignored, no timer {}", id);
        }
        self.persist(&timers);
        removed
    }

    /// Count a running timer down by one second, floored at zero
    pub fn tick(&self, id: &TimerId) -> Option<TimerRecord> {
        let mut timers = self.lock();
        let timer = timers.iter_mut().find(|t| &t.id == id)?;
        if !timer.tick() {
            return Some(timer.clone());
        }
        let ticked = timer.clone();
        if ticked.remaining_time == 0 {
            info!("Timer {} reached zero", id);
        }
        self.persist(&timers);
        Some(ticked)
    }

    /// Merge `update`, restarting the countdown
    pub fn edit(&self, id: &TimerId, update: TimerUpdate) -> Option<TimerRecord> {
        debug!("Editing timer {}: {:?}", id, update);
        self.update(id, |timer| timer.apply(update))
    }

    /// Flip the running flag
    pub fn toggle(&self, id: &TimerId) -> Option<TimerRecord> {
        self.update(id, |timer| {
            timer.toggle();
            debug!("Timer {} running={}", timer.id, timer.is_running);
        })
    }

    /// Back to the full duration, stopped
    pub fn restart(&self, id: &TimerId) -> Option<TimerRecord> {
        self.update(id, TimerRecord::restart)
    }
}
