//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use tokio::sync::watch;
use tracing::warn;

use super::{ExpiryNotifier, TimerDraft, TimerId, TimerRecord, TimerStore, TimerUpdate};
use crate::services::{AlertBoard, AlertId};

/// Main application state: the timer store, the expiry notifier and the
/// channel that publishes every new snapshot of the collection.
///
/// Each operation runs as one critical section: mutate and persist, then let
/// the notifier observe the result, then publish it to the ticker.
pub struct AppState {
    pub store: TimerStore,
    pub notifier: ExpiryNotifier,
    pub alerts: Arc<AlertBoard>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Seconds are counted in ticks of this length
    pub tick_millis: u64,
    /// Channel for timer collection updates
    pub timer_update_tx: watch::Sender<Vec<TimerRecord>>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<Vec<TimerRecord>>,
    op_lock: Mutex<()>,
}

impl AppState {
    pub fn new(
        store: TimerStore,
        notifier: ExpiryNotifier,
        alerts: Arc<AlertBoard>,
        port: u16,
        host: String,
        tick_millis: u64,
    ) -> Self {
        let snapshot = store.snapshot();
        notifier.observe(&snapshot);
        let (timer_update_tx, timer_update_rx) = watch::channel(snapshot);

        Self {
            store,
            notifier,
            alerts,
            start_time: Instant::now(),
            port,
            host,
            tick_millis,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            op_lock: Mutex::new(()),
        }
    }

    fn begin(&self) -> MutexGuard<'_, ()> {
        self.op_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Let the notifier see the new collection, then publish it
    fn publish(&self) {
        let snapshot = self.store.snapshot();
        self.notifier.observe(&snapshot);
        self.timer_update_tx.send_replace(snapshot);
    }

    pub fn timers(&self) -> Vec<TimerRecord> {
        self.store.snapshot()
    }

    pub fn timer(&self, id: &TimerId) -> Option<TimerRecord> {
        self.store.get(id)
    }

    pub fn add_timer(&self, draft: TimerDraft) -> TimerRecord {
        let _op = self.begin();
        let timer = self.store.add(draft);
        self.publish();
        timer
    }

    pub fn edit_timer(&self, id: &TimerId, update: TimerUpdate) -> Option<TimerRecord> {
        let _op = self.begin();
        let timer = self.store.edit(id, update);
        self.publish();
        timer
    }

    /// Dismiss any outstanding alert, then remove the timer
    pub fn delete_timer(&self, id: &TimerId) -> bool {
        let _op = self.begin();
        self.notifier.forget(id);
        let removed = self.store.delete(id);
        self.publish();
        removed
    }

    pub fn toggle_timer(&self, id: &TimerId) -> Option<TimerRecord> {
        let _op = self.begin();
        let timer = self.store.toggle(id);
        self.publish();
        timer
    }

    /// Dismiss any outstanding alert, then reset the countdown
    pub fn restart_timer(&self, id: &TimerId) -> Option<TimerRecord> {
        let _op = self.begin();
        self.notifier.rearm(id);
        let timer = self.store.restart(id);
        self.publish();
        timer
    }

    /// One second of countdown for `id`, read from the current state
    pub fn tick(&self, id: &TimerId) -> Option<TimerRecord> {
        let _op = self.begin();
        let before = self.store.get(id)?;
        let after = self.store.tick(id)?;
        if after != before {
            self.publish();
        }
        Some(after)
    }

    /// Dismiss the expiry alert of `id` without touching the timer
    pub fn dismiss_timer(&self, id: &TimerId) -> bool {
        let _op = self.begin();
        self.notifier.dismiss(id)
    }

    /// Dismiss an alert by its own id, as the alert surface does
    pub fn dismiss_alert(&self, alert_id: AlertId) -> bool {
        let _op = self.begin();
        let dismissed = self.alerts.dismiss(alert_id);
        if !dismissed {
            warn!("Dismiss ignored, no alert {}", alert_id);
        }
        dismissed
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::testing::RecordingAlarm;
    use crate::state::ExpiryPhase;
    use crate::storage::{MemoryStore, TimerRepository};

    pub(crate) struct Harness {
        pub state: Arc<AppState>,
        pub alarm: Arc<RecordingAlarm>,
        pub kv: Arc<MemoryStore>,
    }

    pub(crate) fn harness_with(kv: Arc<MemoryStore>) -> Harness {
        let alarm = Arc::new(RecordingAlarm::default());
        let alerts = Arc::new(AlertBoard::new());
        let store = TimerStore::load(TimerRepository::new(kv.clone()));
        let notifier = ExpiryNotifier::new(alarm.clone(), alerts.clone());
        let state = Arc::new(AppState::new(
            store,
            notifier,
            alerts,
            0,
            "127.0.0.1".to_string(),
            1000,
        ));
        Harness { state, alarm, kv }
    }

    pub(crate) fn harness() -> Harness {
        harness_with(Arc::new(MemoryStore::new()))
    }

    pub(crate) fn draft(title: &str, duration: u64) -> TimerDraft {
        TimerDraft {
            title: title.to_string(),
            description: String::new(),
            duration,
        }
    }

    #[test]
    fn tea_timer_expires_once() {
        let h = harness();
        let id = h.state.add_timer(draft("Tea", 5)).id;
        h.state.toggle_timer(&id);

        for _ in 0..5 {
            h.state.tick(&id);
        }
        h.state.tick(&id);

        assert_eq!(h.state.timer(&id).unwrap().remaining_time, 0);
        assert!(matches!(
            h.state.notifier.phase(&id),
            Some(ExpiryPhase::Expired { .. })
        ));
        assert_eq!(h.alarm.starts(), 1);
        let alerts = h.state.alerts.list();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Timer \"Tea\" has ended!");
    }

    #[test]
    fn two_concurrent_expiries_share_one_alarm() {
        let h = harness();
        let a = h.state.add_timer(draft("A", 2)).id;
        let b = h.state.add_timer(draft("B", 2)).id;
        h.state.toggle_timer(&a);
        h.state.toggle_timer(&b);

        for _ in 0..2 {
            h.state.tick(&a);
            h.state.tick(&b);
        }
        assert_eq!(h.alarm.starts(), 1);

        let alerts = h.state.alerts.list();
        assert!(h.state.dismiss_alert(alerts[0].id));
        assert_eq!(h.alarm.stops(), 0);
        assert!(h.state.dismiss_alert(alerts[1].id));
        assert!(!h.state.dismiss_alert(alerts[1].id));

        assert_eq!(h.alarm.starts(), 1);
        assert_eq!(h.alarm.stops(), 1);
    }

    #[test]
    fn restart_dismisses_and_rearms() {
        let h = harness();
        let id = h.state.add_timer(draft("Eggs", 1)).id;
        h.state.toggle_timer(&id);
        h.state.tick(&id);
        assert!(h.alarm.is_active());

        let timer = h.state.restart_timer(&id).unwrap();
        assert_eq!(timer.remaining_time, 1);
        assert!(!timer.is_running);
        assert!(!h.alarm.is_active());
        assert!(h.state.alerts.list().is_empty());

        h.state.toggle_timer(&id);
        h.state.tick(&id);
        assert_eq!(h.alarm.starts(), 2);
        assert_eq!(h.state.alerts.list().len(), 1);
    }

    #[test]
    fn delete_of_expired_timer_releases_alarm() {
        let h = harness();
        let id = h.state.add_timer(draft("Pasta", 1)).id;
        h.state.toggle_timer(&id);
        h.state.tick(&id);

        assert!(h.state.delete_timer(&id));

        assert!(!h.alarm.is_active());
        assert!(h.state.alerts.list().is_empty());
        assert_eq!(h.state.notifier.phase(&id), None);
        assert!(!h.state.delete_timer(&id));
        assert_eq!(h.alarm.stops(), 1);
    }

    #[test]
    fn edit_of_expired_timer_keeps_alert_until_dismissed() {
        let h = harness();
        let id = h.state.add_timer(draft("Rice", 1)).id;
        h.state.toggle_timer(&id);
        h.state.tick(&id);

        let timer = h
            .state
            .edit_timer(
                &id,
                TimerUpdate {
                    duration: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(timer.remaining_time, 3);
        assert_eq!(h.state.alerts.list().len(), 1);
        assert!(h.state.dismiss_timer(&id));
        assert!(!h.alarm.is_active());
    }

    #[test]
    fn updates_are_published_to_watchers() {
        let h = harness();
        let rx = h.state.timer_update_tx.subscribe();
        let timer = h.state.add_timer(draft("Tea", 5));
        h.state.toggle_timer(&timer.id);

        let published = rx.borrow().clone();
        assert_eq!(published.len(), 1);
        assert!(published[0].is_running);
    }

    #[test]
    fn damaged_store_does_not_ring_at_startup() {
        let kv = Arc::new(MemoryStore::with_entry(
            crate::storage::TIMERS_KEY,
            r#"[{"id":"z","title":"Zero","description":"","duration":0,"remainingTime":0,"isRunning":false}]"#,
        ));

        let h = harness_with(kv);

        assert!(h.state.timers().is_empty());
        assert_eq!(h.alarm.starts(), 0);
        assert!(h.state.alerts.list().is_empty());
    }

    #[test]
    fn reload_after_expiry_starts_fresh() {
        let h = harness();
        let id = h.state.add_timer(draft("Tea", 1)).id;
        h.state.toggle_timer(&id);
        h.state.tick(&id);

        let reloaded = harness_with(h.kv.clone());
        let timer = reloaded.state.timer(&id).unwrap();

        assert_eq!(timer.remaining_time, 1);
        assert!(!timer.is_running);
        assert_eq!(reloaded.alarm.starts(), 0);
    }
}
