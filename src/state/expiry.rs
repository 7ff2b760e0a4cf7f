//! Expiry detection and the shared alarm
//!
//! Each timer is either armed or expired. A timer fires when its remaining
//! time is observed at zero after having been nonzero (or never seen), and
//! only once until it is re-armed by a dismissal or a restart. The set of
//! expired timers lives here and nowhere else: the alarm is started when it
//! becomes non-empty and stopped when it becomes empty again.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{TimerId, TimerRecord};
use crate::services::{Alarm, AlertId, AlertSurface};

/// Where a timer stands with respect to its expiry alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ExpiryPhase {
    Armed,
    Expired { alert: AlertId },
}

#[derive(Debug)]
struct Watch {
    phase: ExpiryPhase,
    last_remaining: Option<u64>,
}

impl Watch {
    fn armed() -> Self {
        Self {
            phase: ExpiryPhase::Armed,
            last_remaining: None,
        }
    }
}

type Watches = HashMap<TimerId, Watch>;

struct Shared {
    watches: Mutex<Watches>,
    alarm: Arc<dyn Alarm>,
    alerts: Arc<dyn AlertSurface>,
}

/// Reacts to timers reaching zero with one alert each and one shared alarm
#[derive(Clone)]
pub struct ExpiryNotifier {
    shared: Arc<Shared>,
}

fn expired_count(watches: &Watches) -> usize {
    watches
        .values()
        .filter(|w| matches!(w.phase, ExpiryPhase::Expired { .. }))
        .count()
}

impl ExpiryNotifier {
    pub fn new(alarm: Arc<dyn Alarm>, alerts: Arc<dyn AlertSurface>) -> Self {
        Self {
            shared: Arc::new(Shared {
                watches: Mutex::new(HashMap::new()),
                alarm,
                alerts,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Watches> {
        self.shared.watches.lock().unwrap_or_else(|poisoned| {
            warn!("Expiry notifier lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Compare a fresh snapshot against what was seen before.
    /// Fires newly expired timers and retires timers that disappeared.
    pub fn observe(&self, timers: &[TimerRecord]) {
        let mut watches = self.lock();

        let present: HashSet<&TimerId> = timers.iter().map(|t| &t.id).collect();
        let vanished: Vec<TimerId> = watches
            .keys()
            .filter(|id| !present.contains(id))
            .cloned()
            .collect();
        for id in vanished {
            self.settle(&mut watches, &id);
            watches.remove(&id);
        }

        let mut firing = Vec::new();
        for timer in timers {
            let watch = watches.entry(timer.id.clone()).or_insert_with(Watch::armed);
            let previous = watch.last_remaining.replace(timer.remaining_time);
            if timer.remaining_time == 0
                && previous != Some(0)
                && watch.phase == ExpiryPhase::Armed
            {
                firing.push(timer);
            }
        }

        for timer in firing {
            self.fire(&mut watches, timer);
        }
    }

    fn fire(&self, watches: &mut Watches, timer: &TimerRecord) {
        if expired_count(watches) == 0 {
            self.shared.alarm.start();
        }

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let id = timer.id.clone();
        let alert = self.shared.alerts.raise(
            &format!("Timer \"{}\" has ended!", timer.title),
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    ExpiryNotifier { shared }.dismiss(&id);
                }
            }),
        );

        info!("Timer {} expired, alert {}", timer.id, alert);
        if let Some(watch) = watches.get_mut(&timer.id) {
            watch.phase = ExpiryPhase::Expired { alert };
        }
    }

    /// Move an expired timer back to armed. Returns whether it was expired.
    fn settle(&self, watches: &mut Watches, id: &TimerId) -> bool {
        let Some(watch) = watches.get_mut(id) else {
            return false;
        };
        let ExpiryPhase::Expired { alert } = watch.phase else {
            return false;
        };

        watch.phase = ExpiryPhase::Armed;
        self.shared.alerts.retract(alert);
        debug!("Timer {} re-armed, alert {} retracted", id, alert);

        if expired_count(watches) == 0 {
            self.shared.alarm.stop();
        }
        true
    }

    /// User dismissed the alert for `id`. No-op if nothing is outstanding.
    pub fn dismiss(&self, id: &TimerId) -> bool {
        let mut watches = self.lock();
        self.settle(&mut watches, id)
    }

    /// Timer restarted: dismiss, and let the next countdown fire again
    pub fn rearm(&self, id: &TimerId) {
        let mut watches = self.lock();
        self.settle(&mut watches, id);
        if let Some(watch) = watches.get_mut(id) {
            watch.last_remaining = None;
        }
    }

    /// Timer deleted: deletion implies dismissal
    pub fn forget(&self, id: &TimerId) {
        let mut watches = self.lock();
        self.settle(&mut watches, id);
        watches.remove(id);
    }

    pub fn phase(&self, id: &TimerId) -> Option<ExpiryPhase> {
        self.lock().get(id).map(|w| w.phase)
    }

    pub fn expired_count(&self) -> usize {
        expired_count(&self.lock())
    }

    /// Whether the alarm has been asked to ring
    pub fn is_alarm_active(&self) -> bool {
        self.expired_count() > 0
    }
}
