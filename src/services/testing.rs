//! Recording collaborators for tests

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use super::{Alarm, AlertBoard, AlertId, AlertSurface, OnDismiss};

/// Counts start/stop calls that actually changed the alarm
#[derive(Default)]
pub struct RecordingAlarm {
    active: AtomicBool,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl RecordingAlarm {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Alarm for RecordingAlarm {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Alert board that also keeps every message ever raised
#[derive(Default)]
pub struct RecordingAlerts {
    pub board: AlertBoard,
    raised: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn raised(&self) -> Vec<String> {
        self.raised.lock().unwrap().clone()
    }

    pub fn outstanding(&self) -> usize {
        self.board.list().len()
    }
}

impl AlertSurface for RecordingAlerts {
    fn raise(&self, message: &str, on_dismiss: OnDismiss) -> AlertId {
        self.raised.lock().unwrap().push(message.to_string());
        self.board.raise(message, on_dismiss)
    }

    fn retract(&self, alert_id: AlertId) {
        self.board.retract(alert_id);
    }
}
