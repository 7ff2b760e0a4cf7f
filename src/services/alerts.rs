//! Dismissible alert board

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Opaque alert identifier
pub type AlertId = u64;

/// Called once when the user dismisses an alert
pub type OnDismiss = Box<dyn FnOnce() + Send>;

/// Where expiry alerts are shown
pub trait AlertSurface: Send + Sync {
    /// Show a persistent alert until retracted or dismissed
    fn raise(&self, message: &str, on_dismiss: OnDismiss) -> AlertId;

    /// Take an alert down without running its dismiss callback
    fn retract(&self, alert_id: AlertId);
}

/// Alert as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

struct Outstanding {
    alert: Alert,
    on_dismiss: OnDismiss,
}

/// In-memory list of outstanding alerts
#[derive(Default)]
pub struct AlertBoard {
    next_id: AtomicU64,
    outstanding: Mutex<Vec<Outstanding>>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding alerts, oldest first
    pub fn list(&self) -> Vec<Alert> {
        self.outstanding
            .lock()
            .map(|outstanding| outstanding.iter().map(|o| o.alert.clone()).collect())
            .unwrap_or_default()
    }

    fn take(&self, alert_id: AlertId) -> Option<Outstanding> {
        let mut outstanding = match self.outstanding.lock() {
            Ok(outstanding) => outstanding,
            Err(e) => {
                warn!("Failed to lock alert board: {}", e);
                return None;
            }
        };
        let index = outstanding.iter().position(|o| o.alert.id == alert_id)?;
        Some(outstanding.remove(index))
    }

    /// User dismissal: remove the alert and run its callback.
    /// Returns false if the alert was already gone.
    pub fn dismiss(&self, alert_id: AlertId) -> bool {
        // The callback may call back into `retract`, so the lock is released first.
        match self.take(alert_id) {
            Some(outstanding) => {
                info!("Alert {} dismissed", alert_id);
                (outstanding.on_dismiss)();
                true
            }
            None => {
                debug!("Alert {} already gone", alert_id);
                false
            }
        }
    }
}

impl AlertSurface for AlertBoard {
    fn raise(&self, message: &str, on_dismiss: OnDismiss) -> AlertId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let alert = Alert {
            id,
            message: message.to_string(),
            raised_at: Utc::now(),
        };
        info!("Alert {}: {}", id, message);

        match self.outstanding.lock() {
            Ok(mut outstanding) => outstanding.push(Outstanding { alert, on_dismiss }),
            Err(e) => warn!("Failed to lock alert board: {}", e),
        }
        id
    }

    fn retract(&self, alert_id: AlertId) {
        if self.take(alert_id).is_some() {
            debug!("Alert {} retracted", alert_id);
        }
    }
}
