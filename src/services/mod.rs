//! External collaborators
//!
//! The alarm sound and the alert surface the expiry notifier drives.

pub mod alarm;
pub mod alerts;
#[cfg(test)]
pub mod testing;

// Re-export main types
pub use alarm::{Alarm, CommandAlarm};
pub use alerts::{Alert, AlertBoard, AlertId, AlertSurface, OnDismiss};
