//! State management module
//!
//! Timer records, the store that owns them, the expiry notifier and the
//! application state tying them together.

pub mod app_state;
pub mod expiry;
pub mod timer_record;
pub mod timer_store;

// Re-export main types
pub use app_state::AppState;
pub use expiry::{ExpiryNotifier, ExpiryPhase};
pub use timer_record::{TimerDraft, TimerId, TimerRecord, TimerUpdate};
pub use timer_store::TimerStore;
