//! Timer Board - a local multi-timer service
//!
//! Named countdown timers that run, pause and restart independently, persist
//! across restarts, and raise a dismissible alert plus a shared alarm when
//! they reach zero.

pub mod config;
pub mod state;
pub mod storage;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
