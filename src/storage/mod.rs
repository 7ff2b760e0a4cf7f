//! Persistence module
//!
//! A durable key-value blob store and the adapter that keeps the timer
//! collection in it.

pub mod kv;
pub mod repository;

// Re-export main types
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use repository::{TimerRepository, TIMERS_KEY};
