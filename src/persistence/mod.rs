//! Save/load of ship state and planet layout
//!
//! Features:
//! - Opaque key-value store contract (LocalStorage on web, memory elsewhere)
//! - JSON save slots for the ship snapshot and planet layout
//! - Throttled ship saves and debounced planet writes, flushed on teardown

pub mod kv;
pub mod scheduler;
pub mod slots;

pub use kv::{KvStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use kv::LocalStorage;
pub use scheduler::SaveScheduler;
pub use slots::SaveSlots;

/// Persistence failures. Never fatal: callers log and keep the in-memory state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage operation failed: {0}")]
    Storage(String),
    #[error("malformed saved data: {0}")]
    Serde(#[from] serde_json::Error),
}
