//! Key/value persistence contract for the sidebar records.
//!
//! The engine only needs synchronous `get`/`set` of strings. Any call may fail
//! (storage disabled, disk full, ...); callers treat failures as non-fatal.

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A store that is never available, e.g. when persistence is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("persistence disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("persistence disabled".to_string()))
    }
}
