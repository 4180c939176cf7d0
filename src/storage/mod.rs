//! Storage and persistence layer
//!
//! - Key-value `Store` capability (memory and file system backends)
//! - Per-wallet record model and key layout
//! - Record adapter with per-identity critical sections

mod file_system;
mod keys;
mod memory;
mod models;
mod records;

pub use file_system::FileStore;
pub use keys::{legacy_claimed_key, legacy_cooldown_key, legacy_spent_key, record_key, KEY_PREFIX};
pub use memory::MemoryStore;
pub use models::{WalletRecord, RECORD_VERSION};
pub use records::RecordStore;

use crate::error::StorageError;

/// Durable string key-value store injected into the ledger and cooldown gate.
///
/// A successful `set` must be durable before it returns. A failed `set` must
/// leave the previous value readable.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
