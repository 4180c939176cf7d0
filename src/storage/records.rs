use std::sync::{Arc, Mutex};

use super::keys::{legacy_claimed_key, legacy_cooldown_key, legacy_spent_key, record_key};
use super::models::{WalletRecord, RECORD_VERSION};
use super::Store;
use crate::error::{LedgerError, StorageError};
use crate::identity::WalletIdentity;
use crate::locks::IdentityLocks;

/// Typed view of a [`Store`]: one [`WalletRecord`] per identity.
///
/// All serialization happens here. Mutations go through [`RecordStore::update`],
/// which serializes read-modify-write cycles per identity.
pub struct RecordStore {
    store: Arc<dyn Store>,
    locks: IdentityLocks<Mutex<()>>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            locks: IdentityLocks::new(),
        }
    }

    /// Load the record for `identity`, or the default record if none exists.
    ///
    /// Falls back to the legacy per-field keys when no record has been written yet.
    pub fn load(&self, identity: &WalletIdentity) -> Result<WalletRecord, StorageError> {
        let key = record_key(identity);
        match self.store.get(&key)? {
            Some(raw) => {
                let record: WalletRecord =
                    serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                if record.version > RECORD_VERSION {
                    return Err(StorageError::Corrupt {
                        key,
                        reason: format!("unsupported schema version {}", record.version),
                    });
                }
                Ok(record)
            }
            None => self.load_legacy(identity),
        }
    }

    /// Apply `mutate` to a copy of the record and persist it.
    ///
    /// Nothing is written when `mutate` fails. If the write itself fails the
    /// stored record is unchanged and the error is returned as `Persistence`.
    pub fn update<T, F>(&self, identity: &WalletIdentity, mutate: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut WalletRecord) -> Result<T, LedgerError>,
    {
        let lock = self.locks.get(identity);
        let _guard = lock.lock().map_err(|_| StorageError::Poisoned)?;

        let mut record = self.load(identity)?;
        let before = record.clone();
        let result = mutate(&mut record)?;

        if record != before {
            record.version = RECORD_VERSION;
            self.save(identity, &record)?;
        }
        Ok(result)
    }

    fn save(&self, identity: &WalletIdentity, record: &WalletRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.store.set(&record_key(identity), &json)
    }

    fn load_legacy(&self, identity: &WalletIdentity) -> Result<WalletRecord, StorageError> {
        let total_claimed = self.read_legacy_u64(&legacy_claimed_key(identity))?;
        let total_spent = self.read_legacy_u64(&legacy_spent_key(identity))?;

        let cooldown_key = legacy_cooldown_key(identity);
        let last_claim_at = match self.store.get(&cooldown_key)? {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|e| StorageError::Corrupt {
                key: cooldown_key,
                reason: e.to_string(),
            })?),
            None => None,
        };

        let record = WalletRecord {
            version: RECORD_VERSION,
            total_claimed: total_claimed.unwrap_or(0),
            total_spent: total_spent.unwrap_or(0),
            last_claim_at,
        };
        if !record.is_empty() {
            log::debug!("Read legacy ledger keys for {}", identity);
        }
        Ok(record)
    }

    fn read_legacy_u64(&self, key: &str) -> Result<Option<u64>, StorageError> {
        match self.store.get(key)? {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn records() -> (Arc<MemoryStore>, RecordStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), RecordStore::new(store))
    }

    #[test]
    fn test_unknown_identity_is_default() {
        let (_, records) = records();
        let record = records.load(&WalletIdentity::from("unseen")).unwrap();
        assert_eq!(record, WalletRecord::default());
    }

    #[test]
    fn test_legacy_keys_are_read_and_migrated() {
        let (store, records) = records();
        let id = WalletIdentity::from("W1");
        store.set("x402_claimed_W1", "10000").unwrap();
        store.set("x402_spent_W1", "4000").unwrap();
        store.set("x402_cooldown_W1", "1700000000000").unwrap();

        let record = records.load(&id).unwrap();
        assert_eq!(record.available(), 6000);
        assert_eq!(record.last_claim_at, Some(1_700_000_000_000));

        records
            .update(&id, |r| {
                r.total_spent += 1;
                Ok(())
            })
            .unwrap();
        let raw = store.get("x402_ledger_W1").unwrap().unwrap();
        let migrated: WalletRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(migrated.total_spent, 4001);
        assert_eq!(migrated.version, RECORD_VERSION);
    }

    #[test]
    fn test_corrupt_record_surfaces_as_storage_error() {
        let (store, records) = records();
        store.set("x402_ledger_W1", "{not json").unwrap();
        let err = records.load(&WalletIdentity::from("W1")).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_future_schema_version_is_rejected() {
        let (store, records) = records();
        store
            .set(
                "x402_ledger_W1",
                r#"{"version":99,"total_claimed":1,"total_spent":0}"#,
            )
            .unwrap();
        assert!(records.load(&WalletIdentity::from("W1")).is_err());
    }

    #[test]
    fn test_failed_mutation_writes_nothing() {
        let (store, records) = records();
        let id = WalletIdentity::from("W1");
        let result: Result<(), _> = records.update(&id, |r| {
            r.total_claimed = 500;
            Err(LedgerError::InvalidAmount("rejected".into()))
        });
        assert!(result.is_err());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_update_locks_do_not_accumulate() {
        let (_, records) = records();
        for i in 0..50 {
            let id = WalletIdentity::from(format!("wallet-{}", i));
            // Rejected mutations take the lock too
            let _ = records.update(&id, |_| -> Result<(), LedgerError> {
                Err(LedgerError::InsufficientBalance {
                    required: 1,
                    available: 0,
                })
            });
            records
                .update(&id, |r| {
                    r.total_claimed += 1;
                    Ok(())
                })
                .unwrap();
        }
        assert!(records.locks.is_empty());
    }
}
