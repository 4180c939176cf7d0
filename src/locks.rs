use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use crate::identity::WalletIdentity;

/// Lazily created lock per wallet identity.
///
/// `L` is the lock kind: a std mutex for synchronous store updates, a tokio
/// mutex for flows that await the network while holding it. An entry lives
/// only as long as some [`IdentityLock`] handle for it does.
pub struct IdentityLocks<L> {
    locks: Mutex<HashMap<WalletIdentity, Arc<L>>>,
}

/// Handle to one identity's lock. Dropping the last handle removes the entry.
///
/// Declare the guard after the handle so the guard is released first.
pub struct IdentityLock<'a, L> {
    owner: &'a IdentityLocks<L>,
    identity: WalletIdentity,
    lock: Arc<L>,
}

impl<L: Default> IdentityLocks<L> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, identity: &WalletIdentity) -> IdentityLock<'_, L> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let lock = locks.entry(identity.clone()).or_default().clone();
        IdentityLock {
            owner: self,
            identity: identity.clone(),
            lock,
        }
    }
}

impl<L> IdentityLocks<L> {
    /// Identities with at least one live handle
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .map(|locks| locks.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: Default> Default for IdentityLocks<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Deref for IdentityLock<'_, L> {
    type Target = L;

    fn deref(&self) -> &L {
        &self.lock
    }
}

impl<L> Drop for IdentityLock<'_, L> {
    fn drop(&mut self) {
        let mut locks = self
            .owner
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Map entry plus this handle: nobody else is waiting on it
        let unused = locks
            .get(&self.identity)
            .map(|entry| Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(entry) == 2)
            .unwrap_or(false);
        if unused {
            locks.remove(&self.identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_identity_shares_lock() {
        let locks: IdentityLocks<Mutex<()>> = IdentityLocks::new();
        let a = locks.get(&WalletIdentity::from("W1"));
        let b = locks.get(&WalletIdentity::from("W1"));
        let c = locks.get(&WalletIdentity::from("W2"));
        assert!(Arc::ptr_eq(&a.lock, &b.lock));
        assert!(!Arc::ptr_eq(&a.lock, &c.lock));
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_entries_are_pruned_after_last_handle() {
        let locks: IdentityLocks<Mutex<()>> = IdentityLocks::new();
        let w1 = WalletIdentity::from("W1");

        let first = locks.get(&w1);
        let second = locks.get(&w1);
        drop(first);
        assert_eq!(locks.len(), 1);

        drop(second);
        assert!(locks.is_empty());

        for i in 0..100 {
            let handle = locks.get(&WalletIdentity::from(format!("fresh-{}", i)));
            let _guard = handle.lock().unwrap();
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_lock_survives_while_contended() {
        let locks: Arc<IdentityLocks<Mutex<u32>>> = Arc::new(IdentityLocks::new());
        let w1 = WalletIdentity::from("W1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = locks.clone();
                let w1 = w1.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let lock = locks.get(&w1);
                        *lock.lock().unwrap() += 1;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(locks.is_empty());
    }
}
