//! Per-record async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use mailgate_core::types::RecordKey;

/// One async mutex per record key, created on demand.
///
/// Entries are dropped once nobody holds or waits on them, so the table
/// only ever contains keys that are in use.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: DashMap<RecordKey, Arc<Mutex<()>>>,
}

impl KeyLocks {
    /// Wait for exclusive access to `key`.
    pub(crate) async fn lock(&self, key: &RecordKey) -> KeyGuard<'_> {
        let mutex = self.locks.entry(key.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;
        KeyGuard {
            locks: self,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one key; released on drop.
pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: RecordKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyLocks::default());
        let key = RecordKey::for_token("t");

        let guard = locks.lock(&key).await;
        let contender = {
            let locks = Arc::clone(&locks);
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(&key).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = KeyLocks::default();
        let a = locks.lock(&RecordKey::for_token("a")).await;
        let b = locks.lock(&RecordKey::for_token("b")).await;
        assert_eq!(locks.len(), 2);
        drop(a);
        drop(b);
        assert_eq!(locks.len(), 0);
    }
}
