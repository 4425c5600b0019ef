//! Per-source duplication locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::ContentId;

/// Serialises duplication of one source object within this process. Entries are
/// dropped once nobody holds or waits on them.
#[derive(Default)]
pub struct SourceLocks {
    locks: Mutex<HashMap<ContentId, Arc<AsyncMutex<()>>>>,
}

impl SourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: ContentId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of sources currently held or awaited.
    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
