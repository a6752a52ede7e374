//! Per-pair mutual exclusion for subscription toggles.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Serializes work on the same `(user, item)` pair inside this process.
///
/// Different pairs never block each other. Idle slots are dropped the next
/// time any pair is locked.
#[derive(Debug, Clone, Default)]
pub struct PairLocks {
    slots: Arc<Mutex<HashMap<(i64, i64), Slot>>>,
}

/// Held while a pair is locked.
#[derive(Debug)]
pub struct PairGuard {
    _guard: OwnedMutexGuard<()>,
}

impl PairLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the pair is free and lock it.
    pub async fn lock(&self, user_id: i64, item_id: i64) -> PairGuard {
        let slot = {
            let mut slots = self.slots.lock();
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry((user_id, item_id)).or_default())
        };
        PairGuard {
            _guard: slot.lock_owned().await,
        }
    }

    /// Number of pairs currently tracked.
    pub fn tracked(&self) -> usize {
        self.slots.lock().len()
    }
}
