//! Lock discipline for product operations.
//!
//! # Modes
//! - `per_id`: one async mutex per product id. A read-merge-write on one id
//!   never interleaves with another writer on the same id, while unrelated
//!   ids and collection reads run freely.
//! - `global`: a single mutex around every operation. Serializes all CRUD
//!   traffic regardless of verb or target.
//!
//! # Design Decisions
//! - Per-id mutexes are created on demand and dropped once no request holds
//!   or waits on them, so the table stays proportional to live contention
//! - Waiters are granted in Tokio's mutex order; no extra queueing

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<i64, Arc<Mutex<()>>>;

/// Concurrency-control strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    #[default]
    PerId,
    Global,
}

/// Lock provider handed to the product service.
#[derive(Debug)]
pub struct Locks {
    mode: LockMode,
    global: Arc<Mutex<()>>,
    items: Arc<LockTable>,
}

/// Held for the duration of one operation. Releases on drop.
#[must_use]
#[derive(Debug)]
pub struct LockGuard {
    _kind: GuardKind,
}

#[derive(Debug)]
enum GuardKind {
    Unlocked,
    Global(OwnedMutexGuard<()>),
    Item(ItemGuard),
}

#[derive(Debug)]
struct ItemGuard {
    id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
}

impl Drop for ItemGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the table itself still references an idle mutex.
        self.table
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl Locks {
    pub fn new(mode: LockMode) -> Self {
        Self {
            mode,
            global: Arc::new(Mutex::new(())),
            items: Arc::new(DashMap::new()),
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Lock for operations on the whole collection (list, create).
    pub async fn collection(&self) -> LockGuard {
        let kind = match self.mode {
            LockMode::Global => GuardKind::Global(self.global.clone().lock_owned().await),
            LockMode::PerId => GuardKind::Unlocked,
        };
        LockGuard { _kind: kind }
    }

    /// Lock for operations on a single product.
    pub async fn item(&self, id: i64) -> LockGuard {
        let kind = match self.mode {
            LockMode::Global => GuardKind::Global(self.global.clone().lock_owned().await),
            LockMode::PerId => {
                // Built before waiting so a cancelled waiter still prunes
                // the entry it may have kept alive.
                let mut slot = ItemGuard {
                    id,
                    guard: None,
                    table: self.items.clone(),
                };
                let mutex = self.items.entry(id).or_default().clone();
                slot.guard = Some(mutex.lock_owned().await);
                GuardKind::Item(slot)
            }
        };
        LockGuard { _kind: kind }
    }

    /// Number of ids with a live per-id mutex.
    pub fn tracked_ids(&self) -> usize {
        self.items.len()
    }
}

impl Default for Locks {
    fn default() -> Self {
        Self::new(LockMode::default())
    }
}
