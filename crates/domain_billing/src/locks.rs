//! Per-unit serialisation of ledger writes

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use core_kernel::UnitId;

/// One async mutex per unit, created on first use
///
/// Holding a unit's guard excludes every other allocation or reversal for
/// that unit in this process. Different units never contend.
///
/// Entries are never pruned: the map holds one mutex per unit ever locked,
/// which stays bounded by the unit register.
#[derive(Debug, Default)]
pub struct UnitLocks {
    locks: Mutex<HashMap<UnitId, Arc<Mutex<()>>>>,
}

impl UnitLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `unit_id`
    pub async fn acquire(&self, unit_id: UnitId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(unit_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of units that have been locked at least once
    pub async fn tracked_units(&self) -> usize {
        self.locks.lock().await.len()
    }
}
