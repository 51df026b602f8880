use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per timetable id. Adds to the same timetable run one at a
/// time; different timetables never wait on each other.
#[derive(Debug, Default)]
pub struct TimetableLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TimetableLocks {
    pub async fn acquire(&self, timetable_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries only the map still references have no holder or waiter.
            entries.retain(|id, lock| id == timetable_id || Arc::strong_count(lock) > 1);
            entries
                .entry(timetable_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
