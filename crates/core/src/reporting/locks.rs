use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::fixture::FixtureId;

/// Keyed async lock serializing record-and-reconcile per fixture.
///
/// Entries are held weakly and pruned on every acquire, so fixtures nobody is
/// reporting on cost nothing.
#[derive(Clone, Default)]
pub struct FixtureLocks {
    entries: Arc<StdMutex<HashMap<FixtureId, Weak<Mutex<()>>>>>,
}

impl FixtureLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, fixture_id: &FixtureId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = match self.entries.lock() {
                Ok(entries) => entries,
                Err(poisoned) => poisoned.into_inner(),
            };
            entries.retain(|_, entry| entry.strong_count() > 0);

            match entries.get(fixture_id).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    let created = Arc::new(Mutex::new(()));
                    entries.insert(fixture_id.clone(), Arc::downgrade(&created));
                    created
                }
            }
        };

        lock.lock_owned().await
    }

    /// Number of fixtures with a live lock.
    pub fn tracked(&self) -> usize {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.values().filter(|entry| entry.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::FixtureLocks;
    use crate::domain::fixture::FixtureId;

    fn fixture(id: &str) -> FixtureId {
        FixtureId(id.to_owned())
    }

    #[tokio::test]
    async fn same_fixture_is_exclusive() {
        let locks = FixtureLocks::new();
        let held = locks.acquire(&fixture("FX-1")).await;

        let contender = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.acquire(&fixture("FX-1")).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .expect("waiter should acquire after release")
            .expect("task should not panic");
    }

    #[tokio::test]
    async fn different_fixtures_do_not_block_each_other() {
        let locks = FixtureLocks::new();
        let _first = locks.acquire(&fixture("FX-1")).await;
        let second = tokio::time::timeout(Duration::from_secs(1), locks.acquire(&fixture("FX-2")))
            .await;
        assert!(second.is_ok());
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = FixtureLocks::new();
        drop(locks.acquire(&fixture("FX-1")).await);
        assert_eq!(locks.tracked(), 0);

        let _held = locks.acquire(&fixture("FX-2")).await;
        assert_eq!(locks.tracked(), 1);
    }
}
