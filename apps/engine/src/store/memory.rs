use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::{GameStore, StoreError};
use crate::domain::ids::GameId;

#[derive(Debug, Clone)]
struct Stored {
    version: u64,
    snapshot: String,
}

/// In-process store. Compare-and-swap runs under the map's shard lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: DashMap<GameId, Stored>,
    active: Mutex<BTreeSet<GameId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a snapshot as-is, bypassing validation. Used for imports and
    /// for seeding damaged data in tests.
    pub fn put_raw(&self, id: &GameId, version: u64, snapshot: impl Into<String>) {
        self.games.insert(
            id.clone(),
            Stored {
                version,
                snapshot: snapshot.into(),
            },
        );
        self.active.lock().insert(id.clone());
    }

    pub fn is_active(&self, id: &GameId) -> bool {
        self.active.lock().contains(id)
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert(&self, id: &GameId, version: u64, snapshot: &str) -> Result<bool, StoreError> {
        use dashmap::mapref::entry::Entry;

        match self.games.entry(id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Stored {
                    version,
                    snapshot: snapshot.to_string(),
                });
                self.active.lock().insert(id.clone());
                Ok(true)
            }
        }
    }

    async fn get(&self, id: &GameId) -> Result<Option<String>, StoreError> {
        Ok(self.games.get(id).map(|stored| stored.snapshot.clone()))
    }

    async fn compare_and_swap(
        &self,
        id: &GameId,
        expected: u64,
        version: u64,
        snapshot: &str,
    ) -> Result<bool, StoreError> {
        let Some(mut stored) = self.games.get_mut(id) else {
            return Ok(false);
        };
        if stored.version != expected {
            return Ok(false);
        }
        *stored = Stored {
            version,
            snapshot: snapshot.to_string(),
        };
        Ok(true)
    }

    async fn active_games(&self) -> Result<Vec<GameId>, StoreError> {
        Ok(self.active.lock().iter().cloned().collect())
    }

    async fn deactivate(&self, id: &GameId) -> Result<(), StoreError> {
        self.active.lock().remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> GameId {
        GameId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn insert_refuses_taken_ids() {
        let store = MemoryStore::new();
        assert!(store.insert(&id("g1"), 1, "{}").await.unwrap());
        assert!(!store.insert(&id("g1"), 1, "other").await.unwrap());
        assert_eq!(store.get(&id("g1")).await.unwrap().as_deref(), Some("{}"));
        assert_eq!(store.active_games().await.unwrap(), vec![id("g1")]);
    }

    #[tokio::test]
    async fn compare_and_swap_checks_the_version() {
        let store = MemoryStore::new();
        store.insert(&id("g1"), 1, "v1").await.unwrap();

        assert!(!store.compare_and_swap(&id("g1"), 7, 8, "stale").await.unwrap());
        assert!(store.compare_and_swap(&id("g1"), 1, 2, "v2").await.unwrap());
        assert!(!store.compare_and_swap(&id("g1"), 1, 2, "again").await.unwrap());
        assert_eq!(store.get(&id("g1")).await.unwrap().as_deref(), Some("v2"));

        assert!(!store.compare_and_swap(&id("missing"), 0, 1, "x").await.unwrap());
    }

    #[tokio::test]
    async fn deactivate_keeps_the_snapshot() {
        let store = MemoryStore::new();
        store.insert(&id("g1"), 1, "v1").await.unwrap();
        store.deactivate(&id("g1")).await.unwrap();
        assert!(!store.is_active(&id("g1")));
        assert!(store.active_games().await.unwrap().is_empty());
        assert!(store.get(&id("g1")).await.unwrap().is_some());
    }
}
