// # Memory Resource Store
//
// In-memory implementation of ResourceStore.
//
// ## Crash Behavior
//
// - Everything is lost on restart, including generated idempotency tokens
// - A zone whose create call was in flight when the process died will get a
//   fresh token on the next run, so Route 53 cannot deduplicate the retry
//
// ## When to Use
//
// - Tests
// - Dry runs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StoreConfig;
use crate::model::{RecordSet, Zone};
use crate::traits::state_store::{ResourceStore, ResourceStoreFactory};

#[derive(Debug, Default)]
struct Resources {
    zones: BTreeMap<String, Zone>,
    record_sets: BTreeMap<String, RecordSet>,
}

/// In-memory resource store
///
/// Clones share the same underlying maps, so a test can keep a handle to
/// inspect what the reconciler wrote.
///
/// # Example
///
/// ```rust,no_run
/// use zonewright_core::model::{Zone, ZoneParameters};
/// use zonewright_core::state::MemoryResourceStore;
/// use zonewright_core::traits::ResourceStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryResourceStore::new();
///     store.save_zone(&Zone::new("example", ZoneParameters::new("example.com"))).await?;
///     assert_eq!(store.list_zones().await?.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    inner: Arc<RwLock<Resources>>,
}

impl MemoryResourceStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of zones and record sets held
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.zones.len() + guard.record_sets.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every zone and record set
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        guard.zones.clear();
        guard.record_sets.clear();
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn list_zones(&self) -> Result<Vec<Zone>, Error> {
        Ok(self.inner.read().await.zones.values().cloned().collect())
    }

    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, Error> {
        Ok(self.inner.read().await.zones.get(name).cloned())
    }

    async fn save_zone(&self, zone: &Zone) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.zones.insert(zone.name.clone(), zone.clone());
        Ok(())
    }

    async fn remove_zone(&self, name: &str) -> Result<(), Error> {
        self.inner.write().await.zones.remove(name);
        Ok(())
    }

    async fn list_record_sets(&self) -> Result<Vec<RecordSet>, Error> {
        Ok(self.inner.read().await.record_sets.values().cloned().collect())
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<RecordSet>, Error> {
        Ok(self.inner.read().await.record_sets.get(name).cloned())
    }

    async fn save_record_set(&self, record_set: &RecordSet) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.record_sets.insert(record_set.name.clone(), record_set.clone());
        Ok(())
    }

    async fn remove_record_set(&self, name: &str) -> Result<(), Error> {
        self.inner.write().await.record_sets.remove(name);
        Ok(())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Nothing buffered
        Ok(())
    }
}

/// Factory for [`MemoryResourceStore`]
pub struct MemoryResourceStoreFactory;

#[async_trait]
impl ResourceStoreFactory for MemoryResourceStoreFactory {
    async fn create(&self, _config: &StoreConfig) -> Result<Box<dyn ResourceStore>, Error> {
        Ok(Box::new(MemoryResourceStore::new()))
    }
}
