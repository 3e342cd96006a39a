// # Resource Store Trait
//
// Defines the interface to the store holding managed zones and record sets.
//
// ## Purpose
//
// The store is the source of desired state and the sink for what the
// reconciler learns:
// - Desired parameters are read at the start of every pass
// - Status blocks, external names and late-initialized parameters are
//   written back after each entity is reconciled
// - A zone's generated idempotency token is written back before the create
//   call that uses it
//
// ## Implementations
//
// - Memory: tests and throwaway runs
// - File: a single JSON manifest

use async_trait::async_trait;

use crate::model::{RecordSet, Zone};

/// Trait for resource store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Trust Level: Trusted (Core Component)
///
/// Stores perform I/O for persistence and nothing else. They never talk to
/// the DNS provider and never decide what to reconcile.
///
/// ## Implementation Guidelines
///
/// - **Async I/O only**: never block the runtime
/// - **Explicit flush**: `flush()` must persist all pending changes
/// - **Upsert semantics**: `save_*` creates or replaces by name
/// - **Idempotent removal**: removing a missing entry is not an error
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// All managed zones, in name order
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// A managed zone by name
    async fn get_zone(&self, name: &str) -> Result<Option<Zone>, crate::Error>;

    /// Create or replace a managed zone
    async fn save_zone(&self, zone: &Zone) -> Result<(), crate::Error>;

    /// Forget a managed zone
    async fn remove_zone(&self, name: &str) -> Result<(), crate::Error>;

    /// All managed record sets, in name order
    async fn list_record_sets(&self) -> Result<Vec<RecordSet>, crate::Error>;

    /// A managed record set by name
    async fn get_record_set(&self, name: &str) -> Result<Option<RecordSet>, crate::Error>;

    /// Create or replace a managed record set
    async fn save_record_set(&self, record_set: &RecordSet) -> Result<(), crate::Error>;

    /// Forget a managed record set
    async fn remove_record_set(&self, name: &str) -> Result<(), crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing resource stores from configuration
#[async_trait]
pub trait ResourceStoreFactory: Send + Sync {
    /// Create a ResourceStore instance from configuration
    async fn create(&self, config: &crate::config::StoreConfig) -> Result<Box<dyn ResourceStore>, crate::Error>;
}
