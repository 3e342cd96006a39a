// # zonewright-core
//
// Core library for reconciling hosted DNS zones and record sets.
//
// ## Architecture Overview
//
// Leaves first:
// - **name**: DNS name normalization (single trailing root label)
// - **late_init**: fill unset desired fields from observed state
// - **recordset**: change-batch builder, lookup resolver and diff engine
// - **zone**: hosted zone requests and observation
// - **error**: error taxonomy and not-found classifiers
//
// Around them:
// - **DnsProvider**: Trait for hosted zone and record set API calls
// - **ResourceStore**: Trait for desired state and status persistence
// - **external**: observe/create/update/delete clients per resource kind
// - **Reconciler**: periodic passes over every managed resource
// - **ProviderRegistry**: Plugin-based registry for providers and stores
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 3. **Library-First**: All core functionality can be used as a library
// 4. **No hidden retries**: a failed resource waits for the next pass

pub mod config;
pub mod engine;
pub mod error;
pub mod external;
pub mod late_init;
pub mod model;
pub mod name;
pub mod recordset;
pub mod registry;
pub mod state;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::{Config, ProviderConfig, ReconcilerConfig, StoreConfig};
pub use engine::{ReconcileEvent, Reconciler};
pub use error::{Error, Result, is_deleted_record_set, is_not_found_record_set, is_not_found_zone};
pub use external::{ExternalObservation, RecordSetExternal, ZoneExternal};
pub use name::normalize_name;
pub use registry::ProviderRegistry;
pub use state::{FileResourceStore, MemoryResourceStore};
pub use traits::{DnsProvider, ResourceStore};
