//! Observe/create/update/delete clients for managed resources
//!
//! Each client composes the core functions into the four calls a managed
//! resource reconciler makes. They hold no state of their own beyond the
//! provider handle; everything they learn is written onto the resource passed
//! in, and the caller decides when to persist it.

pub mod record_set;
pub mod zone;

pub use record_set::RecordSetExternal;
pub use zone::ZoneExternal;

/// What an observe call learned about the external resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalObservation {
    /// The resource exists at the provider
    pub resource_exists: bool,

    /// The resource matches the desired parameters
    pub resource_up_to_date: bool,

    /// Observe filled unset desired parameters, which should be persisted
    pub resource_late_initialized: bool,
}

impl ExternalObservation {
    /// Observation of a resource the provider does not have
    pub fn missing() -> Self {
        Self::default()
    }
}
