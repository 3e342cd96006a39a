//! Data model for zonewright
//!
//! Three families of types live here:
//!
//! - **Parameters** ([`RecordSetParameters`], [`ZoneParameters`]): the
//!   desired state a user declares.
//! - **Provider shapes** ([`ResourceRecordSet`], [`HostedZone`] and the
//!   `*Input`/`*Output` request types): what the remote provider accepts and
//!   returns. Observed values are produced fresh on every lookup.
//! - **Managed resources** ([`Zone`], [`RecordSet`]): parameters plus the
//!   status block the reconciler writes back to the store.

pub mod record_set;
pub mod resource;
pub mod zone;

pub use record_set::{
    AliasTarget, Change, ChangeAction, ChangeBatch, ChangeResourceRecordSetsInput, RecordSetParameters,
    RecordType, ResourceRecordSet,
};
pub use resource::{Condition, RecordSet, ResourceStatus, Zone, ZoneStatus};
pub use zone::{
    CreateHostedZoneInput, CreateHostedZoneOutput, DelegationSet, DeleteHostedZoneInput, GetHostedZoneOutput,
    HostedZone, HostedZoneConfig, UpdateHostedZoneCommentInput, Vpc, ZoneObservation, ZoneParameters,
};
