//! Managed resources: declared parameters plus a status block
//!
//! These are the objects a [`ResourceStore`](crate::traits::ResourceStore)
//! holds. The reconciler only ever writes back the `status` blocks, a zone's
//! `external_name`, late-initialized parameters and a generated idempotency
//! token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record_set::RecordSetParameters;
use super::zone::{ZoneObservation, ZoneParameters};

/// Condition of a managed resource after its last reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Condition {
    /// Exists at the provider
    Available,
    /// A create call was issued
    Creating,
    /// A delete call was issued
    Deleting,
    /// The last pass failed
    ReconcileError { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    /// When the condition was last recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<DateTime<Utc>>,
}

impl ResourceStatus {
    /// Record a condition and stamp the reconcile time
    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = Some(condition);
        self.last_reconciled = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    #[serde(flatten)]
    pub resource: ResourceStatus,

    #[serde(default)]
    pub at_provider: ZoneObservation,
}

/// A managed hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Store key
    pub name: String,

    /// Provider id without the `/hostedzone/` prefix, set once created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,

    #[serde(default)]
    pub deletion_requested: bool,

    pub spec: ZoneParameters,

    #[serde(default)]
    pub status: ZoneStatus,
}

impl Zone {
    pub fn new(name: impl Into<String>, spec: ZoneParameters) -> Self {
        Self {
            name: name.into(),
            external_name: None,
            deletion_requested: false,
            spec,
            status: ZoneStatus::default(),
        }
    }
}

/// A managed resource record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    /// Store key
    pub name: String,

    #[serde(default)]
    pub deletion_requested: bool,

    pub spec: RecordSetParameters,

    #[serde(default)]
    pub status: ResourceStatus,
}

impl RecordSet {
    pub fn new(name: impl Into<String>, spec: RecordSetParameters) -> Self {
        Self {
            name: name.into(),
            deletion_requested: false,
            spec,
            status: ResourceStatus::default(),
        }
    }
}
