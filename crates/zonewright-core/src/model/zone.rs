//! Hosted zone parameters, observations and provider request shapes

use serde::{Deserialize, Serialize};

/// Desired state of a hosted zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneParameters {
    /// Domain name; the trailing `.` is optional. Immutable once created.
    pub name: String,

    /// Idempotency token for the create call. Generated on the first create
    /// attempt when unset and immutable afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Immutable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_zone: Option<bool>,

    /// Private zones only. Immutable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,

    /// Private zones only, meaningful only next to `vpc_id`. Immutable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_region: Option<String>,
}

impl ZoneParameters {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_private(&self) -> bool {
        self.private_zone == Some(true)
    }
}

/// Observed state of a hosted zone, owned by the zone's status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneObservation {
    /// Provider id, e.g. `/hostedzone/Z123`
    pub id: String,

    pub resource_record_set_count: i64,

    /// Authoritative name servers, when the provider reported a delegation set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_servers: Vec<String>,
}

/// Configuration block of a hosted zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedZoneConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_zone: Option<bool>,
}

/// A hosted zone as the provider reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedZone {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<HostedZoneConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_record_set_count: Option<i64>,
}

/// Name servers assigned to a hosted zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationSet {
    pub name_servers: Vec<String>,
}

/// VPC association of a private hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
    pub vpc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_region: Option<String>,
}

/// Request for `CreateHostedZone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostedZoneInput {
    pub name: String,
    pub caller_reference: String,
    pub hosted_zone_config: HostedZoneConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Vpc>,
}

/// Response of `CreateHostedZone`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostedZoneOutput {
    pub hosted_zone: HostedZone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_set: Option<DelegationSet>,
}

/// Response of `GetHostedZone`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHostedZoneOutput {
    pub hosted_zone: HostedZone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation_set: Option<DelegationSet>,
}

/// Request for `UpdateHostedZoneComment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHostedZoneCommentInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Request for `DeleteHostedZone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteHostedZoneInput {
    pub id: String,
}
