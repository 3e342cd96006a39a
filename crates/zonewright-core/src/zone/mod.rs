//! Hosted zone lifecycle
//!
//! Builds the provider requests for creating, updating and deleting hosted
//! zones and folds provider responses back into a zone's observation.

use crate::late_init::late_init_option;
use crate::model::{
    CreateHostedZoneInput, DelegationSet, DeleteHostedZoneInput, HostedZone, HostedZoneConfig,
    UpdateHostedZoneCommentInput, Vpc, ZoneObservation, ZoneParameters,
};

/// Prefix Route 53 puts in front of hosted zone ids
pub const HOSTED_ZONE_ID_PREFIX: &str = "/hostedzone/";

/// Build the request creating the hosted zone `params` describes
///
/// When `params` has no caller reference a fresh UUIDv4 is generated and
/// stored on `params` before the request is built, so repeated calls reuse
/// the same token. The caller is responsible for persisting it.
///
/// A VPC is attached only for a private zone with a `vpc_id`. An unset
/// `private_zone` means public.
pub fn create_zone_request(params: &mut ZoneParameters) -> CreateHostedZoneInput {
    let caller_reference = params
        .caller_reference
        .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
        .clone();

    let vpc = if params.is_private() {
        params.vpc_id.as_ref().map(|vpc_id| Vpc {
            vpc_id: vpc_id.clone(),
            vpc_region: params.vpc_region.clone(),
        })
    } else {
        None
    };

    CreateHostedZoneInput {
        name: params.name.clone(),
        caller_reference,
        hosted_zone_config: HostedZoneConfig {
            comment: params.comment.clone(),
            private_zone: params.private_zone,
        },
        vpc,
    }
}

/// Build the request replacing a hosted zone's comment
pub fn update_zone_request(id: impl Into<String>, comment: Option<String>) -> UpdateHostedZoneCommentInput {
    UpdateHostedZoneCommentInput {
        id: id.into(),
        comment,
    }
}

/// Build the request deleting a hosted zone
pub fn delete_zone_request(id: impl Into<String>) -> DeleteHostedZoneInput {
    DeleteHostedZoneInput { id: id.into() }
}

/// Overwrite `observation` with what the provider reported
///
/// Every field is replaced; values the provider left out become empty or
/// zero rather than keeping what was there before.
pub fn apply_observation(
    observation: &mut ZoneObservation,
    hosted_zone: &HostedZone,
    delegation_set: Option<&DelegationSet>,
) {
    *observation = ZoneObservation {
        id: hosted_zone.id.clone(),
        resource_record_set_count: hosted_zone.resource_record_set_count.unwrap_or(0),
        name_servers: delegation_set.map(|d| d.name_servers.clone()).unwrap_or_default(),
    };
}

/// Fill unset zone parameters from the observed hosted zone
///
/// Returns true if any field was filled.
pub fn late_initialize(params: &mut ZoneParameters, hosted_zone: &HostedZone) -> bool {
    let mut changed = late_init_option(&mut params.caller_reference, hosted_zone.caller_reference.as_ref());
    if let Some(config) = &hosted_zone.config {
        changed |= late_init_option(&mut params.comment, config.comment.as_ref());
        changed |= late_init_option(&mut params.private_zone, config.private_zone.as_ref());
    }
    changed
}

/// Whether the hosted zone matches `params`
///
/// The comment is the only field that can change after creation. An unset
/// desired comment never counts as drift.
pub fn is_up_to_date(params: &ZoneParameters, hosted_zone: &HostedZone) -> bool {
    let Some(desired) = params.comment.as_ref() else {
        return true;
    };
    let observed = hosted_zone.config.as_ref().and_then(|c| c.comment.as_ref());
    observed == Some(desired)
}

/// Strip the `/hostedzone/` prefix from a provider zone id
pub fn external_name_from_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_ID_PREFIX).unwrap_or(id)
}

/// Expand an external name back into a provider zone id
pub fn id_from_external_name(external_name: &str) -> String {
    if external_name.starts_with(HOSTED_ZONE_ID_PREFIX) {
        external_name.to_string()
    } else {
        format!("{HOSTED_ZONE_ID_PREFIX}{external_name}")
    }
}
