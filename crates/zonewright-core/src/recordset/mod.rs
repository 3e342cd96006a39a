//! Record set requests and lookups
//!
//! - [`generate_change_input`] builds the single-change batch for a
//!   create/upsert/delete of one record set.
//! - [`get_resource_record_set`] finds the observed record set matching the
//!   desired name and type.
//! - [`diff`] holds late initialization and the up-to-date check.

pub mod diff;

pub use diff::{RecordSetPatch, create_patch, is_up_to_date, late_initialize};

use crate::error::{Error, Result};
use crate::model::{
    AliasTarget, Change, ChangeAction, ChangeBatch, ChangeResourceRecordSetsInput, RecordSetParameters,
    ResourceRecordSet,
};
use crate::name::normalize_name;
use crate::traits::DnsProvider;

/// TTL used when the desired parameters leave it unset
pub const DEFAULT_TTL: i64 = 300;

/// Build the change request applying `action` to the record set `params`
/// describes
///
/// The batch always holds exactly one change. Plain record sets carry the
/// TTL (defaulting to [`DEFAULT_TTL`]) and one resource record per value, in
/// order. Alias record sets carry an alias target in the record set's own
/// zone and no TTL or values.
///
/// # Errors
///
/// [`Error::InvalidInput`] when the name, type or zone id is missing, or an
/// alias record set has no DNS name.
pub fn generate_change_input(params: &RecordSetParameters, action: ChangeAction) -> Result<ChangeResourceRecordSetsInput> {
    let name = params.require_name()?;
    let record_type = params.require_type()?;
    let zone_id = params.require_zone_id()?;

    let resource_record_set = if params.is_alias() {
        let dns_name = params
            .dns_name
            .as_deref()
            .ok_or_else(|| Error::invalid_input("alias record sets need a dnsName"))?;
        ResourceRecordSet {
            name: name.to_string(),
            record_type: record_type.as_str().to_string(),
            ttl: None,
            resource_records: Vec::new(),
            alias_target: Some(AliasTarget {
                hosted_zone_id: zone_id.to_string(),
                dns_name: dns_name.to_string(),
                evaluate_target_health: params.evaluate_target_health.unwrap_or(false),
            }),
        }
    } else {
        ResourceRecordSet {
            name: name.to_string(),
            record_type: record_type.as_str().to_string(),
            ttl: Some(params.ttl.unwrap_or(DEFAULT_TTL)),
            resource_records: params.records.clone(),
            alias_target: None,
        }
    };

    Ok(ChangeResourceRecordSetsInput {
        hosted_zone_id: zone_id.to_string(),
        change_batch: ChangeBatch {
            comment: None,
            changes: vec![Change {
                action,
                resource_record_set,
            }],
        },
    })
}

/// Find the observed record set matching `params`' name and type
///
/// Lists every record set in the zone and returns the first whose name
/// equals the normalized desired name and whose type string equals the
/// desired type, both compared exactly.
///
/// # Errors
///
/// - [`Error::RecordSetNotFound`] when nothing matches.
/// - Any provider error from the list call, unchanged.
pub async fn get_resource_record_set<P>(provider: &P, params: &RecordSetParameters) -> Result<ResourceRecordSet>
where
    P: DnsProvider + ?Sized,
{
    let name = normalize_name(params.require_name()?);
    let record_type = params.require_type()?;
    let zone_id = params.require_zone_id()?;

    let record_sets = provider.list_resource_record_sets(zone_id).await?;
    tracing::debug!(
        zone = %zone_id,
        count = record_sets.len(),
        "listed record sets"
    );

    record_sets
        .into_iter()
        .find(|rr| rr.name == name && rr.record_type == record_type.as_str())
        .ok_or_else(|| Error::RecordSetNotFound {
            name,
            record_type: record_type.to_string(),
            zone_id: zone_id.to_string(),
        })
}
