// Conversions between the core model and aws-sdk-route53 types
//
// Builders for shapes with required members return a `BuildError`; those
// surface as `Error::InvalidInput` before anything is sent.

use aws_sdk_route53::types;
use zonewright_core::model;
use zonewright_core::{Error, Result};

fn build_error(err: impl std::fmt::Display) -> Error {
    Error::invalid_input(format!("Invalid Route 53 request: {err}"))
}

pub fn hosted_zone_config_to_sdk(config: &model::HostedZoneConfig) -> types::HostedZoneConfig {
    types::HostedZoneConfig::builder()
        .set_comment(config.comment.clone())
        .set_private_zone(config.private_zone)
        .build()
}

pub fn vpc_to_sdk(vpc: &model::Vpc) -> types::Vpc {
    types::Vpc::builder()
        .vpc_id(&vpc.vpc_id)
        .set_vpc_region(vpc.vpc_region.as_deref().map(types::VpcRegion::from))
        .build()
}

pub fn hosted_zone_from_sdk(zone: types::HostedZone) -> model::HostedZone {
    model::HostedZone {
        id: zone.id,
        name: zone.name,
        caller_reference: Some(zone.caller_reference).filter(|r| !r.is_empty()),
        config: zone.config.map(|c| model::HostedZoneConfig {
            comment: c.comment,
            private_zone: Some(c.private_zone),
        }),
        resource_record_set_count: zone.resource_record_set_count,
    }
}

pub fn delegation_set_from_sdk(set: types::DelegationSet) -> model::DelegationSet {
    model::DelegationSet {
        name_servers: set.name_servers,
    }
}

/// Observed record set; the type string is kept verbatim
pub fn record_set_from_sdk(rr: types::ResourceRecordSet) -> model::ResourceRecordSet {
    model::ResourceRecordSet {
        record_type: rr.r#type.as_str().to_string(),
        name: rr.name,
        ttl: rr.ttl,
        resource_records: rr
            .resource_records
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.value)
            .collect(),
        alias_target: rr.alias_target.map(|t| model::AliasTarget {
            hosted_zone_id: t.hosted_zone_id,
            dns_name: t.dns_name,
            evaluate_target_health: t.evaluate_target_health,
        }),
    }
}

pub fn record_set_to_sdk(rr: &model::ResourceRecordSet) -> Result<types::ResourceRecordSet> {
    let records = rr
        .resource_records
        .iter()
        .map(|value| types::ResourceRecord::builder().value(value).build().map_err(build_error))
        .collect::<Result<Vec<_>>>()?;

    let alias_target = rr
        .alias_target
        .as_ref()
        .map(|t| {
            types::AliasTarget::builder()
                .hosted_zone_id(&t.hosted_zone_id)
                .dns_name(&t.dns_name)
                .evaluate_target_health(t.evaluate_target_health)
                .build()
                .map_err(build_error)
        })
        .transpose()?;

    types::ResourceRecordSet::builder()
        .name(&rr.name)
        .r#type(types::RrType::from(rr.record_type.as_str()))
        .set_ttl(rr.ttl)
        .set_resource_records((!records.is_empty()).then_some(records))
        .set_alias_target(alias_target)
        .build()
        .map_err(build_error)
}

pub fn change_batch_to_sdk(batch: &model::ChangeBatch) -> Result<types::ChangeBatch> {
    let changes = batch
        .changes
        .iter()
        .map(|change| {
            types::Change::builder()
                .action(types::ChangeAction::from(change.action.as_str()))
                .resource_record_set(record_set_to_sdk(&change.resource_record_set)?)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>>>()?;

    types::ChangeBatch::builder()
        .set_comment(batch.comment.clone())
        .set_changes(Some(changes))
        .build()
        .map_err(build_error)
}
