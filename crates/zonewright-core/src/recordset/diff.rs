//! Late initialization and diffing of record sets
//!
//! A record set is up to date when the patch from a "current" snapshot
//! (an empty parameter set late-initialized from the observed record set) to
//! the desired parameters is empty. Only fields the desired parameters set
//! can appear in the patch, so values the provider fills in on its own never
//! count as drift.

use crate::error::{Error, Result};
use crate::late_init::{late_init_option, late_init_vec};
use crate::model::{RecordSetParameters, RecordType, ResourceRecordSet};
use crate::name::normalize_name;

/// Fill unset fields of `params` from `observed`
///
/// Fields already set are never overwritten. A `None` observation is a
/// no-op, and so is an observed type string [`RecordType`] does not model.
/// Returns true if any field was filled.
pub fn late_initialize(params: &mut RecordSetParameters, observed: Option<&ResourceRecordSet>) -> bool {
    let Some(rr) = observed else {
        return false;
    };

    let mut changed = false;
    if !rr.name.is_empty() {
        changed |= late_init_option(&mut params.name, Some(&rr.name));
    }

    let observed_type = rr.record_type.parse::<RecordType>().ok();
    changed |= late_init_option(&mut params.record_type, observed_type.as_ref());

    changed |= late_init_option(&mut params.ttl, rr.ttl.as_ref());
    changed |= late_init_vec(&mut params.records, &rr.resource_records);

    if let Some(target) = &rr.alias_target {
        changed |= late_init_option(&mut params.alias, Some(&true));
        changed |= late_init_option(&mut params.dns_name, Some(&target.dns_name));
        changed |= late_init_option(&mut params.evaluate_target_health, Some(&target.evaluate_target_health));
    }

    changed
}

/// Fields that differ between current and desired record set parameters
///
/// Each field is `Some(desired value)` when the desired parameters set it to
/// something other than the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSetPatch {
    pub name: Option<String>,
    pub record_type: Option<RecordType>,
    pub ttl: Option<i64>,
    pub records: Option<Vec<String>>,
    pub zone_id: Option<String>,
    pub alias: Option<bool>,
    pub dns_name: Option<String>,
    pub evaluate_target_health: Option<bool>,
}

impl RecordSetPatch {
    /// True when no field differs
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the differing fields, for logging
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.record_type.is_some() {
            fields.push("type");
        }
        if self.ttl.is_some() {
            fields.push("ttl");
        }
        if self.records.is_some() {
            fields.push("records");
        }
        if self.zone_id.is_some() {
            fields.push("zoneId");
        }
        if self.alias.is_some() {
            fields.push("alias");
        }
        if self.dns_name.is_some() {
            fields.push("dnsName");
        }
        if self.evaluate_target_health.is_some() {
            fields.push("evaluateTargetHealth");
        }
        fields
    }
}

fn differing<T: PartialEq + Clone>(current: &Option<T>, target: &Option<T>) -> Option<T> {
    match target {
        Some(value) if current.as_ref() != Some(value) => Some(value.clone()),
        _ => None,
    }
}

/// Compute the patch from the observed record set to `target`
///
/// The current snapshot never carries a zone id, so the zone id slot of the
/// patch is set to the name slot instead of the raw comparison: a record set
/// whose name matches is never reported stale over zone id bookkeeping.
///
/// Alias targets never send a TTL or values, so those slots stay empty for
/// them whatever the desired parameters carry.
///
/// # Errors
///
/// [`Error::Diff`] if `target` has no name to compare.
pub fn create_patch(observed: &ResourceRecordSet, target: &RecordSetParameters) -> Result<RecordSetPatch> {
    if target.name.is_none() {
        return Err(Error::diff("desired record set has no name"));
    }

    let mut current = RecordSetParameters::default();
    late_initialize(&mut current, Some(observed));

    let alias = target.is_alias();
    let records = if !alias && !target.records.is_empty() && target.records != current.records {
        Some(target.records.clone())
    } else {
        None
    };
    let ttl = if alias { None } else { differing(&current.ttl, &target.ttl) };

    let mut patch = RecordSetPatch {
        name: differing(&current.name, &target.name),
        record_type: differing(&current.record_type, &target.record_type),
        ttl,
        records,
        zone_id: differing(&current.zone_id, &target.zone_id),
        alias: differing(&current.alias, &target.alias),
        dns_name: differing(&current.dns_name, &target.dns_name),
        evaluate_target_health: differing(&current.evaluate_target_health, &target.evaluate_target_health),
    };
    patch.zone_id = patch.name.clone();

    Ok(patch)
}

/// Check whether the observed record set already matches `params`
///
/// The desired name is normalized first; `params` itself is left untouched.
pub fn is_up_to_date(params: &RecordSetParameters, observed: &ResourceRecordSet) -> Result<bool> {
    let Some(name) = params.name.as_deref() else {
        return Err(Error::diff("desired record set has no name"));
    };

    let mut target = params.clone();
    target.name = Some(normalize_name(name));

    let patch = create_patch(observed, &target)?;
    if !patch.is_empty() {
        tracing::debug!(record = %name, fields = ?patch.fields(), "record set drifted");
    }
    Ok(patch.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AliasTarget;

    fn desired() -> RecordSetParameters {
        RecordSetParameters::new(
            "crossplane.io",
            RecordType::A,
            "/hostedzone/XXXXXXXXXXXXXXXXXXX",
            vec!["0.0.0.0".to_string()],
        )
        .with_ttl(300)
    }

    fn observed() -> ResourceRecordSet {
        ResourceRecordSet {
            name: "crossplane.io.".to_string(),
            record_type: "A".to_string(),
            ttl: Some(300),
            resource_records: vec!["0.0.0.0".to_string()],
            alias_target: None,
        }
    }

    #[test]
    fn test_matching_record_set_is_up_to_date() {
        assert!(is_up_to_date(&desired(), &observed()).unwrap());
    }

    #[test]
    fn test_differing_values_are_not_up_to_date() {
        let mut rr = observed();
        rr.resource_records = vec!["0.0.0.1".to_string()];

        assert!(!is_up_to_date(&desired(), &rr).unwrap());

        let mut target = desired();
        target.name = Some(normalize_name("crossplane.io"));
        let patch = create_patch(&rr, &target).unwrap();
        assert_eq!(patch.records, Some(vec!["0.0.0.0".to_string()]));
        assert_eq!(patch.fields(), vec!["records"]);
    }

    #[test]
    fn test_single_differing_field_yields_single_patch_field() {
        let mut target = desired();
        target.name = Some("crossplane.io.".to_string());

        let mut rr = observed();
        rr.ttl = Some(60);
        let patch = create_patch(&rr, &target).unwrap();
        assert_eq!(
            patch,
            RecordSetPatch {
                ttl: Some(300),
                ..Default::default()
            }
        );

        let mut rr = observed();
        rr.record_type = "AAAA".to_string();
        let patch = create_patch(&rr, &target).unwrap();
        assert_eq!(patch.fields(), vec!["type"]);
    }

    #[test]
    fn test_unset_desired_fields_are_not_drift() {
        let mut target = desired();
        target.ttl = None;
        target.records.clear();

        let mut rr = observed();
        rr.ttl = Some(86400);
        rr.resource_records = vec!["9.9.9.9".to_string()];

        assert!(is_up_to_date(&target, &rr).unwrap());
    }

    #[test]
    fn test_is_up_to_date_does_not_mutate_desired() {
        let params = desired();
        let before = params.clone();
        let _ = is_up_to_date(&params, &observed()).unwrap();
        assert_eq!(params, before);
    }

    #[test]
    fn test_zone_id_slot_mirrors_name_slot() {
        // The zone id is never observed, yet a matching name keeps it out of
        // the patch; a differing name drags it in with the name's value.
        let mut target = desired();
        target.name = Some("crossplane.io.".to_string());
        let patch = create_patch(&observed(), &target).unwrap();
        assert_eq!(patch.zone_id, None);
        assert!(patch.is_empty());

        target.name = Some("other.crossplane.io.".to_string());
        let patch = create_patch(&observed(), &target).unwrap();
        assert_eq!(patch.name.as_deref(), Some("other.crossplane.io."));
        assert_eq!(patch.zone_id, patch.name);
    }

    #[test]
    fn test_missing_name_is_a_diff_error() {
        let mut target = desired();
        target.name = None;
        assert!(matches!(is_up_to_date(&target, &observed()), Err(Error::Diff(_))));
        assert!(matches!(create_patch(&observed(), &target), Err(Error::Diff(_))));
    }

    #[test]
    fn test_late_initialize_fills_only_unset_fields() {
        let mut params = RecordSetParameters {
            ttl: Some(60),
            ..Default::default()
        };
        let changed = late_initialize(&mut params, Some(&observed()));

        assert!(changed);
        assert_eq!(params.name.as_deref(), Some("crossplane.io."));
        assert_eq!(params.record_type, Some(RecordType::A));
        assert_eq!(params.ttl, Some(60));
        assert_eq!(params.records, vec!["0.0.0.0".to_string()]);
        assert_eq!(params.zone_id, None);
    }

    #[test]
    fn test_late_initialize_never_overwrites() {
        let mut params = desired();
        params.alias = Some(false);
        params.dns_name = Some("mine.example.com".to_string());
        params.evaluate_target_health = Some(true);
        let before = params.clone();

        let mut rr = observed();
        rr.name = "other.".to_string();
        rr.record_type = "TXT".to_string();
        rr.ttl = Some(1);
        rr.resource_records = vec!["x".to_string()];
        rr.alias_target = Some(AliasTarget {
            hosted_zone_id: "Z2".to_string(),
            dns_name: "theirs.example.com".to_string(),
            evaluate_target_health: false,
        });

        assert!(!late_initialize(&mut params, Some(&rr)));
        assert_eq!(params, before);
    }

    #[test]
    fn test_late_initialize_without_observation_is_noop() {
        let mut params = RecordSetParameters::default();
        assert!(!late_initialize(&mut params, None));
        assert_eq!(params, RecordSetParameters::default());
    }

    #[test]
    fn test_late_initialize_ignores_unknown_type() {
        let mut params = RecordSetParameters::default();
        let mut rr = observed();
        rr.record_type = "DS".to_string();
        late_initialize(&mut params, Some(&rr));
        assert_eq!(params.record_type, None);
    }

    #[test]
    fn test_alias_record_set_converges() {
        let target = RecordSetParameters {
            name: Some("www.example.com".to_string()),
            record_type: Some(RecordType::A),
            zone_id: Some("Z1".to_string()),
            alias: Some(true),
            dns_name: Some("lb.example.com.".to_string()),
            evaluate_target_health: Some(false),
            ..Default::default()
        };
        let rr = ResourceRecordSet {
            name: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            ttl: None,
            resource_records: vec![],
            alias_target: Some(AliasTarget {
                hosted_zone_id: "Z1".to_string(),
                dns_name: "lb.example.com.".to_string(),
                evaluate_target_health: false,
            }),
        };
        assert!(is_up_to_date(&target, &rr).unwrap());

        let mut moved = rr.clone();
        if let Some(t) = moved.alias_target.as_mut() {
            t.dns_name = "other-lb.example.com.".to_string();
        }
        assert!(!is_up_to_date(&target, &moved).unwrap());
    }

    #[test]
    fn test_alias_with_ttl_and_values_still_converges() {
        // The provider reports an alias with neither TTL nor values
        let target = RecordSetParameters {
            name: Some("www.example.com".to_string()),
            record_type: Some(RecordType::A),
            zone_id: Some("Z1".to_string()),
            ttl: Some(60),
            records: vec!["192.0.2.1".to_string()],
            alias: Some(true),
            dns_name: Some("lb.example.com.".to_string()),
            evaluate_target_health: Some(false),
        };
        let rr = ResourceRecordSet {
            name: "www.example.com.".to_string(),
            record_type: "A".to_string(),
            ttl: None,
            resource_records: vec![],
            alias_target: Some(AliasTarget {
                hosted_zone_id: "Z1".to_string(),
                dns_name: "lb.example.com.".to_string(),
                evaluate_target_health: false,
            }),
        };

        let patch = create_patch(&rr, &target).unwrap();
        assert_eq!(patch.ttl, None);
        assert_eq!(patch.records, None);
        assert!(is_up_to_date(&target, &rr).unwrap());

        let mut plain = target.clone();
        plain.alias = Some(false);
        let patch = create_patch(&rr, &plain).unwrap();
        assert_eq!(patch.ttl, Some(60));
        assert!(patch.records.is_some());
    }
}
