//! Record set parameters, the provider's record set shape and change batches

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// DNS record types a record set may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Soa,
    A,
    Txt,
    Ns,
    Cname,
    Mx,
    Naptr,
    Ptr,
    Srv,
    Spf,
    Aaaa,
    Caa,
}

impl RecordType {
    /// The provider's string for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Soa => "SOA",
            RecordType::A => "A",
            RecordType::Txt => "TXT",
            RecordType::Ns => "NS",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Naptr => "NAPTR",
            RecordType::Ptr => "PTR",
            RecordType::Srv => "SRV",
            RecordType::Spf => "SPF",
            RecordType::Aaaa => "AAAA",
            RecordType::Caa => "CAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    /// Exact, case-sensitive match against the provider's type strings
    fn from_str(s: &str) -> Result<Self> {
        let t = match s {
            "SOA" => RecordType::Soa,
            "A" => RecordType::A,
            "TXT" => RecordType::Txt,
            "NS" => RecordType::Ns,
            "CNAME" => RecordType::Cname,
            "MX" => RecordType::Mx,
            "NAPTR" => RecordType::Naptr,
            "PTR" => RecordType::Ptr,
            "SRV" => RecordType::Srv,
            "SPF" => RecordType::Spf,
            "AAAA" => RecordType::Aaaa,
            "CAA" => RecordType::Caa,
            other => return Err(Error::invalid_input(format!("unsupported record type: {other}"))),
        };
        Ok(t)
    }
}

/// How a change batch entry is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Delete,
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Delete => "DELETE",
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state of a resource record set
///
/// `name`, `record_type` and `zone_id` are required before reconciliation
/// begins (see [`RecordSetParameters::validate`]). They are optional here so
/// that an empty snapshot can be late-initialized from observed state when
/// diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSetParameters {
    /// Name of the record, with or without the trailing root `.`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,

    /// Cache time to live, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    /// Record values, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<String>,

    /// Id of the hosted zone the record set lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,

    /// Alias record sets only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<bool>,

    /// Alias target DNS name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_target_health: Option<bool>,
}

impl RecordSetParameters {
    /// Create parameters for a plain (non-alias) record set
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        zone_id: impl Into<String>,
        records: Vec<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            record_type: Some(record_type),
            zone_id: Some(zone_id.into()),
            records,
            ..Self::default()
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn require_name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .ok_or_else(|| Error::invalid_input("record set name is required"))
    }

    pub fn require_type(&self) -> Result<RecordType> {
        self.record_type
            .ok_or_else(|| Error::invalid_input("record set type is required"))
    }

    pub fn require_zone_id(&self) -> Result<&str> {
        self.zone_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::invalid_input("record set zone id is required"))
    }

    /// Whether this record set routes to an alias target
    pub fn is_alias(&self) -> bool {
        self.alias == Some(true)
    }

    /// Check the fields reconciliation relies on
    pub fn validate(&self) -> Result<()> {
        if self.require_name()?.is_empty() {
            return Err(Error::invalid_input("record set name cannot be empty"));
        }
        self.require_type()?;
        self.require_zone_id()?;
        if self.is_alias() {
            if self.dns_name.as_deref().is_none_or(str::is_empty) {
                return Err(Error::invalid_input("alias record sets need a dnsName"));
            }
        } else if self.records.is_empty() {
            return Err(Error::invalid_input("record set needs at least one record value"));
        }
        Ok(())
    }
}

/// Alias target of a record set, as the provider reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

/// A record set as the provider sees it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecordSet {
    /// Fully qualified name, always ending in `.`
    pub name: String,

    /// Raw type string; may be a type [`RecordType`] does not model
    #[serde(rename = "type")]
    pub record_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_records: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
}

/// One entry of a change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub action: ChangeAction,
    pub resource_record_set: ResourceRecordSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub changes: Vec<Change>,
}

/// Request for `ChangeResourceRecordSets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeResourceRecordSetsInput {
    pub hosted_zone_id: String,
    pub change_batch: ChangeBatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_round_trips_through_provider_strings() {
        for t in [
            RecordType::Soa,
            RecordType::A,
            RecordType::Txt,
            RecordType::Ns,
            RecordType::Cname,
            RecordType::Mx,
            RecordType::Naptr,
            RecordType::Ptr,
            RecordType::Srv,
            RecordType::Spf,
            RecordType::Aaaa,
            RecordType::Caa,
        ] {
            assert_eq!(t.as_str().parse::<RecordType>().unwrap(), t);
        }
        assert!("DS".parse::<RecordType>().is_err());
        assert!("a".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_parameters_deserialize_from_manifest_json() {
        let params: RecordSetParameters = serde_json::from_value(serde_json::json!({
            "name": "crossplane.io",
            "type": "A",
            "ttl": 300,
            "records": ["0.0.0.0"],
            "zoneId": "/hostedzone/XXXX"
        }))
        .unwrap();

        assert_eq!(
            params,
            RecordSetParameters::new("crossplane.io", RecordType::A, "/hostedzone/XXXX", vec!["0.0.0.0".into()])
                .with_ttl(300)
        );
    }

    #[test]
    fn test_validate() {
        let valid = RecordSetParameters::new("a.example.com", RecordType::A, "Z1", vec!["1.2.3.4".into()]);
        assert!(valid.validate().is_ok());

        let mut no_zone = valid.clone();
        no_zone.zone_id = None;
        assert!(matches!(no_zone.validate(), Err(Error::InvalidInput(_))));

        let mut no_values = valid.clone();
        no_values.records.clear();
        assert!(no_values.validate().is_err());

        let alias = RecordSetParameters {
            alias: Some(true),
            dns_name: Some("lb.example.com".into()),
            records: vec![],
            ..valid
        };
        assert!(alias.validate().is_ok());
    }
}
