//! Test doubles and common utilities for reconciliation contract tests
//!
//! `MockDnsProvider` keeps hosted zones and record sets in memory and applies
//! change batches the way Route 53 does. `RecordingStore` wraps the memory
//! store. Both append to one shared [`CallLog`], so tests can assert on the
//! order of store writes relative to provider calls.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use zonewright_core::error::{ERR_CODE_NO_SUCH_HOSTED_ZONE, Error, Result};
use zonewright_core::model::{
    ChangeAction, ChangeResourceRecordSetsInput, CreateHostedZoneInput, CreateHostedZoneOutput, DelegationSet,
    DeleteHostedZoneInput, GetHostedZoneOutput, HostedZone, HostedZoneConfig, RecordSet, RecordSetParameters,
    RecordType, ResourceRecordSet, UpdateHostedZoneCommentInput, Zone, ZoneParameters,
};
use zonewright_core::traits::{DnsProvider, ResourceStore};
use zonewright_core::zone::external_name_from_id;
use zonewright_core::{MemoryResourceStore, ReconcilerConfig, normalize_name};

/// Ordered record of provider calls and store writes
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.starts_with(prefix))
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    zones: BTreeMap<String, HostedZone>,
    record_sets: BTreeMap<String, Vec<ResourceRecordSet>>,
    caller_references: Vec<String>,
    next_zone: usize,
    /// Operation name -> error code to fail with, once
    failures: BTreeMap<String, String>,
}

/// In-memory stand-in for the Route 53 API
#[derive(Debug, Clone)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
    log: CallLog,
}

impl MockDnsProvider {
    pub fn new(log: CallLog) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState::default())),
            log,
        }
    }

    /// Make the next call to `operation` fail with an API error `code`
    pub fn fail_next(&self, operation: &str, code: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation.to_string(), code.to_string());
    }

    /// Seed a hosted zone and return its bare id
    pub fn add_zone(&self, name: &str, comment: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_zone += 1;
        let id = format!("Z{:04}", state.next_zone);
        state.zones.insert(
            id.clone(),
            HostedZone {
                id: format!("/hostedzone/{id}"),
                name: normalize_name(name),
                caller_reference: None,
                config: Some(HostedZoneConfig {
                    comment: comment.map(str::to_string),
                    private_zone: Some(false),
                }),
                resource_record_set_count: Some(2),
            },
        );
        state.record_sets.insert(id.clone(), Vec::new());
        id
    }

    /// Seed a record set in zone `zone_id`
    pub fn add_record_set(&self, zone_id: &str, record_set: ResourceRecordSet) {
        self.state
            .lock()
            .unwrap()
            .record_sets
            .entry(external_name_from_id(zone_id).to_string())
            .or_default()
            .push(record_set);
    }

    /// Drop a hosted zone behind the reconciler's back
    pub fn remove_zone(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.zones.remove(external_name_from_id(id));
        state.record_sets.remove(external_name_from_id(id));
    }

    /// Change a hosted zone's comment behind the reconciler's back
    pub fn set_comment(&self, id: &str, comment: Option<&str>) {
        if let Some(zone) = self.state.lock().unwrap().zones.get_mut(external_name_from_id(id)) {
            zone.config.get_or_insert_with(HostedZoneConfig::default).comment = comment.map(str::to_string);
        }
    }

    pub fn zone(&self, id: &str) -> Option<HostedZone> {
        self.state.lock().unwrap().zones.get(external_name_from_id(id)).cloned()
    }

    pub fn zone_count(&self) -> usize {
        self.state.lock().unwrap().zones.len()
    }

    pub fn record_sets(&self, zone_id: &str) -> Vec<ResourceRecordSet> {
        self.state
            .lock()
            .unwrap()
            .record_sets
            .get(external_name_from_id(zone_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn caller_references(&self) -> Vec<String> {
        self.state.lock().unwrap().caller_references.clone()
    }

    fn call(&self, operation: &str) -> Result<()> {
        self.log.push(format!("provider:{operation}"));
        match self.state.lock().unwrap().failures.remove(operation) {
            Some(code) => Err(Error::api(code, format!("injected failure for {operation}"))),
            None => Ok(()),
        }
    }
}

fn no_such_zone(id: &str) -> Error {
    Error::api(ERR_CODE_NO_SUCH_HOSTED_ZONE, format!("No hosted zone found with ID: {id}"))
}

fn invalid_change(message: String) -> Error {
    Error::api("InvalidChangeBatch", message)
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn create_hosted_zone(&self, input: &CreateHostedZoneInput) -> Result<CreateHostedZoneOutput> {
        self.call("CreateHostedZone")?;
        let mut state = self.state.lock().unwrap();
        if state.caller_references.contains(&input.caller_reference) {
            return Err(Error::api(
                "HostedZoneAlreadyExists",
                format!("caller reference {} was already used", input.caller_reference),
            ));
        }
        state.caller_references.push(input.caller_reference.clone());

        state.next_zone += 1;
        let id = format!("Z{:04}", state.next_zone);
        let hosted_zone = HostedZone {
            id: format!("/hostedzone/{id}"),
            name: normalize_name(&input.name),
            caller_reference: Some(input.caller_reference.clone()),
            config: Some(HostedZoneConfig {
                comment: input.hosted_zone_config.comment.clone(),
                private_zone: Some(input.vpc.is_some()),
            }),
            resource_record_set_count: Some(2),
        };
        state.zones.insert(id.clone(), hosted_zone.clone());
        state.record_sets.insert(id, Vec::new());

        Ok(CreateHostedZoneOutput {
            hosted_zone,
            delegation_set: Some(DelegationSet {
                name_servers: vec!["ns-1.awsdns-01.org".to_string(), "ns-2.awsdns-02.com".to_string()],
            }),
        })
    }

    async fn get_hosted_zone(&self, id: &str) -> Result<GetHostedZoneOutput> {
        self.call("GetHostedZone")?;
        let state = self.state.lock().unwrap();
        let hosted_zone = state
            .zones
            .get(external_name_from_id(id))
            .cloned()
            .ok_or_else(|| no_such_zone(id))?;
        Ok(GetHostedZoneOutput {
            hosted_zone,
            delegation_set: Some(DelegationSet {
                name_servers: vec!["ns-1.awsdns-01.org".to_string()],
            }),
        })
    }

    async fn update_hosted_zone_comment(&self, input: &UpdateHostedZoneCommentInput) -> Result<()> {
        self.call("UpdateHostedZoneComment")?;
        let mut state = self.state.lock().unwrap();
        let zone = state
            .zones
            .get_mut(external_name_from_id(&input.id))
            .ok_or_else(|| no_such_zone(&input.id))?;
        zone.config.get_or_insert_with(HostedZoneConfig::default).comment = input.comment.clone();
        Ok(())
    }

    async fn delete_hosted_zone(&self, input: &DeleteHostedZoneInput) -> Result<()> {
        self.call("DeleteHostedZone")?;
        let mut state = self.state.lock().unwrap();
        let id = external_name_from_id(&input.id).to_string();
        state.zones.remove(&id).ok_or_else(|| no_such_zone(&input.id))?;
        state.record_sets.remove(&id);
        Ok(())
    }

    async fn list_resource_record_sets(&self, hosted_zone_id: &str) -> Result<Vec<ResourceRecordSet>> {
        self.call("ListResourceRecordSets")?;
        let state = self.state.lock().unwrap();
        state
            .record_sets
            .get(external_name_from_id(hosted_zone_id))
            .cloned()
            .ok_or_else(|| no_such_zone(hosted_zone_id))
    }

    async fn change_resource_record_sets(&self, input: &ChangeResourceRecordSetsInput) -> Result<()> {
        let actions: Vec<&str> = input.change_batch.changes.iter().map(|c| c.action.as_str()).collect();
        self.call(&format!("ChangeResourceRecordSets:{}", actions.join(",")))?;

        let mut state = self.state.lock().unwrap();
        let record_sets = state
            .record_sets
            .get_mut(external_name_from_id(&input.hosted_zone_id))
            .ok_or_else(|| no_such_zone(&input.hosted_zone_id))?;

        for change in &input.change_batch.changes {
            let mut rrset = change.resource_record_set.clone();
            rrset.name = normalize_name(&rrset.name);
            let existing = record_sets
                .iter()
                .position(|r| r.name == rrset.name && r.record_type == rrset.record_type);

            match (change.action, existing) {
                (ChangeAction::Create, Some(_)) => {
                    return Err(invalid_change(format!(
                        "Tried to create resource record set {} type {}, but it already exists",
                        rrset.name, rrset.record_type
                    )));
                }
                (ChangeAction::Create, None) | (ChangeAction::Upsert, None) => record_sets.push(rrset),
                (ChangeAction::Upsert, Some(i)) => record_sets[i] = rrset,
                (ChangeAction::Delete, Some(i)) => {
                    record_sets.remove(i);
                }
                (ChangeAction::Delete, None) => {
                    return Err(invalid_change(format!(
                        "Tried to delete resource record set {} type {}, but it was not found",
                        rrset.name, rrset.record_type
                    )));
                }
            }
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Memory store that logs every write
#[derive(Debug, Clone)]
pub struct RecordingStore {
    inner: MemoryResourceStore,
    log: CallLog,
}

impl RecordingStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            inner: MemoryResourceStore::new(),
            log,
        }
    }
}

#[async_trait::async_trait]
impl ResourceStore for RecordingStore {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.inner.list_zones().await
    }

    async fn get_zone(&self, name: &str) -> Result<Option<Zone>> {
        self.inner.get_zone(name).await
    }

    async fn save_zone(&self, zone: &Zone) -> Result<()> {
        self.log.push(format!(
            "store:save_zone:{}:{}",
            zone.name,
            zone.spec.caller_reference.as_deref().unwrap_or("-")
        ));
        self.inner.save_zone(zone).await
    }

    async fn remove_zone(&self, name: &str) -> Result<()> {
        self.log.push(format!("store:remove_zone:{name}"));
        self.inner.remove_zone(name).await
    }

    async fn list_record_sets(&self) -> Result<Vec<RecordSet>> {
        self.inner.list_record_sets().await
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<RecordSet>> {
        self.inner.get_record_set(name).await
    }

    async fn save_record_set(&self, record_set: &RecordSet) -> Result<()> {
        self.log.push(format!("store:save_record_set:{}", record_set.name));
        self.inner.save_record_set(record_set).await
    }

    async fn remove_record_set(&self, name: &str) -> Result<()> {
        self.log.push(format!("store:remove_record_set:{name}"));
        self.inner.remove_record_set(name).await
    }

    async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }
}

/// A provider, a store and the log they share
pub struct Harness {
    pub log: CallLog,
    pub provider: MockDnsProvider,
    pub store: RecordingStore,
}

impl Harness {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            provider: MockDnsProvider::new(log.clone()),
            store: RecordingStore::new(log.clone()),
            log,
        }
    }

    pub fn reconciler(
        &self,
    ) -> (
        zonewright_core::Reconciler,
        tokio::sync::mpsc::Receiver<zonewright_core::ReconcileEvent>,
    ) {
        zonewright_core::Reconciler::new(
            Arc::new(self.provider.clone()),
            Arc::new(self.store.clone()),
            fast_config(),
        )
        .expect("reconciler construction succeeds")
    }
}

/// Reconciler config with a short poll interval for loop tests
pub fn fast_config() -> ReconcilerConfig {
    ReconcilerConfig {
        poll_interval_secs: 1,
        event_channel_capacity: 100,
    }
}

/// Managed `A` record set named `name` in `zone_id`
pub fn a_record(name: &str, zone_id: &str, values: &[&str]) -> RecordSet {
    RecordSet::new(
        name,
        RecordSetParameters::new(name, RecordType::A, zone_id, values.iter().map(|v| v.to_string()).collect()),
    )
}

/// Observed `A` record set
pub fn observed_a(name: &str, ttl: i64, values: &[&str]) -> ResourceRecordSet {
    ResourceRecordSet {
        name: normalize_name(name),
        record_type: "A".to_string(),
        ttl: Some(ttl),
        resource_records: values.iter().map(|v| v.to_string()).collect(),
        alias_target: None,
    }
}

/// Managed public zone
pub fn public_zone(key: &str, name: &str) -> Zone {
    Zone::new(key, ZoneParameters::new(name))
}

/// Drain every event currently buffered
pub fn drain<T>(rx: &mut tokio::sync::mpsc::Receiver<T>) -> Vec<T> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
