//! Managed record set client

use std::sync::Arc;

use tracing::{debug, info};

use super::ExternalObservation;
use crate::error::{Error, Operation, Result, is_deleted_record_set, is_not_found_record_set};
use crate::model::{ChangeAction, Condition, RecordSet};
use crate::recordset::{generate_change_input, get_resource_record_set, is_up_to_date, late_initialize};
use crate::traits::DnsProvider;

const KIND: &str = "record set";

/// Observe/create/update/delete for record sets
#[derive(Clone)]
pub struct RecordSetExternal {
    provider: Arc<dyn DnsProvider>,
}

impl RecordSetExternal {
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Look the record set up and compare it with the desired parameters
    ///
    /// A found record set late-initializes `record_set.spec` and marks it
    /// available. A missing one is reported as not existing, not as an error.
    pub async fn observe(&self, record_set: &mut RecordSet) -> Result<ExternalObservation> {
        let observed = match get_resource_record_set(self.provider.as_ref(), &record_set.spec).await {
            Ok(observed) => observed,
            Err(e) if is_not_found_record_set(&e) => {
                debug!(record_set = %record_set.name, "record set does not exist");
                return Ok(ExternalObservation::missing());
            }
            Err(e) => return Err(Error::operation(Operation::Observe, KIND, e)),
        };

        let before = record_set.spec.clone();
        late_initialize(&mut record_set.spec, Some(&observed));
        record_set.status.set_condition(Condition::Available);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&record_set.spec, &observed)?,
            resource_late_initialized: before != record_set.spec,
        })
    }

    /// Issue a CREATE for the record set
    pub async fn create(&self, record_set: &mut RecordSet) -> Result<()> {
        record_set.status.set_condition(Condition::Creating);
        self.change(record_set, ChangeAction::Create, Operation::Create).await?;
        info!(record_set = %record_set.name, "created record set");
        Ok(())
    }

    /// Issue an UPSERT for the record set
    pub async fn update(&self, record_set: &mut RecordSet) -> Result<()> {
        self.change(record_set, ChangeAction::Upsert, Operation::Update).await?;
        info!(record_set = %record_set.name, "updated record set");
        Ok(())
    }

    /// Issue a DELETE for the record set
    ///
    /// A record set that is already gone counts as deleted: the provider
    /// rejects the batch, and that rejection is swallowed here.
    pub async fn delete(&self, record_set: &mut RecordSet) -> Result<()> {
        record_set.status.set_condition(Condition::Deleting);
        match self.change(record_set, ChangeAction::Delete, Operation::Delete).await {
            Err(e) if is_deleted_record_set(&e) => {
                debug!(record_set = %record_set.name, "record set already deleted");
                Ok(())
            }
            Err(e) => Err(e),
            Ok(()) => {
                info!(record_set = %record_set.name, "deleted record set");
                Ok(())
            }
        }
    }

    async fn change(&self, record_set: &RecordSet, action: ChangeAction, operation: Operation) -> Result<()> {
        let input = generate_change_input(&record_set.spec, action)?;
        debug!(
            record_set = %record_set.name,
            zone = %input.hosted_zone_id,
            %action,
            provider = self.provider.provider_name(),
            "changing record set"
        );
        self.provider
            .change_resource_record_sets(&input)
            .await
            .map_err(|e| Error::operation(operation, KIND, e))
    }
}
