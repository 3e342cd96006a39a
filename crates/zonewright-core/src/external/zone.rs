//! Managed hosted zone client

use std::sync::Arc;

use tracing::{debug, info};

use super::ExternalObservation;
use crate::error::{Error, Operation, Result, is_not_found_zone};
use crate::model::{Condition, Zone};
use crate::traits::{DnsProvider, ResourceStore};
use crate::zone::{
    apply_observation, create_zone_request, delete_zone_request, external_name_from_id, id_from_external_name,
    is_up_to_date, late_initialize, update_zone_request,
};

const KIND: &str = "zone";

/// Observe/create/update/delete for hosted zones
///
/// Holds the resource store as well as the provider: a freshly generated
/// idempotency token is saved before the create call that carries it.
#[derive(Clone)]
pub struct ZoneExternal {
    provider: Arc<dyn DnsProvider>,
    store: Arc<dyn ResourceStore>,
}

impl ZoneExternal {
    pub fn new(provider: Arc<dyn DnsProvider>, store: Arc<dyn ResourceStore>) -> Self {
        Self { provider, store }
    }

    /// Fetch the hosted zone and fold it into the zone's status
    ///
    /// A zone without an external name has never been created. A zone the
    /// provider reports as `NoSuchHostedZone` is reported as not existing.
    pub async fn observe(&self, zone: &mut Zone) -> Result<ExternalObservation> {
        let Some(external_name) = zone.external_name.as_deref() else {
            return Ok(ExternalObservation::missing());
        };

        let id = id_from_external_name(external_name);
        let output = match self.provider.get_hosted_zone(&id).await {
            Ok(output) => output,
            Err(e) if is_not_found_zone(&e) => {
                debug!(zone = %zone.name, %id, "hosted zone does not exist");
                return Ok(ExternalObservation::missing());
            }
            Err(e) => return Err(Error::operation(Operation::Observe, KIND, e)),
        };

        let before = zone.spec.clone();
        late_initialize(&mut zone.spec, &output.hosted_zone);
        apply_observation(&mut zone.status.at_provider, &output.hosted_zone, output.delegation_set.as_ref());
        zone.status.resource.set_condition(Condition::Available);

        Ok(ExternalObservation {
            resource_exists: true,
            resource_up_to_date: is_up_to_date(&zone.spec, &output.hosted_zone),
            resource_late_initialized: before != zone.spec,
        })
    }

    /// Create the hosted zone
    ///
    /// On success the zone's external name and observation are set from the
    /// response.
    pub async fn create(&self, zone: &mut Zone) -> Result<()> {
        zone.status.resource.set_condition(Condition::Creating);

        let generated = zone.spec.caller_reference.is_none();
        let input = create_zone_request(&mut zone.spec);
        if generated {
            debug!(zone = %zone.name, caller_reference = %input.caller_reference, "persisting caller reference");
            self.store.save_zone(zone).await?;
        }

        let output = self
            .provider
            .create_hosted_zone(&input)
            .await
            .map_err(|e| Error::operation(Operation::Create, KIND, e))?;

        zone.external_name = Some(external_name_from_id(&output.hosted_zone.id).to_string());
        apply_observation(&mut zone.status.at_provider, &output.hosted_zone, output.delegation_set.as_ref());
        info!(zone = %zone.name, id = %output.hosted_zone.id, "created hosted zone");
        Ok(())
    }

    /// Push the desired comment to the hosted zone
    pub async fn update(&self, zone: &mut Zone) -> Result<()> {
        let id = self.require_id(zone, Operation::Update)?;
        let input = update_zone_request(id, zone.spec.comment.clone());
        self.provider
            .update_hosted_zone_comment(&input)
            .await
            .map_err(|e| Error::operation(Operation::Update, KIND, e))?;
        info!(zone = %zone.name, "updated hosted zone comment");
        Ok(())
    }

    /// Delete the hosted zone
    ///
    /// A zone that was never created, or that the provider no longer has,
    /// counts as deleted.
    pub async fn delete(&self, zone: &mut Zone) -> Result<()> {
        zone.status.resource.set_condition(Condition::Deleting);
        if zone.external_name.is_none() {
            return Ok(());
        }

        let id = self.require_id(zone, Operation::Delete)?;
        match self.provider.delete_hosted_zone(&delete_zone_request(id)).await {
            Err(e) if is_not_found_zone(&e) => {
                debug!(zone = %zone.name, "hosted zone already deleted");
                Ok(())
            }
            Err(e) => Err(Error::operation(Operation::Delete, KIND, e)),
            Ok(()) => {
                info!(zone = %zone.name, "deleted hosted zone");
                Ok(())
            }
        }
    }

    fn require_id(&self, zone: &Zone, operation: Operation) -> Result<String> {
        zone.external_name
            .as_deref()
            .map(id_from_external_name)
            .ok_or_else(|| {
                Error::operation(
                    operation,
                    KIND,
                    Error::invalid_input(format!("zone {} has no external name", zone.name)),
                )
            })
    }
}
