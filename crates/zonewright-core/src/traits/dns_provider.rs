// # DNS Provider Trait
//
// The narrow slice of a hosted DNS API the reconciler needs: hosted zone
// CRUD plus listing and batch-changing record sets.
//
// ## Implementations
//
// - Route 53: `zonewright-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use zonewright_core::{DnsProvider, recordset};
//
// async fn lookup(provider: &dyn DnsProvider, params: &RecordSetParameters) -> zonewright_core::Result<()> {
//     let observed = recordset::get_resource_record_set(provider, params).await?;
//     println!("{} {} -> {:?}", observed.name, observed.record_type, observed.resource_records);
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::model::{
    ChangeResourceRecordSetsInput, CreateHostedZoneInput, CreateHostedZoneOutput, DeleteHostedZoneInput,
    GetHostedZoneOutput, ResourceRecordSet, UpdateHostedZoneCommentInput,
};

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Trust Level: Untrusted
///
/// Providers perform single API calls and report success or failure:
///
/// - No retry or backoff. The reconciler re-runs on its own schedule.
/// - No access to the resource store.
/// - No decision about whether a change is needed; that is the diff engine's.
/// - Errors carry the provider's code in [`Error::Api`](crate::Error::Api) so
///   the classifiers in [`crate::error`] can recognise them.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Create a hosted zone
    async fn create_hosted_zone(&self, input: &CreateHostedZoneInput) -> Result<CreateHostedZoneOutput, crate::Error>;

    /// Fetch a hosted zone by id
    ///
    /// A missing zone must surface as an [`Error::Api`](crate::Error::Api)
    /// with code `NoSuchHostedZone`.
    async fn get_hosted_zone(&self, id: &str) -> Result<GetHostedZoneOutput, crate::Error>;

    /// Replace a hosted zone's comment
    async fn update_hosted_zone_comment(&self, input: &UpdateHostedZoneCommentInput) -> Result<(), crate::Error>;

    /// Delete a hosted zone
    async fn delete_hosted_zone(&self, input: &DeleteHostedZoneInput) -> Result<(), crate::Error>;

    /// List every record set in a hosted zone
    ///
    /// Implementations follow pagination to the end; callers see one list.
    async fn list_resource_record_sets(&self, hosted_zone_id: &str) -> Result<Vec<ResourceRecordSet>, crate::Error>;

    /// Apply a change batch atomically
    async fn change_resource_record_sets(&self, input: &ChangeResourceRecordSetsInput) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(&self, config: &crate::config::ProviderConfig) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
