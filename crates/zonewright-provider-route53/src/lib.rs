// # Route 53 DNS Provider
//
// This crate provides an AWS Route 53 provider implementation for zonewright,
// built on `aws-sdk-route53`.
//
// - One SDK call per operation, except listing, which follows the record
//   set continuation point to the end
// - SDK retries are disabled; the reconciler revisits failed resources on
//   its next pass
// - Operation timeout configured (30 seconds)
// - Service errors mapped into typed `Error::Api { code, message }`
// - Dry-run mode: reads go out, writes are logged
//
// ## Trust Level: Untrusted (DNS Provider)
//
// - Performs calls to its endpoint only
// - Never touches the resource store
// - Never spawns tasks
//
// ## Credentials
//
// Static keys from configuration when both are set. Otherwise the standard
// AWS chain: environment, shared profile, web identity, container and
// instance roles. Secrets NEVER appear in logs.
//
// ## API Reference
//
// - Route 53 API 2013-04-01: https://docs.aws.amazon.com/Route53/latest/APIReference/

pub mod convert;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_credential_types::Credentials;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::RrType;
use aws_types::region::Region;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use zonewright_core::config::ProviderConfig;
use zonewright_core::model::{
    ChangeResourceRecordSetsInput, CreateHostedZoneInput, CreateHostedZoneOutput, DeleteHostedZoneInput,
    GetHostedZoneOutput, HostedZone, HostedZoneConfig, ResourceRecordSet, UpdateHostedZoneCommentInput,
};
use zonewright_core::traits::{DnsProvider, DnsProviderFactory};
use zonewright_core::zone::{external_name_from_id, id_from_external_name};
use zonewright_core::{Error, Result};

/// Route 53 is a global service signed for this region
const ROUTE53_REGION: &str = "us-east-1";

/// Default timeout for one API operation (30 seconds)
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// External name prefix of hosted zones "created" in dry-run mode
const DRY_RUN_ZONE_PREFIX: &str = "DRYRUN-";

/// How the SDK client is built on first use
#[derive(Debug, Clone, Default)]
pub struct ClientSettings {
    /// Static keys; `None` uses the default credential chain
    pub credentials: Option<Credentials>,

    /// Endpoint override, e.g. a local mock
    pub endpoint: Option<String>,
}

/// AWS Route 53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform read requests (GetHostedZone, ListResourceRecordSets)
/// - Log every write
/// - **NOT** send any write
///
/// A dry-run CreateHostedZone answers with a placeholder zone whose id
/// starts with `DRYRUN-`. Reads of placeholder zones are answered locally,
/// so the next pass observes the zone instead of creating it again.
pub struct Route53Provider {
    settings: ClientSettings,
    client: OnceCell<Client>,
    dry_run: bool,
    dry_run_zones: Mutex<HashMap<String, HostedZone>>,
}

// The SDK client carries no useful state to print
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials", &self.settings.credentials)
            .field("endpoint", &self.settings.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Create a provider whose client is built from `settings` on first use
    pub fn new(settings: ClientSettings, dry_run: bool) -> Result<Self> {
        if let Some(endpoint) = &settings.endpoint
            && !endpoint.starts_with("http://")
            && !endpoint.starts_with("https://")
        {
            return Err(Error::config(format!("Invalid Route 53 endpoint: {endpoint}")));
        }

        Ok(Self {
            settings,
            client: OnceCell::new(),
            dry_run,
            dry_run_zones: Mutex::new(HashMap::new()),
        })
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client, dry_run: bool) -> Self {
        Self {
            settings: ClientSettings::default(),
            client: OnceCell::new_with(Some(client)),
            dry_run,
            dry_run_zones: Mutex::new(HashMap::new()),
        }
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(ROUTE53_REGION))
                    .retry_config(RetryConfig::disabled())
                    .timeout_config(
                        TimeoutConfig::builder()
                            .operation_timeout(DEFAULT_OPERATION_TIMEOUT)
                            .build(),
                    );
                if let Some(credentials) = &self.settings.credentials {
                    loader = loader.credentials_provider(credentials.clone());
                }
                if let Some(endpoint) = &self.settings.endpoint {
                    loader = loader.endpoint_url(endpoint);
                }

                let config = loader.load().await;
                debug!(
                    static_credentials = self.settings.credentials.is_some(),
                    "built Route53 client"
                );
                Client::new(&config)
            })
            .await
    }

    fn log_dry_run(&self, operation: &str, payload: &dyn std::fmt::Debug) {
        info!("[DRY-RUN] Would send {} with payload: {:?}", operation, payload);
    }

    /// Placeholder zone for a `DRYRUN-` id, when in dry-run mode
    fn dry_run_zone(&self, id: &str) -> Option<HostedZone> {
        let external_name = external_name_from_id(id);
        let caller_reference = external_name.strip_prefix(DRY_RUN_ZONE_PREFIX)?;
        if !self.dry_run {
            return None;
        }

        let zones = self.dry_run_zones.lock().unwrap_or_else(PoisonError::into_inner);
        // A placeholder persisted by an earlier process is not in the map
        Some(zones.get(external_name).cloned().unwrap_or_else(|| HostedZone {
            id: id_from_external_name(external_name),
            name: String::new(),
            caller_reference: Some(caller_reference.to_string()),
            config: None,
            resource_record_set_count: None,
        }))
    }
}

/// Map a failed SDK call onto the core error type
pub(crate) fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(service) => service_error(service.err()),
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            Error::http(format!("Route53 {operation} failed: {}", DisplayErrorContext(&err)))
        }
        _ => Error::provider("route53", format!("{operation} failed: {}", DisplayErrorContext(&err))),
    }
}

/// Classify a modeled service error by its code
pub(crate) fn service_error<E>(err: &E) -> Error
where
    E: ProvideErrorMetadata + std::fmt::Display,
{
    let message = err.message().unwrap_or_default();
    match err.code() {
        Some(code @ ("AccessDenied" | "AccessDeniedException" | "InvalidClientTokenId" | "SignatureDoesNotMatch"
        | "ExpiredToken")) => Error::auth(format!(
            "Invalid credentials or insufficient permissions ({code}): {message}"
        )),
        Some(code @ ("Throttling" | "ThrottlingException")) => {
            Error::rate_limited(format!("Rate limit exceeded ({code}): {message}"))
        }
        Some(code) => Error::api(code, message),
        None => Error::provider("route53", err.to_string()),
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn create_hosted_zone(&self, input: &CreateHostedZoneInput) -> Result<CreateHostedZoneOutput> {
        if self.dry_run {
            self.log_dry_run("CreateHostedZone", input);
            let external_name = format!("{DRY_RUN_ZONE_PREFIX}{}", input.caller_reference);
            let hosted_zone = HostedZone {
                id: id_from_external_name(&external_name),
                name: input.name.clone(),
                caller_reference: Some(input.caller_reference.clone()),
                config: Some(HostedZoneConfig {
                    comment: input.hosted_zone_config.comment.clone(),
                    private_zone: input.hosted_zone_config.private_zone,
                }),
                resource_record_set_count: None,
            };
            self.dry_run_zones
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(external_name, hosted_zone.clone());
            return Ok(CreateHostedZoneOutput {
                hosted_zone,
                delegation_set: None,
            });
        }

        let output = self
            .client()
            .await
            .create_hosted_zone()
            .name(&input.name)
            .caller_reference(&input.caller_reference)
            .hosted_zone_config(convert::hosted_zone_config_to_sdk(&input.hosted_zone_config))
            .set_vpc(input.vpc.as_ref().map(convert::vpc_to_sdk))
            .send()
            .await
            .map_err(|e| sdk_error("CreateHostedZone", e))?;

        let hosted_zone = output
            .hosted_zone
            .map(convert::hosted_zone_from_sdk)
            .ok_or_else(|| Error::provider("route53", "CreateHostedZone response has no HostedZone"))?;
        info!("Created hosted zone {} ({})", hosted_zone.name, hosted_zone.id);
        Ok(CreateHostedZoneOutput {
            hosted_zone,
            delegation_set: output.delegation_set.map(convert::delegation_set_from_sdk),
        })
    }

    async fn get_hosted_zone(&self, id: &str) -> Result<GetHostedZoneOutput> {
        if let Some(hosted_zone) = self.dry_run_zone(id) {
            debug!("[DRY-RUN] Answering GetHostedZone for placeholder {}", id);
            return Ok(GetHostedZoneOutput {
                hosted_zone,
                delegation_set: None,
            });
        }

        let output = self
            .client()
            .await
            .get_hosted_zone()
            .id(external_name_from_id(id))
            .send()
            .await
            .map_err(|e| sdk_error("GetHostedZone", e))?;

        let hosted_zone = output
            .hosted_zone
            .map(convert::hosted_zone_from_sdk)
            .ok_or_else(|| Error::api(zonewright_core::error::ERR_CODE_NO_SUCH_HOSTED_ZONE, format!("no hosted zone {id}")))?;
        Ok(GetHostedZoneOutput {
            hosted_zone,
            delegation_set: output.delegation_set.map(convert::delegation_set_from_sdk),
        })
    }

    async fn update_hosted_zone_comment(&self, input: &UpdateHostedZoneCommentInput) -> Result<()> {
        if self.dry_run {
            self.log_dry_run("UpdateHostedZoneComment", input);
            let mut zones = self.dry_run_zones.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(zone) = zones.get_mut(external_name_from_id(&input.id)) {
                zone.config.get_or_insert_with(HostedZoneConfig::default).comment = input.comment.clone();
            }
            return Ok(());
        }

        self.client()
            .await
            .update_hosted_zone_comment()
            .id(external_name_from_id(&input.id))
            .set_comment(input.comment.clone())
            .send()
            .await
            .map_err(|e| sdk_error("UpdateHostedZoneComment", e))?;
        Ok(())
    }

    async fn delete_hosted_zone(&self, input: &DeleteHostedZoneInput) -> Result<()> {
        if self.dry_run {
            self.log_dry_run("DeleteHostedZone", input);
            self.dry_run_zones
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(external_name_from_id(&input.id));
            return Ok(());
        }

        self.client()
            .await
            .delete_hosted_zone()
            .id(external_name_from_id(&input.id))
            .send()
            .await
            .map_err(|e| sdk_error("DeleteHostedZone", e))?;
        Ok(())
    }

    async fn list_resource_record_sets(&self, hosted_zone_id: &str) -> Result<Vec<ResourceRecordSet>> {
        if self.dry_run_zone(hosted_zone_id).is_some() {
            return Ok(Vec::new());
        }

        let client = self.client().await;
        let zone = external_name_from_id(hosted_zone_id);
        let mut record_sets = Vec::new();
        let mut start: Option<(String, RrType, Option<String>)> = None;

        // ListResourceRecordSets continues from a (name, type, identifier)
        // triple, which the SDK does not model as a paginator
        loop {
            let mut request = client.list_resource_record_sets().hosted_zone_id(zone);
            if let Some((name, record_type, identifier)) = start.take() {
                request = request
                    .start_record_name(name)
                    .start_record_type(record_type)
                    .set_start_record_identifier(identifier);
            }

            let page = request
                .send()
                .await
                .map_err(|e| sdk_error("ListResourceRecordSets", e))?;

            record_sets.extend(page.resource_record_sets.into_iter().map(convert::record_set_from_sdk));

            if !page.is_truncated {
                break;
            }
            match (page.next_record_name, page.next_record_type) {
                (Some(name), Some(record_type)) => {
                    start = Some((name, record_type, page.next_record_identifier));
                }
                _ => {
                    warn!("Truncated record set listing without a continuation point");
                    return Err(Error::provider(
                        "route53",
                        "ListResourceRecordSets was truncated without NextRecordName/NextRecordType",
                    ));
                }
            }
        }

        debug!("Listed {} record sets in {}", record_sets.len(), hosted_zone_id);
        Ok(record_sets)
    }

    async fn change_resource_record_sets(&self, input: &ChangeResourceRecordSetsInput) -> Result<()> {
        let batch = convert::change_batch_to_sdk(&input.change_batch)?;

        if self.dry_run {
            self.log_dry_run("ChangeResourceRecordSets", &batch);
            return Ok(());
        }

        self.client()
            .await
            .change_resource_record_sets()
            .hosted_zone_id(external_name_from_id(&input.hosted_zone_id))
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| sdk_error("ChangeResourceRecordSets", e))?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}

/// Factory for creating Route 53 providers
pub struct Route53Factory;

impl DnsProviderFactory for Route53Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Route53 {
                access_key_id,
                secret_access_key,
                session_token,
                endpoint,
                dry_run,
            } => {
                if *dry_run {
                    warn!("Route53 provider running in DRY-RUN mode - no changes will be made");
                }

                let credentials = match (access_key_id.is_empty(), secret_access_key.is_empty()) {
                    (false, false) => Some(Credentials::new(
                        access_key_id,
                        secret_access_key,
                        session_token.clone(),
                        None,
                        "zonewright",
                    )),
                    (true, true) => {
                        info!("No static Route53 keys configured, using the default credential chain");
                        None
                    }
                    _ => {
                        return Err(Error::config(
                            "Route 53 access key id and secret access key must be set together",
                        ));
                    }
                };

                let settings = ClientSettings {
                    credentials,
                    endpoint: endpoint.clone(),
                };
                Ok(Box::new(Route53Provider::new(settings, *dry_run)?))
            }
            _ => Err(Error::config("Invalid config for Route53 provider")),
        }
    }
}

/// Register the Route 53 provider with a registry
///
/// # Example
///
/// ```rust
/// use zonewright_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonewright_provider_route53::register(&registry);
/// assert!(registry.has_provider("route53"));
/// ```
pub fn register(registry: &zonewright_core::ProviderRegistry) {
    registry.register_provider("route53", Box::new(Route53Factory));
}
