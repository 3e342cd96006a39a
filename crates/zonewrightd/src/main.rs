// # zonewrightd - Route 53 reconciliation daemon
//
// A thin integration layer over zonewright-core. No DNS logic lives here.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers and building the resource store
// 4. Running the reconciler until SIGTERM/SIGINT
//
// Desired zones and record sets are read from the resource store. With the
// file store, that is the JSON manifest at `ZONEWRIGHT_STORE_PATH`; the
// daemon writes status and generated caller references back into it.
//
// ## Configuration
//
// ### DNS Provider
// - `ZONEWRIGHT_PROVIDER_TYPE`: Provider type (route53)
// - `ZONEWRIGHT_AWS_ACCESS_KEY_ID`: Access key id (optional)
// - `ZONEWRIGHT_AWS_SECRET_ACCESS_KEY`: Secret access key (optional)
// - `ZONEWRIGHT_AWS_SESSION_TOKEN`: Session token (optional)
//
// Without static keys the standard AWS credential chain is used
// (`AWS_*` environment, shared profile, container or instance role).
// - `ZONEWRIGHT_AWS_ENDPOINT`: API endpoint override (optional)
// - `ZONEWRIGHT_MODE`: `dry-run` to log writes instead of sending them
//
// ### Resource Store
// - `ZONEWRIGHT_STORE_TYPE`: Type of store (file, memory)
// - `ZONEWRIGHT_STORE_PATH`: Path to the manifest (for file store)
//
// ### Reconciler
// - `ZONEWRIGHT_POLL_INTERVAL_SECS`: Seconds between passes
// - `ZONEWRIGHT_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export AWS_PROFILE=dns-admin
// export ZONEWRIGHT_STORE_TYPE=file
// export ZONEWRIGHT_STORE_PATH=/var/lib/zonewright/resources.json
//
// zonewrightd
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use zonewright_core::config::{ProviderConfig, ReconcilerConfig, StoreConfig};
use zonewright_core::{ProviderRegistry, ReconcileEvent, Reconciler};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration, as read from the environment
struct DaemonConfig {
    provider_type: String,
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    endpoint: Option<String>,
    dry_run: bool,
    store_type: String,
    store_path: Option<String>,
    poll_interval_secs: Option<u64>,
    log_level: String,
}

impl DaemonConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let poll_interval_secs = match env::var("ZONEWRIGHT_POLL_INTERVAL_SECS") {
            Ok(s) => Some(
                s.parse()
                    .with_context(|| format!("ZONEWRIGHT_POLL_INTERVAL_SECS is not a number: {s}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            provider_type: env::var("ZONEWRIGHT_PROVIDER_TYPE").unwrap_or_else(|_| "route53".to_string()),
            access_key_id: env::var("ZONEWRIGHT_AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: env::var("ZONEWRIGHT_AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
            session_token: env::var("ZONEWRIGHT_AWS_SESSION_TOKEN").ok().filter(|s| !s.is_empty()),
            endpoint: env::var("ZONEWRIGHT_AWS_ENDPOINT").ok().filter(|s| !s.is_empty()),
            dry_run: env::var("ZONEWRIGHT_MODE").is_ok_and(|m| m == "dry-run"),
            store_type: env::var("ZONEWRIGHT_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            store_path: env::var("ZONEWRIGHT_STORE_PATH").ok(),
            poll_interval_secs,
            log_level: env::var("ZONEWRIGHT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the values core validation does not see
    fn validate(&self) -> Result<()> {
        match self.provider_type.as_str() {
            "route53" => {}
            _ => anyhow::bail!(
                "ZONEWRIGHT_PROVIDER_TYPE '{}' is not supported. Supported providers: route53",
                self.provider_type
            ),
        }

        match self.store_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "ZONEWRIGHT_STORE_TYPE '{}' is not supported. Supported types: file, memory",
                self.store_type
            ),
        }

        if self.store_type == "file" {
            let Some(path) = self.store_path.as_deref().filter(|p| !p.is_empty()) else {
                anyhow::bail!(
                    "ZONEWRIGHT_STORE_PATH is required when ZONEWRIGHT_STORE_TYPE=file. \
                    Set it via: export ZONEWRIGHT_STORE_PATH=/var/lib/zonewright/resources.json"
                );
            };

            if let Some(parent) = std::path::Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                anyhow::bail!(
                    "ZONEWRIGHT_STORE_PATH parent directory does not exist: {}. \
                    Create it first: sudo mkdir -p {}",
                    parent.display(),
                    parent.display()
                );
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONEWRIGHT_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn core_config(&self) -> zonewright_core::Config {
        let mut reconciler = ReconcilerConfig::default();
        if let Some(secs) = self.poll_interval_secs {
            reconciler.poll_interval_secs = secs;
        }

        zonewright_core::Config {
            provider: ProviderConfig::Route53 {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
                session_token: self.session_token.clone(),
                endpoint: self.endpoint.clone(),
                dry_run: self.dry_run,
            },
            store: match (self.store_type.as_str(), &self.store_path) {
                ("file", Some(path)) => StoreConfig::File { path: path.clone() },
                _ => StoreConfig::Memory,
            },
            reconciler,
        }
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let daemon_config = match DaemonConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = daemon_config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let config = daemon_config.core_config();
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(daemon_config.tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting zonewrightd");
    info!(
        provider = config.provider.type_name(),
        store = config.store.type_name(),
        poll_interval_secs = config.reconciler.poll_interval_secs,
        "Configuration loaded"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: zonewright_core::Config) -> Result<()> {
    let registry = ProviderRegistry::with_builtin_stores();

    #[cfg(feature = "route53")]
    {
        info!("Registering Route 53 provider");
        zonewright_provider_route53::register(&registry);
    }

    let provider = registry
        .create_provider(&config.provider)
        .context("Failed to create DNS provider")?;
    let store = registry
        .create_store(&config.store)
        .await
        .context("Failed to create resource store")?;

    let (reconciler, mut events) = Reconciler::new(Arc::from(provider), Arc::from(store), config.reconciler)
        .context("Failed to create reconciler")?;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown signal error: {:#}", e),
        }
        let _ = shutdown_tx.send(());
    });

    info!("Reconciler running");
    reconciler
        .run_with_shutdown(Some(shutdown_rx))
        .await
        .context("Reconciler failed")?;

    info!("Shutting down daemon");
    Ok(())
}

fn log_event(event: &ReconcileEvent) {
    match event {
        ReconcileEvent::PassStarted { zones, record_sets } => {
            debug!(zones, record_sets, "Reconcile pass started");
        }
        ReconcileEvent::Created { kind, name } => info!("Created {} {}", kind, name),
        ReconcileEvent::Updated { kind, name } => info!("Updated {} {}", kind, name),
        ReconcileEvent::Deleted { kind, name } => info!("Deleted {} {}", kind, name),
        ReconcileEvent::UpToDate { kind, name } => debug!("{} {} is up to date", kind, name),
        ReconcileEvent::Failed { kind, name, error } => warn!("Failed to reconcile {} {}: {}", kind, name, error),
        ReconcileEvent::PassCompleted { succeeded, failed } => {
            info!(succeeded, failed, "Reconcile pass completed");
        }
        ReconcileEvent::Stopped { reason } => info!("Reconciler stopped: {}", reason),
    }
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for SIGINT
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c().await.context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}
