//! Pass-based reconciler
//!
//! The Reconciler is responsible for:
//! - Reading every managed zone and record set from the ResourceStore
//! - Observing each one at the DnsProvider
//! - Issuing the create/update/delete the observation calls for
//! - Writing status and late-initialized parameters back to the store
//!
//! An up-to-date resource is only written back when observing it changed
//! something: late-initialized parameters, its condition, or for zones the
//! provider-side observation. Steady-state passes leave the store clean.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌───────────────┐
//!                  │ ResourceStore │◄──── status, tokens ────┐
//!                  └───────────────┘                         │
//!                          │ desired                         │
//!                          ▼                                 │
//!                  ┌───────────────┐                 ┌──────────────┐
//!   interval ────► │  Reconciler   │ ──── events ──► │   Receiver   │
//!                  └───────────────┘                 └──────────────┘
//!                          │
//!            ┌─────────────┴─────────────┐
//!            ▼                           ▼
//!   ┌────────────────┐          ┌──────────────────┐
//!   │  ZoneExternal  │          │ RecordSetExternal│
//!   └────────────────┘          └──────────────────┘
//!            └─────────────┬─────────────┘
//!                          ▼
//!                  ┌───────────────┐
//!                  │  DnsProvider  │
//!                  └───────────────┘
//! ```
//!
//! ## Pass Order
//!
//! 1. Zones that are not being deleted
//! 2. Record sets (creates, updates and deletes)
//! 3. Zones being deleted, so their record sets are gone first
//!
//! ## Failures
//!
//! There is no retry inside a pass. A failed entity gets a `ReconcileError`
//! condition, an event is emitted, and the pass moves on; the next pass
//! revisits it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::ReconcilerConfig;
use crate::error::Result;
use crate::external::{RecordSetExternal, ZoneExternal};
use crate::model::{Condition, RecordSet, Zone};
use crate::traits::{DnsProvider, ResourceStore};

/// Kind of managed resource an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Zone,
    RecordSet,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Zone => f.write_str("zone"),
            ResourceKind::RecordSet => f.write_str("record set"),
        }
    }
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// A pass began
    PassStarted { zones: usize, record_sets: usize },

    /// The resource did not exist and was created
    Created { kind: ResourceKind, name: String },

    /// The resource had drifted and was updated
    Updated { kind: ResourceKind, name: String },

    /// Deletion was requested; the resource is gone and was removed from the store
    Deleted { kind: ResourceKind, name: String },

    /// The resource already matched; nothing was written
    UpToDate { kind: ResourceKind, name: String },

    /// Reconciling the resource failed; it is revisited next pass
    Failed {
        kind: ResourceKind,
        name: String,
        error: String,
    },

    /// A pass finished
    PassCompleted { succeeded: usize, failed: usize },

    /// The reconciler stopped
    Stopped { reason: String },
}

/// Outcome counts of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, result: &Result<()>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Drives managed zones and record sets towards their desired state
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Run passes with [`Reconciler::run()`], or one at a time with
///    [`Reconciler::reconcile_once()`]
/// 3. Passes repeat on the configured interval until a shutdown signal
///
/// Entities are reconciled one at a time, so at most one provider call per
/// entity is in flight.
pub struct Reconciler {
    store: Arc<dyn ResourceStore>,
    zones: ZoneExternal,
    record_sets: RecordSetExternal,
    poll_interval: Duration,
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields reconcile events
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        store: Arc<dyn ResourceStore>,
        config: ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            zones: ZoneExternal::new(provider.clone(), store.clone()),
            record_sets: RecordSetExternal::new(provider),
            store,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Run passes until SIGINT
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run passes until `shutdown_rx` fires (or SIGINT when `None`)
    ///
    /// Tests use this to stop the loop deterministically.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let shutdown = async {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {}", e);
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(ReconcileEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.reconcile_once().await {
                        error!("Reconcile pass failed: {}", e);
                    }
                }
            }
        }

        self.store.flush().await?;
        info!("Store flushed, reconciler stopped");
        Ok(())
    }

    /// Run a single pass over every managed resource
    ///
    /// Per-entity failures are counted and reported, not returned. Only a
    /// failure to read the store aborts the pass.
    pub async fn reconcile_once(&self) -> Result<PassSummary> {
        let zones = self.store.list_zones().await?;
        let record_sets = self.store.list_record_sets().await?;

        self.emit_event(ReconcileEvent::PassStarted {
            zones: zones.len(),
            record_sets: record_sets.len(),
        });

        let (deleting, live): (Vec<Zone>, Vec<Zone>) = zones.into_iter().partition(|z| z.deletion_requested);
        let mut summary = PassSummary::default();

        for zone in live {
            summary.record(&self.reconcile_zone(zone).await);
        }
        for record_set in record_sets {
            summary.record(&self.reconcile_record_set(record_set).await);
        }
        for zone in deleting {
            summary.record(&self.reconcile_zone(zone).await);
        }

        self.store.flush().await?;

        debug!(succeeded = summary.succeeded, failed = summary.failed, "pass completed");
        self.emit_event(ReconcileEvent::PassCompleted {
            succeeded: summary.succeeded,
            failed: summary.failed,
        });
        Ok(summary)
    }

    async fn reconcile_zone(&self, mut zone: Zone) -> Result<()> {
        match self.sync_zone(&mut zone).await {
            Ok(Some(event)) => {
                self.emit_event(event);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                error!(zone = %zone.name, "Failed to reconcile zone: {}", e);
                zone.status.resource.set_condition(Condition::ReconcileError { message: e.to_string() });
                if let Err(save_err) = self.store.save_zone(&zone).await {
                    warn!(zone = %zone.name, "Failed to save zone status: {}", save_err);
                }
                self.emit_event(ReconcileEvent::Failed {
                    kind: ResourceKind::Zone,
                    name: zone.name.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn sync_zone(&self, zone: &mut Zone) -> Result<Option<ReconcileEvent>> {
        let kind = ResourceKind::Zone;
        let name = zone.name.clone();
        let prior_condition = zone.status.resource.condition.clone();
        let prior_at_provider = zone.status.at_provider.clone();
        let observation = self.zones.observe(zone).await?;

        if zone.deletion_requested {
            if observation.resource_exists {
                self.zones.delete(zone).await?;
            }
            self.store.remove_zone(&name).await?;
            return Ok(Some(ReconcileEvent::Deleted { kind, name }));
        }

        let event = if !observation.resource_exists {
            self.zones.create(zone).await?;
            ReconcileEvent::Created { kind, name }
        } else if !observation.resource_up_to_date {
            self.zones.update(zone).await?;
            ReconcileEvent::Updated { kind, name }
        } else {
            let unchanged = !observation.resource_late_initialized
                && zone.status.resource.condition == prior_condition
                && zone.status.at_provider == prior_at_provider;
            if unchanged {
                debug!(zone = %name, "zone unchanged, not saving");
                return Ok(Some(ReconcileEvent::UpToDate { kind, name }));
            }
            ReconcileEvent::UpToDate { kind, name }
        };

        self.store.save_zone(zone).await?;
        Ok(Some(event))
    }

    async fn reconcile_record_set(&self, mut record_set: RecordSet) -> Result<()> {
        match self.sync_record_set(&mut record_set).await {
            Ok(event) => {
                self.emit_event(event);
                Ok(())
            }
            Err(e) => {
                error!(record_set = %record_set.name, "Failed to reconcile record set: {}", e);
                record_set
                    .status
                    .set_condition(Condition::ReconcileError { message: e.to_string() });
                if let Err(save_err) = self.store.save_record_set(&record_set).await {
                    warn!(record_set = %record_set.name, "Failed to save record set status: {}", save_err);
                }
                self.emit_event(ReconcileEvent::Failed {
                    kind: ResourceKind::RecordSet,
                    name: record_set.name.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn sync_record_set(&self, record_set: &mut RecordSet) -> Result<ReconcileEvent> {
        let kind = ResourceKind::RecordSet;
        let name = record_set.name.clone();
        record_set.spec.validate()?;

        let prior_condition = record_set.status.condition.clone();
        let observation = self.record_sets.observe(record_set).await?;

        if record_set.deletion_requested {
            if observation.resource_exists {
                self.record_sets.delete(record_set).await?;
            }
            self.store.remove_record_set(&name).await?;
            return Ok(ReconcileEvent::Deleted { kind, name });
        }

        let event = if !observation.resource_exists {
            self.record_sets.create(record_set).await?;
            ReconcileEvent::Created { kind, name }
        } else if !observation.resource_up_to_date {
            self.record_sets.update(record_set).await?;
            ReconcileEvent::Updated { kind, name }
        } else {
            if !observation.resource_late_initialized && record_set.status.condition == prior_condition {
                debug!(record_set = %name, "record set unchanged, not saving");
                return Ok(ReconcileEvent::UpToDate { kind, name });
            }
            ReconcileEvent::UpToDate { kind, name }
        };

        self.store.save_record_set(record_set).await?;
        Ok(event)
    }

    fn emit_event(&self, event: ReconcileEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
