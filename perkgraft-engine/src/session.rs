//! One extension run: drain, inject, reconcile, reload.
use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anchor::ResolverConfig;
use crate::backup::{BackupStore, SlotId};
use crate::catalog::TierCatalog;
use crate::drain::{DrainOutcome, drain_pending};
use crate::host::{PendingQueue, PerkGraph, PerkRegistry, SaveSlots, UnlockEvents};
use crate::inject::{InjectionReport, inject_all};
use crate::reconcile::Reconciler;

/// Tunables for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hard bound on pending-item removals before injection.
    pub max_drain_iterations: u32,
    pub resolver: ResolverConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_drain_iterations: 100,
            resolver: ResolverConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The host graph is absent or not initialized. Batch-fatal for this run;
    /// the host re-invokes the engine on the next level load.
    #[error("host perk graph unavailable; retry on the next level load")]
    HostUnavailable,
}

/// Everything one run did, for logging and assertions.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub drain: DrainOutcome,
    pub injection: InjectionReport,
    /// Unlock flags flipped from the backup during reconciliation.
    pub restored: u32,
}

/// Drives a full extension pass over host capabilities handed in by the
/// adapter. Holds only the catalog and config; all host state stays host-owned.
pub struct GraftSession {
    catalog: TierCatalog,
    config: SessionConfig,
}

impl GraftSession {
    #[must_use]
    pub fn new(catalog: TierCatalog, config: SessionConfig) -> Self {
        Self { catalog, config }
    }

    #[must_use]
    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    /// Run the full pass: drain the pending queue, inject every missing tier,
    /// restore unlocks from the backup store, then trigger the single
    /// batch-level registry reload.
    ///
    /// Returns the report plus the live reconciler; the adapter keeps the
    /// reconciler for the lifetime of the level and feeds it unlock-change
    /// and save events. Dropping it withdraws all watch registrations.
    ///
    /// Per-tier problems never fail the run; they are logged and reported.
    /// Tiers injected before a later failure are left in place.
    ///
    /// # Errors
    ///
    /// `SessionError::HostUnavailable` when the graph reports not-ready; no
    /// mutation has happened at that point.
    pub fn run<G, R, Q, S, E>(
        &self,
        graph: &mut G,
        registry: &mut R,
        queue: &mut Q,
        slots: &impl SaveSlots,
        store: &S,
        events: E,
    ) -> Result<(RunReport, Reconciler<E>), SessionError>
    where
        G: PerkGraph,
        R: PerkRegistry,
        Q: PendingQueue,
        S: BackupStore,
        E: UnlockEvents,
    {
        if !graph.is_ready() {
            error!("perk graph not ready, aborting this run");
            return Err(SessionError::HostUnavailable);
        }

        let drain = drain_pending(queue, self.config.max_drain_iterations);

        let injection = inject_all(&self.catalog, graph, registry, &self.config.resolver);

        let slot = slots.active_slot().unwrap_or_else(|| {
            warn!("active save slot unknown, using default slot {}", SlotId::DEFAULT);
            SlotId::DEFAULT
        });

        let mut reconciler = Reconciler::new(injection.tracked(), slot, events);
        let restored = reconciler.restore(graph, store);

        // Single reload for the whole batch, after restored unlocks exist.
        registry.reload();

        Ok((
            RunReport {
                drain,
                injection,
                restored,
            },
            reconciler,
        ))
    }
}
