//! Idempotent per-tier injection into the host graph.
use log::{error, info, warn};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

use crate::anchor::{self, AnchorStrategy, ResolverConfig};
use crate::catalog::{TierCatalog, TierId};
use crate::host::{NodeId, PerkGraph, PerkRegistry, PerkSpec};
use crate::layout::{Vec2, place};

/// A tier identity paired with its live host node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedNode {
    pub tier: TierId,
    pub node: NodeId,
}

/// One node created during this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedTier {
    pub tier: TierId,
    pub node: NodeId,
    pub strategy: AnchorStrategy,
    pub position: Vec2,
}

/// Why a tier was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AnchorNotFound,
    NodeCreationFailed,
}

/// Per-tier failure record. Non-fatal: the batch continues without the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierFailure {
    pub tier: TierId,
    pub kind: FailureKind,
    pub detail: String,
}

/// Outcome of one injection batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InjectionReport {
    pub created: Vec<CreatedTier>,
    /// Tiers whose node already existed from an earlier run.
    pub already_present: Vec<TrackedNode>,
    pub failures: SmallVec<[TierFailure; 2]>,
}

impl InjectionReport {
    /// Every live mod node, created this run or found from an earlier one.
    /// This is the set the reconciler watches.
    #[must_use]
    pub fn tracked(&self) -> Vec<TrackedNode> {
        let mut tracked: Vec<TrackedNode> = self
            .created
            .iter()
            .map(|created| TrackedNode {
                tier: created.tier.clone(),
                node: created.node,
            })
            .collect();
        tracked.extend(self.already_present.iter().cloned());
        tracked
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Inject every catalog tier that is not already present.
///
/// Per tier: skip-if-present scan by raw name, anchor resolution, placement,
/// creation, registry append. Failures are recorded and the batch continues;
/// nothing already injected is ever removed or renamed, and a second run over
/// the same graph state reports every tier as already present. A node left
/// unregistered by an earlier run (the registry rejected the append after the
/// graph accepted the node) is not recreated; its registration is completed
/// here, or reported as failed again. The caller triggers the registry reload
/// once for the whole batch.
pub fn inject_all<G: PerkGraph, R: PerkRegistry>(
    catalog: &TierCatalog,
    graph: &mut G,
    registry: &mut R,
    cfg: &ResolverConfig,
) -> InjectionReport {
    let mut report = InjectionReport::default();

    // Snapshot of raw names before this run; the idempotency guard.
    let existing: HashMap<String, NodeId> = graph
        .node_ids()
        .into_iter()
        .filter_map(|node| graph.raw_name(node).map(|name| (name, node)))
        .collect();
    let registered: HashSet<NodeId> = registry.registered().into_iter().collect();

    for tier in catalog.iter() {
        if let Some(&node) = existing.get(tier.id.as_str()) {
            if registered.contains(&node) {
                info!("tier {} already injected, skipping", tier.id);
                report.already_present.push(TrackedNode {
                    tier: tier.id.clone(),
                    node,
                });
            } else if let Err(err) = registry.register(node) {
                error!("registry rejected existing node for tier {}: {err}", tier.id);
                report.failures.push(TierFailure {
                    tier: tier.id.clone(),
                    kind: FailureKind::NodeCreationFailed,
                    detail: err.to_string(),
                });
            } else {
                info!("completed registration for tier {} from an earlier run", tier.id);
                report.already_present.push(TrackedNode {
                    tier: tier.id.clone(),
                    node,
                });
            }
            continue;
        }

        let Some(found) = anchor::resolve(&tier.anchor, graph, cfg) else {
            warn!(
                "no anchor found for tier {} (wanted {}), skipping",
                tier.id, tier.anchor.anchor_id
            );
            report.failures.push(TierFailure {
                tier: tier.id.clone(),
                kind: FailureKind::AnchorNotFound,
                detail: format!("anchor {} unresolvable", tier.anchor.anchor_id),
            });
            continue;
        };

        let Some(anchor_pos) = graph.position(found.node) else {
            error!(
                "anchor {:?} for tier {} has no position, skipping",
                found.node, tier.id
            );
            report.failures.push(TierFailure {
                tier: tier.id.clone(),
                kind: FailureKind::NodeCreationFailed,
                detail: format!("anchor node {:?} vanished before placement", found.node),
            });
            continue;
        };

        let position = place(anchor_pos, &tier.anchor.offset);
        let spec = PerkSpec::from_tier(tier, position);
        let node = match graph.create_node(&spec) {
            Ok(node) => node,
            Err(err) => {
                error!("node creation failed for tier {}: {err}", tier.id);
                report.failures.push(TierFailure {
                    tier: tier.id.clone(),
                    kind: FailureKind::NodeCreationFailed,
                    detail: err.to_string(),
                });
                continue;
            }
        };

        if let Err(err) = registry.register(node) {
            error!("registry rejected tier {}: {err}", tier.id);
            report.failures.push(TierFailure {
                tier: tier.id.clone(),
                kind: FailureKind::NodeCreationFailed,
                detail: err.to_string(),
            });
            continue;
        }

        info!(
            "injected tier {} at ({:.1}, {:.1}) via {:?} anchor",
            tier.id, position.x, position.y, found.strategy
        );
        report.created.push(CreatedTier {
            tier: tier.id.clone(),
            node,
            strategy: found.strategy,
            position,
        });
    }

    report
}
