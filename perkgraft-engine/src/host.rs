//! Capability traits the host environment must satisfy.
//!
//! The engine never reaches into host internals; everything it needs from the
//! progression graph, perk registry, save system, and pending-item queue is
//! expressed here and injected at the entry point.
use serde::Serialize;
use thiserror::Error;

use crate::backup::SlotId;
use crate::catalog::{TierDescriptor, UnlockCost};
use crate::layout::Vec2;

/// Opaque handle to a host-owned graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host rejected node creation for {raw_name}: {reason}")]
    CreationRejected { raw_name: String, reason: String },
    #[error("host registry rejected node {0:?}")]
    RegistryRejected(NodeId),
    #[error("node {0:?} no longer present in the host graph")]
    NodeVanished(NodeId),
    #[error("queue removal failed: {0}")]
    RemovalFailed(String),
}

/// Everything the host needs to materialize one injected perk node.
///
/// Creation, metadata attachment, and placement are a single fallible unit: a
/// rejection must leave no half-configured node behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerkSpec {
    pub raw_name: String,
    pub display_key: String,
    pub secret: bool,
    pub level_requirement: i32,
    pub cost: UnlockCost,
    /// Capacity granted by the node's effect component.
    pub effect_value: i32,
    pub position: Vec2,
}

impl PerkSpec {
    #[must_use]
    pub fn from_tier(tier: &TierDescriptor, position: Vec2) -> Self {
        Self {
            raw_name: tier.id.as_str().to_string(),
            display_key: tier.display_key.clone(),
            secret: tier.secret,
            level_requirement: tier.level_requirement,
            cost: tier.cost.clone(),
            effect_value: tier.effect_value,
            position,
        }
    }
}

/// The host's progression graph.
///
/// `node_ids` fixes the iteration order used for anchor tie-breaking; the
/// engine takes that order as-is.
pub trait PerkGraph {
    /// Whether the host has finished initializing the graph. The engine
    /// refuses to run against a graph that is not ready yet.
    fn is_ready(&self) -> bool {
        true
    }

    fn node_ids(&self) -> Vec<NodeId>;

    fn raw_name(&self, node: NodeId) -> Option<String>;

    fn display_name(&self, node: NodeId) -> Option<String>;

    /// Value of the host's "adds capacity" marker component, when present.
    fn capacity_marker(&self, node: NodeId) -> Option<i32>;

    fn position(&self, node: NodeId) -> Option<Vec2>;

    fn is_unlocked(&self, node: NodeId) -> bool;

    /// Force the host unlock flag to true. Never used to lock a node.
    fn force_unlock(&mut self, node: NodeId);

    /// Create a node with all metadata attached and placed at
    /// `spec.position`.
    ///
    /// # Errors
    ///
    /// Returns `HostError` when the host rejects the creation; the host must
    /// not keep a partially configured node in that case.
    fn create_node(&mut self, spec: &PerkSpec) -> Result<NodeId, HostError>;
}

/// The host's perk/node registry with its derived aggregates.
pub trait PerkRegistry {
    fn registered(&self) -> Vec<NodeId>;

    /// Append a node to the registry.
    ///
    /// # Errors
    ///
    /// Returns `HostError` when the registry rejects the entry.
    fn register(&mut self, node: NodeId) -> Result<(), HostError>;

    /// Recompute derived aggregates. Triggered once per injection batch.
    fn reload(&mut self);
}

/// Access to the host's save-slot state.
pub trait SaveSlots {
    /// The active slot, or `None` when the host cannot report one.
    fn active_slot(&self) -> Option<SlotId>;
}

/// A host-side buffer of pending items drained before injection.
pub trait PendingQueue {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the item at the back of the queue.
    ///
    /// # Errors
    ///
    /// Returns `HostError` when the host reports the removal failed.
    fn remove_back(&mut self) -> Result<(), HostError>;
}

/// Host notification source for unlock-state changes.
///
/// The reconciler registers interest per node on creation and is guaranteed
/// to withdraw it on teardown, so the host never delivers events into
/// destroyed state.
pub trait UnlockEvents {
    fn watch(&mut self, node: NodeId);

    fn unwatch(&mut self, node: NodeId);
}
