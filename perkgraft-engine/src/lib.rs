//! Perkgraft Extension Engine
//!
//! Idempotent graph-extension and unlock-state reconciliation for host-owned
//! perk trees. The engine locates anchor nodes, injects descendant tiers at
//! anchor-relative positions, and keeps a durable slot-scoped backup of
//! unlock state that it reconciles with the host across process lifetimes.
//! The host itself is an opaque collaborator behind the `host` traits.

pub mod anchor;
pub mod backup;
pub mod catalog;
pub mod drain;
pub mod host;
pub mod inject;
pub mod layout;
pub mod reconcile;
pub mod session;

// Re-export commonly used types
pub use anchor::{AnchorMatch, AnchorRule, AnchorStrategy, ResolverConfig, resolve};
pub use backup::{BackupError, BackupStore, FsBackupStore, SlotId};
pub use catalog::{CatalogError, ItemCost, TierCatalog, TierDescriptor, TierId, UnlockCost};
pub use drain::{DrainOutcome, drain_pending};
pub use host::{
    HostError, NodeId, PendingQueue, PerkGraph, PerkRegistry, PerkSpec, SaveSlots, UnlockEvents,
};
pub use inject::{
    CreatedTier, FailureKind, InjectionReport, TierFailure, TrackedNode, inject_all,
};
pub use layout::{OffsetRule, Vec2, place};
pub use reconcile::Reconciler;
pub use session::{GraftSession, RunReport, SessionConfig, SessionError};
