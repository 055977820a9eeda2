//! Reconciliation between host unlock state and the backup store.
use log::{debug, error, info, warn};
use std::collections::BTreeSet;

use crate::backup::{BackupStore, SlotId};
use crate::catalog::TierId;
use crate::host::{NodeId, PerkGraph, UnlockEvents};
use crate::inject::TrackedNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Clean,
    Dirty,
}

/// Watches injected nodes and keeps the backup store in step with the host.
///
/// Unlock-change notifications mark the reconciler dirty; the next host save
/// event flushes the current unlocked set to the store. A failed flush stays
/// dirty and retries on the following save event only. Dropping the
/// reconciler withdraws every watch registration, so the host never delivers
/// events into torn-down state.
pub struct Reconciler<E: UnlockEvents> {
    tracked: Vec<TrackedNode>,
    slot: SlotId,
    state: SyncState,
    events: E,
}

impl<E: UnlockEvents> Reconciler<E> {
    /// Begin watching the given nodes for unlock changes.
    pub fn new(tracked: Vec<TrackedNode>, slot: SlotId, mut events: E) -> Self {
        for entry in &tracked {
            events.watch(entry.node);
        }
        debug!("watching {} tiers on slot {slot}", tracked.len());
        Self {
            tracked,
            slot,
            state: SyncState::Clean,
            events,
        }
    }

    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == SyncState::Dirty
    }

    /// Apply the on-disk backup to the host: every tracked tier in the stored
    /// set gets its host unlock flag forced true. One-directional. The backup
    /// is a lower bound; tiers absent from it keep whatever state the host
    /// already has. Returns how many flags were flipped.
    pub fn restore<G: PerkGraph, S: BackupStore>(&mut self, graph: &mut G, store: &S) -> u32 {
        let unlocked = match store.load(self.slot) {
            Ok(set) => set,
            Err(err) => {
                warn!("backup load failed for slot {}: {err}; assuming no prior backup", self.slot);
                BTreeSet::new()
            }
        };
        if unlocked.is_empty() {
            return 0;
        }

        let mut restored = 0u32;
        for entry in &self.tracked {
            if unlocked.contains(&entry.tier) && !graph.is_unlocked(entry.node) {
                graph.force_unlock(entry.node);
                debug!("restored unlock for tier {}", entry.tier);
                restored += 1;
            }
        }
        info!("restored {restored} unlocks from backup for slot {}", self.slot);
        restored
    }

    /// Host notification: the unlock state of a node changed.
    pub fn on_unlock_changed(&mut self, node: NodeId) {
        if self.tracked.iter().any(|entry| entry.node == node) {
            self.state = SyncState::Dirty;
            debug!("unlock change on {node:?}, backup marked dirty");
        }
    }

    /// Host notification: a save just occurred. Flushes the unlocked set to
    /// the store if anything changed since the last successful flush.
    pub fn on_save<G: PerkGraph, S: BackupStore>(&mut self, graph: &G, store: &S) {
        if self.state == SyncState::Clean {
            return;
        }
        let unlocked: BTreeSet<TierId> = self
            .tracked
            .iter()
            .filter(|entry| graph.is_unlocked(entry.node))
            .map(|entry| entry.tier.clone())
            .collect();
        match store.save(self.slot, &unlocked) {
            Ok(()) => {
                self.state = SyncState::Clean;
                info!("backed up {} unlocked tiers for slot {}", unlocked.len(), self.slot);
            }
            Err(err) => {
                // Stay dirty; the next save event retries.
                error!("backup save failed for slot {}: {err}", self.slot);
            }
        }
    }

    /// Stop watching and release the notification registrations.
    pub fn close(self) {
        drop(self);
    }
}

impl<E: UnlockEvents> Drop for Reconciler<E> {
    fn drop(&mut self) {
        for entry in &self.tracked {
            self.events.unwatch(entry.node);
        }
        debug!("unwatched {} tiers", self.tracked.len());
    }
}
