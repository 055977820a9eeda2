//! Durable unlock backup, independent of the host's own save file.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::TierId;

/// Host-defined save-data partition identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Fallback slot used when the host cannot report the active one.
    pub const DEFAULT: Self = Self(0);
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to read backup for slot {slot}: {source}")]
    Read {
        slot: SlotId,
        source: std::io::Error,
    },
    #[error("failed to write backup for slot {slot}: {source}")]
    Write {
        slot: SlotId,
        source: std::io::Error,
    },
}

/// Slot-scoped record of which tiers are unlocked.
///
/// `load` of a slot that was never saved is not an error and returns the
/// empty set.
pub trait BackupStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the unlocked-tier set for a slot.
    ///
    /// # Errors
    ///
    /// Returns an error only for genuine read failures, never for a missing
    /// record.
    fn load(&self, slot: SlotId) -> Result<BTreeSet<TierId>, Self::Error>;

    /// Persist the unlocked-tier set for a slot.
    ///
    /// # Errors
    ///
    /// Returns an error when the record cannot be written durably.
    fn save(&self, slot: SlotId, unlocked: &BTreeSet<TierId>) -> Result<(), Self::Error>;
}

/// File-backed store: one newline-delimited text file per slot, written
/// atomically via a temp file and rename so a crash never leaves a truncated
/// record.
#[derive(Debug, Clone)]
pub struct FsBackupStore {
    root: PathBuf,
}

impl FsBackupStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.root.join(format!("backup_slot_{slot}.txt"))
    }
}

impl BackupStore for FsBackupStore {
    type Error = BackupError;

    fn load(&self, slot: SlotId) -> Result<BTreeSet<TierId>, BackupError> {
        let path = self.slot_path(slot);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!("no backup file at {}, starting empty", path.display());
                return Ok(BTreeSet::new());
            }
            Err(source) => return Err(BackupError::Read { slot, source }),
        };
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(TierId::new)
            .collect())
    }

    fn save(&self, slot: SlotId, unlocked: &BTreeSet<TierId>) -> Result<(), BackupError> {
        fs::create_dir_all(&self.root).map_err(|source| BackupError::Write { slot, source })?;
        let path = self.slot_path(slot);
        let tmp = path.with_extension("txt.tmp");

        let mut contents = String::new();
        for id in unlocked {
            contents.push_str(id.as_str());
            contents.push('\n');
        }
        fs::write(&tmp, contents).map_err(|source| BackupError::Write { slot, source })?;
        fs::rename(&tmp, &path).map_err(|source| BackupError::Write { slot, source })?;
        debug!("backed up {} unlocked tiers to {}", unlocked.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_files_are_named_by_slot_id() {
        let store = FsBackupStore::new("/tmp/perkgraft");
        assert_eq!(
            store.slot_path(SlotId(3)),
            PathBuf::from("/tmp/perkgraft/backup_slot_3.txt")
        );
        assert_eq!(
            store.slot_path(SlotId::DEFAULT),
            PathBuf::from("/tmp/perkgraft/backup_slot_0.txt")
        );
    }
}
