//! Durability and format guarantees of the file-backed backup store.
use std::collections::BTreeSet;
use std::fs;

use perkgraft_engine::{BackupStore, FsBackupStore, SlotId, TierId};
use tempfile::TempDir;

fn set(ids: &[&str]) -> BTreeSet<TierId> {
    ids.iter().map(|id| TierId::new(id)).collect()
}

fn fresh_store() -> (TempDir, FsBackupStore) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let store = FsBackupStore::new(dir.path());
    (dir, store)
}

#[test]
fn round_trip_is_order_insensitive() {
    let (_dir, store) = fresh_store();

    store.save(SlotId(1), &set(&["t3", "t1"])).unwrap();
    assert_eq!(store.load(SlotId(1)).unwrap(), set(&["t1", "t3"]));

    store.save(SlotId(1), &set(&["t1", "t3"])).unwrap();
    assert_eq!(store.load(SlotId(1)).unwrap(), set(&["t1", "t3"]));
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = TempDir::new().unwrap();
    let store = FsBackupStore::new(dir.path().join("never_created"));
    assert!(store.load(SlotId(7)).unwrap().is_empty());
}

#[test]
fn slots_are_isolated() {
    let (_dir, store) = fresh_store();

    store.save(SlotId(1), &set(&["t1", "t2"])).unwrap();
    store.save(SlotId(2), &set(&["t9"])).unwrap();

    assert_eq!(store.load(SlotId(1)).unwrap(), set(&["t1", "t2"]));
    assert_eq!(store.load(SlotId(2)).unwrap(), set(&["t9"]));

    store.save(SlotId(1), &set(&["t1"])).unwrap();
    assert_eq!(store.load(SlotId(2)).unwrap(), set(&["t9"]));
}

#[test]
fn repeated_saves_are_byte_identical() {
    let (dir, store) = fresh_store();
    let unlocked = set(&["Perk_SuperStorage_2", "Perk_SuperStorage_10"]);

    store.save(SlotId(3), &unlocked).unwrap();
    let first = fs::read(dir.path().join("backup_slot_3.txt")).unwrap();

    store.save(SlotId(3), &unlocked).unwrap();
    let second = fs::read(dir.path().join("backup_slot_3.txt")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn identities_round_trip_verbatim() {
    let (_dir, store) = fresh_store();
    let unlocked = set(&["Perk_SuperStorage_2", "perk.with.dots", "perk-with-dashes"]);

    store.save(SlotId(0), &unlocked).unwrap();
    assert_eq!(store.load(SlotId(0)).unwrap(), unlocked);
}

#[test]
fn load_ignores_blank_lines_and_surrounding_whitespace() {
    let (dir, store) = fresh_store();

    fs::write(
        dir.path().join("backup_slot_4.txt"),
        "  t1  \n\n\tt2\n   \nt3",
    )
    .unwrap();

    assert_eq!(store.load(SlotId(4)).unwrap(), set(&["t1", "t2", "t3"]));
}

#[test]
fn save_creates_the_store_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("mod").join("backups");
    let store = FsBackupStore::new(&nested);

    store.save(SlotId(5), &set(&["t1"])).unwrap();
    assert!(nested.join("backup_slot_5.txt").exists());
}

#[test]
fn no_temp_file_left_behind_after_save() {
    let (dir, store) = fresh_store();

    store.save(SlotId(6), &set(&["t1", "t2"])).unwrap();

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "atomic save must clean up: {leftovers:?}");
}
