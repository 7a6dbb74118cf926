// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hack_core::FakeClock;
use std::path::PathBuf;
use tempfile::tempdir;

fn ctx(repo_root: &str, name: Option<&str>) -> ProjectContext {
    ProjectContext {
        repo_root: PathBuf::from(repo_root),
        project_dir: PathBuf::from(format!("{repo_root}/.hack")),
        name: name.map(str::to_string),
        dev_host: None,
        config_fingerprint: None,
    }
}

#[test]
fn fresh_root_upsert_inserts_with_revision_one() {
    let dir = tempdir().unwrap();
    let store = RegistryStore::open(dir.path().join("registry.json"), FakeClock::new());
    let outcome = store.upsert(ctx("/r", Some("demo"))).unwrap();
    match outcome {
        UpsertOutcome::Inserted(p) => assert_eq!(p.name, "demo"),
        other => panic!("expected Inserted, got {other:?}"),
    }
    assert_eq!(store.revision(), 1);
    assert_eq!(store.list().len(), 1);
}

#[test]
fn conflicting_slug_is_rejected_without_overwriting_incumbent() {
    let dir = tempdir().unwrap();
    let store = RegistryStore::open(dir.path().join("registry.json"), FakeClock::new());
    store.upsert(ctx("/r", Some("demo"))).unwrap();
    let revision_before = store.revision();

    let outcome = store.upsert(ctx("/other", Some("demo"))).unwrap();
    match outcome {
        UpsertOutcome::Conflict { incumbent } => assert_eq!(incumbent.repo_root, PathBuf::from("/r")),
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert_eq!(store.revision(), revision_before, "registry must not change on conflict");
    assert_eq!(store.list().len(), 1);
}

#[test]
fn repeated_upsert_of_same_repo_root_is_idempotent_touch() {
    let dir = tempdir().unwrap();
    let store = RegistryStore::open(dir.path().join("registry.json"), FakeClock::new());
    let first = store.upsert(ctx("/r", Some("demo"))).unwrap();
    let id = match first {
        UpsertOutcome::Inserted(p) => p.id,
        other => panic!("expected Inserted, got {other:?}"),
    };

    let second = store.upsert(ctx("/r", Some("demo"))).unwrap();
    match second {
        UpsertOutcome::Updated(p) => assert_eq!(p.id, id, "id must be stable across touches (P2)"),
        other => panic!("expected Updated, got {other:?}"),
    }
    assert_eq!(store.list().len(), 1);
}

#[test]
fn remove_prunes_by_id() {
    let dir = tempdir().unwrap();
    let store = RegistryStore::open(dir.path().join("registry.json"), FakeClock::new());
    let id = match store.upsert(ctx("/r", Some("demo"))).unwrap() {
        UpsertOutcome::Inserted(p) => p.id,
        other => panic!("expected Inserted, got {other:?}"),
    };
    store.remove(&id).unwrap();
    assert!(store.list().is_empty());
}

#[test]
fn store_reopens_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registry.json");
    {
        let store = RegistryStore::open(&path, FakeClock::new());
        store.upsert(ctx("/r", Some("demo"))).unwrap();
    }
    let reopened = RegistryStore::open(&path, FakeClock::new());
    assert_eq!(reopened.list().len(), 1);
    assert_eq!(reopened.revision(), 1);
}

#[test]
fn missing_registry_file_is_treated_as_empty() {
    let dir = tempdir().unwrap();
    let store = RegistryStore::open(dir.path().join("does-not-exist.json"), FakeClock::new());
    assert!(store.list().is_empty());
    assert_eq!(store.revision(), 0);
}

#[test]
fn corrupt_registry_file_is_backed_up_and_reset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registry.json");
    std::fs::write(&path, b"not json").unwrap();
    let store = RegistryStore::open(&path, FakeClock::new());
    assert!(store.list().is_empty());
    assert!(path.with_extension("json.bak").exists());
}
