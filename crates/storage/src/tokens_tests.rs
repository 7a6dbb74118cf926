// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hack_core::FakeClock;
use tempfile::tempdir;

#[test]
fn mint_verify_revoke_round_trip() {
    let dir = tempdir().unwrap();
    let store = TokenStore::open(dir.path().join("tokens.json"), FakeClock::new());

    let minted = store.mint(Scope::Write, Some("phone".to_string()), None).unwrap();
    assert!(store.verify(&minted.secret).is_some());

    store.revoke(&minted.record.id).unwrap();
    assert!(store.verify(&minted.secret).is_none(), "revoked secret must not verify");
}

#[test]
fn second_mint_with_same_label_revokes_prior_atomically() {
    let dir = tempdir().unwrap();
    let store = TokenStore::open(dir.path().join("tokens.json"), FakeClock::new());

    let first = store.mint(Scope::Write, Some("phone".to_string()), None).unwrap();
    let second = store.mint(Scope::Write, Some("phone".to_string()), None).unwrap();

    assert_ne!(first.record.id, second.record.id);
    let listed = store.list();
    let prior = listed.iter().find(|t| t.id == first.record.id).unwrap();
    assert!(prior.is_revoked(), "prior token with same label must be revoked");
    assert!(store.verify(&first.secret).is_none());
    assert!(store.verify(&second.secret).is_some());
}

#[test]
fn distinct_labels_do_not_revoke_each_other() {
    let dir = tempdir().unwrap();
    let store = TokenStore::open(dir.path().join("tokens.json"), FakeClock::new());

    let a = store.mint(Scope::Read, Some("phone".to_string()), None).unwrap();
    let b = store.mint(Scope::Read, Some("laptop".to_string()), None).unwrap();

    assert!(store.verify(&a.secret).is_some());
    assert!(store.verify(&b.secret).is_some());
}

#[test]
fn unknown_secret_does_not_verify() {
    let dir = tempdir().unwrap();
    let store = TokenStore::open(dir.path().join("tokens.json"), FakeClock::new());
    store.mint(Scope::Read, None, None).unwrap();
    assert!(store.verify("not-a-real-secret").is_none());
}

#[test]
fn store_reopens_with_stable_salt_so_old_secrets_still_verify() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tokens.json");
    let secret = {
        let store = TokenStore::open(&path, FakeClock::new());
        store.mint(Scope::Write, None, None).unwrap().secret
    };
    let reopened = TokenStore::open(&path, FakeClock::new());
    assert!(reopened.verify(&secret).is_some());
}
