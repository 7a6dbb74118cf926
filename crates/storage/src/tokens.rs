// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The gateway token store (spec §4.C, §3 `GatewayToken`/T1/T2).

use hack_core::{Clock, GatewayToken, ProjectId, Scope, TokenId};
use parking_lot::Mutex;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;

use crate::atomic::{load_or_reset, StoreIoError};
use crate::registry::persist_with_retries;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unknown token: {0}")]
    UnknownToken(String),
    #[error("retries exhausted persisting tokens: {0}")]
    ConcurrentModification(#[source] StoreIoError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenDocument {
    #[serde(default)]
    revision: u64,
    /// Hex-encoded random salt mixed into every secret digest.
    #[serde(default)]
    salt: String,
    #[serde(default)]
    tokens: Vec<GatewayToken>,
}

pub struct MintedToken {
    pub record: GatewayToken,
    pub secret: String,
}

pub struct TokenStore<C: Clock> {
    path: PathBuf,
    clock: C,
    doc: Mutex<TokenDocument>,
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex_encode(&buf)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn digest(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Constant-time byte comparison: always walks the full length of both
/// inputs so timing does not leak how many leading bytes matched.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

impl<C: Clock> TokenStore<C> {
    pub fn open(path: impl Into<PathBuf>, clock: C) -> Self {
        let path = path.into();
        let mut doc = load_or_reset::<TokenDocument>(&path).unwrap_or_default();
        if doc.salt.is_empty() {
            doc.salt = random_hex(16);
        }
        Self { path, clock, doc: Mutex::new(doc) }
    }

    pub fn list(&self) -> Vec<GatewayToken> {
        self.doc.lock().tokens.clone()
    }

    /// Mint a new token, atomically revoking any prior un-revoked token
    /// sharing the same `(projectId, label)` pair (invariant T1).
    pub fn mint(
        &self,
        scope: Scope,
        label: Option<String>,
        project_id: Option<ProjectId>,
    ) -> Result<MintedToken, TokenError> {
        let mut doc = self.doc.lock();
        let now = self.clock.utc_now();

        if let Some(label) = &label {
            for existing in doc.tokens.iter_mut() {
                if existing.label.as_deref() == Some(label.as_str())
                    && existing.project_id == project_id
                    && existing.revoked_at.is_none()
                {
                    existing.revoked_at = Some(now);
                }
            }
        }

        let secret = random_hex(32);
        let hash = digest(&doc.salt, &secret);
        let record = GatewayToken {
            id: TokenId::new(),
            label,
            scope,
            hash,
            project_id,
            created_at: now,
            revoked_at: None,
        };
        doc.tokens.push(record.clone());
        doc.revision += 1;
        self.persist(&doc)?;
        Ok(MintedToken { record, secret })
    }

    pub fn revoke(&self, id: &TokenId) -> Result<GatewayToken, TokenError> {
        let mut doc = self.doc.lock();
        let now = self.clock.utc_now();
        let token = doc
            .tokens
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TokenError::UnknownToken(id.to_string()))?;
        token.revoked_at.get_or_insert(now);
        let result = token.clone();
        doc.revision += 1;
        self.persist(&doc)?;
        Ok(result)
    }

    /// Invariant T2: a secret verifies iff a stored, un-revoked token has a
    /// matching hash. Every record is compared to avoid a timing oracle on
    /// table size or match position.
    pub fn verify(&self, secret: &str) -> Option<GatewayToken> {
        let doc = self.doc.lock();
        let candidate = digest(&doc.salt, secret);
        let mut found: Option<GatewayToken> = None;
        for token in doc.tokens.iter() {
            let matches = constant_time_eq(&token.hash, &candidate) && token.revoked_at.is_none();
            if matches {
                found = Some(token.clone());
            }
        }
        found
    }

    fn persist(&self, doc: &TokenDocument) -> Result<(), TokenError> {
        persist_with_retries(&self.path, doc).map_err(TokenError::ConcurrentModification)
    }
}

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;
