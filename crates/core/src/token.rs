// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `GatewayToken` entity (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProjectId, TokenId};

/// A capability attached to a token. `read` permits GETs, `write` permits
/// mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Read,
    Write,
}

impl Scope {
    pub fn permits(&self, required: Scope) -> bool {
        matches!((self, required), (Scope::Write, _) | (Scope::Read, Scope::Read))
    }
}

/// A persisted gateway token record. The plaintext secret is never part of
/// this type — it exists only in the response of the mint operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayToken {
    pub id: TokenId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub scope: Scope,
    /// Salted digest of the secret (hex-encoded sha256).
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl GatewayToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
