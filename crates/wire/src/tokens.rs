// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response bodies for `/v1/tokens` (spec §4.H, §8 scenario 3).

use hack_core::{GatewayToken, ProjectId, Scope, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MintTokenRequest {
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

/// The token record as returned to callers: never carries the plaintext
/// secret or the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecordView {
    pub id: TokenId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&GatewayToken> for TokenRecordView {
    fn from(t: &GatewayToken) -> Self {
        TokenRecordView {
            id: t.id,
            label: t.label.clone(),
            scope: t.scope,
            project_id: t.project_id,
            created_at: t.created_at,
            revoked_at: t.revoked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MintTokenResponse {
    pub record: TokenRecordView,
    /// Plaintext secret; present only in this one response, never persisted.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListTokensResponse {
    pub tokens: Vec<TokenRecordView>,
}
