// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response bodies for `/v1/projects` (spec §4.H, §8 scenarios 1-2).

use hack_core::{Project, ProjectId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProjectRequest {
    pub repo_root: PathBuf,
    pub project_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
}

/// Outcome discriminant of an upsert (spec §8 scenarios 1-2: "inserted"/"conflict";
/// "updated" covers the idempotent-touch case of an existing slug whose repo root
/// matches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UpsertProjectResponse {
    Accepted {
        status: UpsertOutcome,
        id: ProjectId,
    },
    Conflict {
        status: UpsertOutcome,
        incumbent: Box<Project>,
        incoming: Box<UpsertProjectRequest>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
}
