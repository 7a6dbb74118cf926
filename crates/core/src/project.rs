// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Project` entity (spec §3) and the slug rules that back its identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ProjectId;

/// A registered project: a stable slug bound to a repository checkout.
///
/// Identity is the `name` slug (invariant P1); `id` never changes for the
/// lifetime of an entry (invariant P2) and is what external references
/// (gateway tokens) key on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub repo_root: PathBuf,
    pub project_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Input to an upsert, before the project has an `id` or timestamps.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub repo_root: PathBuf,
    pub project_dir: PathBuf,
    pub name: Option<String>,
    pub dev_host: Option<String>,
    pub config_fingerprint: Option<String>,
}

impl ProjectContext {
    /// The candidate slug: the explicit `name`, else the repo root's basename,
    /// lowercased and limited to slug-safe characters.
    pub fn candidate_slug(&self) -> String {
        if let Some(name) = &self.name {
            return slugify(name);
        }
        let basename = self
            .repo_root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        slugify(&basename)
    }
}

/// Lowercase, replace runs of non-alphanumeric characters with `-`, and trim
/// leading/trailing dashes. Falls back to `"project"` for an empty result.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && !out.is_empty() {
            out.push('-');
            last_was_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        "project".to_string()
    } else {
        out
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
