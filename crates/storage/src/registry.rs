// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The project registry store (spec §4.B, §3 `Project`/P1/P2).

use hack_core::{Clock, Project, ProjectContext, ProjectId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::atomic::{load_or_reset, write_atomic, StoreIoError};

const MAX_WRITE_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("project not found: {0}")]
    UnknownProject(String),
    #[error("retries exhausted persisting registry: {0}")]
    ConcurrentModification(#[source] StoreIoError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    projects: Vec<Project>,
}

/// Outcome of [`RegistryStore::upsert`] (spec §8 scenarios 1-2).
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    Inserted(Project),
    Updated(Project),
    Conflict { incumbent: Project },
}

pub struct RegistryStore<C: Clock> {
    path: PathBuf,
    clock: C,
    doc: Mutex<RegistryDocument>,
}

impl<C: Clock> RegistryStore<C> {
    pub fn open(path: impl Into<PathBuf>, clock: C) -> Self {
        let path = path.into();
        let doc = load_or_reset::<RegistryDocument>(&path).unwrap_or_default();
        Self { path, clock, doc: Mutex::new(doc) }
    }

    pub fn list(&self) -> Vec<Project> {
        self.doc.lock().projects.clone()
    }

    /// Case-insensitive slug lookup (spec §4.B `resolveByName`).
    pub fn resolve_by_name(&self, name: &str) -> Option<Project> {
        find_by_name(&self.doc.lock().projects, name).cloned()
    }

    pub fn resolve_by_id(&self, id: &ProjectId) -> Option<Project> {
        self.doc.lock().projects.iter().find(|p| &p.id == id).cloned()
    }

    /// Insert-or-touch a project (spec §4.B, invariants P1/P2).
    ///
    /// Matches an existing entry by `repoRoot` first (idempotent touch);
    /// otherwise the candidate slug must be free or the upsert is rejected
    /// as a conflict without ever overwriting the incumbent.
    pub fn upsert(&self, ctx: ProjectContext) -> Result<UpsertOutcome, RegistryError> {
        let mut doc = self.doc.lock();
        let now = self.clock.utc_now();

        if let Some(existing) = doc.projects.iter_mut().find(|p| p.repo_root == ctx.repo_root) {
            existing.last_seen_at = now;
            if ctx.dev_host.is_some() {
                existing.dev_host = ctx.dev_host.clone();
            }
            if ctx.config_fingerprint.is_some() {
                existing.config_fingerprint = ctx.config_fingerprint.clone();
            }
            let updated = existing.clone();
            doc.revision += 1;
            self.persist(&doc)?;
            return Ok(UpsertOutcome::Updated(updated));
        }

        let slug = ctx.candidate_slug();
        if let Some(incumbent) = find_by_name(&doc.projects, &slug).cloned() {
            return Ok(UpsertOutcome::Conflict { incumbent });
        }

        let project = Project {
            id: ProjectId::new(),
            name: slug,
            repo_root: ctx.repo_root,
            project_dir: ctx.project_dir,
            dev_host: ctx.dev_host,
            config_fingerprint: ctx.config_fingerprint,
            first_seen_at: now,
            last_seen_at: now,
        };
        doc.projects.push(project.clone());
        doc.revision += 1;
        self.persist(&doc)?;
        Ok(UpsertOutcome::Inserted(project))
    }

    /// Prune a project by id (spec §3 "soft-removed only via explicit prune").
    pub fn remove(&self, id: &ProjectId) -> Result<Project, RegistryError> {
        let mut doc = self.doc.lock();
        let idx = doc
            .projects
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| RegistryError::UnknownProject(id.to_string()))?;
        let removed = doc.projects.remove(idx);
        doc.revision += 1;
        self.persist(&doc)?;
        Ok(removed)
    }

    pub fn revision(&self) -> u64 {
        self.doc.lock().revision
    }

    fn persist(&self, doc: &RegistryDocument) -> Result<(), RegistryError> {
        persist_with_retries(&self.path, doc).map_err(RegistryError::ConcurrentModification)
    }
}

fn find_by_name<'a>(projects: &'a [Project], name: &str) -> Option<&'a Project> {
    projects.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub(crate) fn persist_with_retries<T: Serialize>(path: &Path, doc: &T) -> Result<(), StoreIoError> {
    let mut last_err = None;
    for _ in 0..MAX_WRITE_RETRIES {
        match write_atomic(path, doc) {
            Ok(()) => return Ok(()),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.expect("loop ran at least once"))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
