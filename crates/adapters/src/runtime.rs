// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container Inventory (spec §4.D): shells out to the container runtime to
//! enumerate and inspect containers, grouped by compose project.

use hack_core::{ContainerRecord, ContainerState};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RuntimeUnavailable {
    #[error("container runtime binary not found on PATH")]
    BinaryMissing,
    #[error("container runtime did not respond: {0}")]
    Unreachable(String),
}

#[derive(Debug, Clone, Default)]
pub struct ProjectInventory {
    pub working_dir: Option<PathBuf>,
    /// service name -> containers, sorted by id (spec §4.D "Determinism").
    pub services: BTreeMap<String, Vec<ContainerRecord>>,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// projectLabel -> inventory, sorted by label.
    pub projects: BTreeMap<String, ProjectInventory>,
}

impl Inventory {
    pub fn running_count(&self, project_label: &str) -> u32 {
        self.projects
            .get(project_label)
            .map(|p| {
                p.services
                    .values()
                    .flatten()
                    .filter(|c| !c.one_off && c.state.is_running())
                    .count() as u32
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct PsEntry {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Labels")]
    labels: String,
}

fn parse_labels(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Query the container runtime via `docker ps -a --format {{json .}}`,
/// returning a deterministic, project-grouped [`Inventory`].
///
/// `state_root` is used to classify projects whose working dir lives inside
/// it as global infra, filtered out unless `include_all` is set (spec §4.D).
pub async fn gather_inventory(
    state_root: &std::path::Path,
    include_all: bool,
) -> Result<Inventory, RuntimeUnavailable> {
    let raw = run_docker(&["ps", "-a", "--format", "{{json .}}"]).await?;

    let mut inventory = Inventory::default();
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let entry: PsEntry = match serde_json::from_str(line) {
            Ok(e) => e,
            Err(_) => continue,
        };
        let labels = parse_labels(&entry.labels);
        let Some(project_label) = labels.get("com.docker.compose.project") else { continue };
        let service_label = labels
            .get("com.docker.compose.service")
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        let one_off = labels
            .get("com.docker.compose.oneoff")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "True")
            .unwrap_or(false);
        let working_dir = labels
            .get("com.docker.compose.project.working_dir")
            .map(PathBuf::from);
        let instance_ordinal = labels
            .get("com.docker.compose.container-number")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        if let Some(dir) = &working_dir {
            if !include_all && dir.starts_with(state_root) {
                continue;
            }
        }

        let record = ContainerRecord {
            id: entry.id,
            project_label: project_label.clone(),
            service_label: service_label.clone(),
            instance_ordinal,
            state: ContainerState::parse(&entry.state),
            status: entry.status,
            working_dir: working_dir.clone(),
            one_off,
        };

        let project = inventory.projects.entry(project_label.clone()).or_default();
        if project.working_dir.is_none() {
            project.working_dir = working_dir;
        }
        let bucket = project.services.entry(service_label).or_default();
        bucket.push(record);
    }

    for project in inventory.projects.values_mut() {
        for containers in project.services.values_mut() {
            containers.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }

    Ok(inventory)
}

/// Run the docker CLI with a bounded deadline, surfacing an empty inventory
/// and a structured diagnostic rather than a fatal error when it is absent
/// or unreachable (spec §4.D "Failure").
async fn run_docker(args: &[&str]) -> Result<String, RuntimeUnavailable> {
    let program = "docker";
    if which(program).is_none() {
        return Err(RuntimeUnavailable::BinaryMissing);
    }

    let fut = tokio::process::Command::new(program).args(args).output();
    let output = tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .map_err(|_| RuntimeUnavailable::Unreachable("timed out".to_string()))?
        .map_err(|e| RuntimeUnavailable::Unreachable(e.to_string()))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::warn!(args = ?args, stderr, "docker command failed");
        Err(RuntimeUnavailable::Unreachable(stderr))
    }
}

fn which(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).map(|dir| dir.join(program)).find(|p| p.is_file())
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
