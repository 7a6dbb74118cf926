// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_labels_splits_on_comma_and_equals() {
    let labels = parse_labels("com.docker.compose.project=demo,com.docker.compose.service=web");
    assert_eq!(labels.get("com.docker.compose.project"), Some(&"demo".to_string()));
    assert_eq!(labels.get("com.docker.compose.service"), Some(&"web".to_string()));
}

#[test]
fn running_count_excludes_one_off_containers() {
    let mut inventory = Inventory::default();
    let project = inventory.projects.entry("demo".to_string()).or_default();
    project.services.insert(
        "web".to_string(),
        vec![
            ContainerRecord {
                id: "a".to_string(),
                project_label: "demo".to_string(),
                service_label: "web".to_string(),
                instance_ordinal: 1,
                state: ContainerState::Running,
                status: "Up".to_string(),
                working_dir: None,
                one_off: false,
            },
            ContainerRecord {
                id: "b".to_string(),
                project_label: "demo".to_string(),
                service_label: "web".to_string(),
                instance_ordinal: 2,
                state: ContainerState::Running,
                status: "Up".to_string(),
                working_dir: None,
                one_off: true,
            },
        ],
    );
    assert_eq!(inventory.running_count("demo"), 1);
}
