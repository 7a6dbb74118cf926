// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn slugify_lowercases_and_dashes_punctuation() {
    assert_eq!(slugify("My Cool App!!"), "my-cool-app");
    assert_eq!(slugify("already-a-slug"), "already-a-slug");
    assert_eq!(slugify("___"), "project");
    assert_eq!(slugify(""), "project");
}

#[test]
fn candidate_slug_prefers_explicit_name_over_basename() {
    let ctx = ProjectContext {
        repo_root: PathBuf::from("/home/user/repos/widget-factory"),
        project_dir: PathBuf::from("/home/user/repos/widget-factory/.hack"),
        name: Some("Widgets".to_string()),
        dev_host: None,
        config_fingerprint: None,
    };
    assert_eq!(ctx.candidate_slug(), "widgets");
}

#[test]
fn candidate_slug_falls_back_to_repo_basename() {
    let ctx = ProjectContext {
        repo_root: PathBuf::from("/home/user/repos/widget-factory"),
        project_dir: PathBuf::from("/home/user/repos/widget-factory/.hack"),
        name: None,
        dev_host: None,
        config_fingerprint: None,
    };
    assert_eq!(ctx.candidate_slug(), "widget-factory");
}
