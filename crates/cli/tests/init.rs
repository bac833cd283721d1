// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn creates_work_dir() {
    let temp = TempDir::new().unwrap();

    cq().arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized offline queue"));

    assert!(temp.path().join(".carequeue/config.toml").is_file());
}

#[parameterized(
    file = { "file" },
    sqlite = { "sqlite" },
    memory = { "memory" },
)]
fn init_with_backend(backend: &str) {
    let temp = TempDir::new().unwrap();

    cq().args(["init", "--backend", backend])
        .current_dir(temp.path())
        .assert()
        .success();

    let config = std::fs::read_to_string(temp.path().join(".carequeue/config.toml")).unwrap();
    assert!(config.contains(&format!("backend = \"{}\"", backend)), "{config}");
}

#[test]
fn init_twice_fails() {
    let temp = init_temp_offline();

    cq().arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_bad_base_url() {
    let temp = TempDir::new().unwrap();

    cq().args(["init", "--base-url", "ward.local"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("api.base_url"));
}

#[test]
fn commands_require_init() {
    let temp = TempDir::new().unwrap();

    cq().args(["queue", "list"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cq init"));
}

#[test]
fn directory_flag_finds_project() {
    let temp = init_temp_offline();
    let elsewhere = TempDir::new().unwrap();

    cq().arg("-C")
        .arg(temp.path())
        .args(["queue", "list"])
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Queue is empty"));
}
