use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;

use carillon_core::{snapshot, Mount, RelayDefinition, RelayId, RelayType, Shortcode};
use tempfile::TempDir;

fn carillon_cmd(base: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("carillon"));
    cmd.env("CARILLON_BASE_DIR", base);
    for var in [
        "CARILLON_PARENT_BASE_URL",
        "CARILLON_PARENT_API_KEY",
        "CARILLON_RELAY_BASE_URL",
        "CARILLON_ACME_DOMAINS",
        "APPLICATION_ENV",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn seed_snapshot(base: &Path) {
    let relays = vec![RelayDefinition {
        id: RelayId::from("1"),
        shortcode: Shortcode::from("alpha"),
        name: "Alpha FM".into(),
        description: String::new(),
        genre: String::new(),
        url: String::new(),
        relay_type: RelayType::ManualRelay,
        port: 8000,
        admin_password: "pw".into(),
        relay_password: String::new(),
        mounts: vec![Mount {
            path: "/radio.mp3".into(),
        }],
    }];
    snapshot::save_relays(&base.join("stations"), &relays).expect("seed snapshot");
}

#[test]
fn help_lists_all_subcommands() {
    let base = TempDir::new().expect("base");
    carillon_cmd(base.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("update"))
        .stdout(contains("cert"))
        .stdout(contains("status"))
        .stdout(contains("diff"))
        .stdout(contains("nowplaying"));
}

#[test]
fn status_without_snapshot_points_at_update() {
    let base = TempDir::new().expect("base");
    carillon_cmd(base.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Run `carillon update` first"));
}

#[test]
fn status_renders_snapshot_table() {
    let base = TempDir::new().expect("base");
    seed_snapshot(base.path());

    carillon_cmd(base.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("alpha"))
        .stdout(contains("Alpha FM"))
        .stdout(contains("8000"));
}

#[test]
fn status_json_emits_raw_records() {
    let base = TempDir::new().expect("base");
    seed_snapshot(base.path());

    carillon_cmd(base.path())
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(contains("\"shortcode\": \"alpha\""))
        .stdout(contains("\"type\": \"manual-relay\""));
}

#[test]
fn update_requires_parent_credentials() {
    let base = TempDir::new().expect("base");
    carillon_cmd(base.path())
        .arg("update")
        .assert()
        .failure()
        .stderr(contains("CARILLON_PARENT_BASE_URL"));
}

#[test]
fn cert_check_reports_missing_certificate() {
    let base = TempDir::new().expect("base");
    carillon_cmd(base.path())
        .args(["cert", "--check"])
        .assert()
        .success()
        .stdout(contains("certificate automation disabled"))
        .stdout(contains("no active certificate"));
}

#[test]
fn cert_without_domains_fails_with_guidance() {
    let base = TempDir::new().expect("base");
    carillon_cmd(base.path())
        .arg("cert")
        .assert()
        .failure()
        .stderr(contains("CARILLON_ACME_DOMAINS"));
}

#[test]
fn diff_without_snapshot_fails_with_guidance() {
    let base = TempDir::new().expect("base");
    carillon_cmd(base.path())
        .env("CARILLON_PARENT_BASE_URL", "https://radio.example.com")
        .env("CARILLON_PARENT_API_KEY", "key")
        .env("CARILLON_RELAY_BASE_URL", "https://relay.example.com")
        .arg("diff")
        .assert()
        .failure()
        .stderr(contains("carillon update"));
}
