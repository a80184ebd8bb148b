//! E2E tests for the `cuestore` binary.
//!
//! Each test gets its own temp HOME so user config and the default database
//! path never leak in from the machine running the suite.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn db(&self) -> PathBuf {
        self.root().join("library.db")
    }

    /// Command with isolated HOME/XDG dirs and `--db` pointing at the workspace.
    fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.arg("--db").arg(self.db());
        cmd
    }

    fn bare_cmd(&self) -> Command {
        let bin = assert_cmd::cargo::cargo_bin!("cuestore");
        let mut cmd = Command::new(bin.as_os_str());
        cmd.current_dir(self.root())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("config"))
            .env("XDG_DATA_HOME", self.root().join("data"))
            .env("RUST_LOG", "error")
            .env_remove("CUESTORE_DB")
            .env_remove("CUESTORE_BUSY_TIMEOUT_MS")
            .env_remove("CUESTORE_UPSERT")
            .env_remove("CUESTORE_DUPLICATE_CUES");
        cmd
    }

    fn json<I, S>(&self, args: I) -> Value
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = self.cmd().args(args).arg("--json").output().unwrap();
        assert!(output.status.success(), "command failed: {output:?}");
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn e2e_position_roundtrip() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["position", "get", "episode-7"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0\t0:00.000"));

    ws.cmd()
        .args(["position", "set", "episode-7", "61005", "--title", "Episode 7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("episode-7 at 1:01.005"));

    let got = ws.json(["position", "get", "episode-7"]);
    assert_eq!(got["position"], 61_005);
    assert_eq!(got["stored"], true);

    let set = ws.json(["position", "set", "episode-7", "70000"]);
    assert_eq!(set["outcome"], "updated");
}

#[test]
fn e2e_cue_lifecycle() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["cue", "add", "lecture", "90000", "-d", "definition"])
        .args(["--title", "Lecture 1", "--artist", "Prof"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added cue point to lecture at 1:30.000"));
    ws.cmd()
        .args(["cue", "add", "lecture", "5000"])
        .assert()
        .success();

    let listed = ws.json(["cue", "list", "lecture"]);
    let positions: Vec<u64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|cue| cue["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, vec![5_000, 90_000]);

    ws.cmd()
        .args(["cue", "describe", "lecture", "5000", "warm-up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated cue point on lecture"));
    ws.cmd()
        .args(["cue", "list", "lecture"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000\t0:05.000\twarm-up"));

    let removed = ws.json(["cue", "rm", "lecture", "5000"]);
    assert_eq!(removed["changed"], true);
    ws.cmd()
        .args(["cue", "rm", "lecture", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cue point on lecture at 0:05.000"));

    ws.cmd()
        .args(["cue", "list", "nothing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cue points for nothing"));
}

#[test]
fn e2e_duplicate_cue_policy_flag() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["cue", "add", "song", "100", "-d", "first"])
        .assert()
        .success();

    let kept = ws.json([
        "cue",
        "add",
        "song",
        "100",
        "-d",
        "second",
        "--duplicate-cues",
        "keep-existing",
    ]);
    assert_eq!(kept["outcome"], "kept");

    let replaced = ws.json(["cue", "add", "song", "100", "-d", "third"]);
    assert_eq!(replaced["outcome"], "replaced");

    let listed = ws.json(["cue", "list", "song"]);
    assert_eq!(listed[0]["description"], "third");
}

#[test]
fn e2e_items_lists_cued_media() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["cue", "add", "b-side", "1", "--title", "B Side", "--artist", "Band"])
        .assert()
        .success();
    ws.cmd()
        .args(["cue", "add", "b-side", "2"])
        .assert()
        .success();
    ws.cmd()
        .args(["cue", "add", "a-side", "1"])
        .assert()
        .success();
    ws.cmd()
        .args(["position", "set", "uncued", "10"])
        .assert()
        .success();

    ws.cmd()
        .arg("items")
        .assert()
        .success()
        .stdout(predicate::str::contains("a-side\t(untitled)"))
        .stdout(predicate::str::contains("b-side\tB Side - Band"))
        .stdout(predicate::str::contains("uncued").not());

    let items = ws.json(["items"]);
    let ids: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a-side", "b-side"]);
}

#[test]
fn e2e_schema_reports_versions() {
    let ws = Workspace::new();
    let output = ws.cmd().arg("schema").output().unwrap();
    assert!(output.status.success(), "schema failed: {output:?}");

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["tool"], "cuestore");
    assert_eq!(json["schema_version"], json["supported_version"]);
    assert!(json["schemas"]["CuePoint"].is_object());
    assert!(json["schemas"]["MediaItem"].is_object());
}

#[test]
fn e2e_config_layers() {
    let ws = Workspace::new();
    let config_dir = ws.root().join("config").join("cuestore");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.yaml"),
        "busy-timeout-ms: 250\nupsert: insert-then-update\n",
    )
    .unwrap();

    let resolved = ws.json(["config"]);
    assert_eq!(resolved["busy-timeout-ms"], 250);
    assert_eq!(resolved["upsert"], "insert-then-update");
    assert_eq!(resolved["duplicate-cues"], "overwrite");

    let output = ws
        .cmd()
        .env("CUESTORE_UPSERT", "native")
        .args(["config", "--json"])
        .output()
        .unwrap();
    let resolved: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(resolved["upsert"], "native");
}

#[test]
fn e2e_default_database_under_data_home() {
    let ws = Workspace::new();
    ws.bare_cmd()
        .args(["position", "set", "x", "1"])
        .assert()
        .success();

    assert!(
        ws.root()
            .join("data")
            .join("cuestore")
            .join("library.db")
            .exists()
    );
}

#[test]
fn e2e_invalid_flag_value_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--upsert", "merge", "items"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown upsert strategy"));
}

#[test]
fn e2e_missing_explicit_config_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--config", "missing.yaml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
