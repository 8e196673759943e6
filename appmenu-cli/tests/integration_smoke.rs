//! Smoke tests for command wiring and end-to-end store behavior

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated data directory and config file per test
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    fn items_path(&self) -> PathBuf {
        self.path().join("data").join("items.json")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("appmenu").unwrap();
        cmd.env("APPMENU_DATA_DIR", self.path().join("data"))
            .env("APPMENU_CONFIG", self.config_path())
            .env_remove("APPMENU_NO_SEED")
            .env_remove("RUST_LOG")
            .arg("--quiet");
        cmd
    }

    /// Run with seeding off and return stdout
    fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().arg("--no-seed").args(args).assert().success();
        String::from_utf8(output.get_output().stdout.clone()).unwrap()
    }

    fn make_bundle(&self, name: &str) -> PathBuf {
        let bundle = self.path().join("Apps").join(name);
        fs::create_dir_all(bundle.join("Contents")).unwrap();
        bundle
    }
}

/// The short id printed between brackets
fn printed_id(stdout: &str) -> String {
    let start = stdout.find('[').unwrap() + 1;
    let end = stdout[start..].find(']').unwrap() + start;
    stdout[start..end].to_string()
}

// === Help Tests ===

#[test]
fn test_add_app_help() {
    let mut cmd = Command::cargo_bin("appmenu").unwrap();
    cmd.arg("add-app").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Path to the application bundle"));
}

#[test]
fn test_move_help() {
    let mut cmd = Command::cargo_bin("appmenu").unwrap();
    cmd.arg("move").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Destination folder"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = Command::cargo_bin("appmenu").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("appmenu"));
}

// === Config Tests ===

#[test]
fn test_config_path_honors_env() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["config", "init"]).assert().success();
    assert!(sandbox.config_path().exists());

    sandbox
        .cmd()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    sandbox.cmd().args(["config", "init", "--force"]).assert().success();
}

// === Store Tests ===

#[test]
fn test_fresh_store_lists_sample_folders() {
    let sandbox = Sandbox::new();
    let stdout = sandbox.run(&["list"]);
    assert!(stdout.contains("Browsers/"));
    assert!(stdout.contains("Editors/"));
}

#[test]
fn test_build_move_and_persist() {
    let sandbox = Sandbox::new();
    let safari = sandbox.make_bundle("Safari.app");

    let browsers = printed_id(&sandbox.run(&["add-folder", "Web"]));
    let tools = printed_id(&sandbox.run(&["add-folder", "Tools"]));
    sandbox.run(&["add-app", safari.to_str().unwrap(), "--parent", &browsers]);

    let listing = sandbox.run(&["list"]);
    assert!(listing.contains("Web/"));
    assert!(listing.contains("  Safari  ["));

    sandbox.run(&["move", &browsers, "--parent", &tools]);
    let listing = sandbox.run(&["list"]);
    assert!(listing.contains("  Web/"));
    assert!(listing.contains("    Safari  ["));

    // Tools now contains Web, so moving Tools under Web must be refused
    sandbox
        .cmd()
        .args(["--no-seed", "move", &tools, "--parent", &browsers])
        .assert()
        .failure()
        .stderr(predicate::str::contains("into itself"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(sandbox.items_path()).unwrap()).unwrap();
    let roots = stored.as_array().unwrap();
    assert_eq!(roots.last().unwrap()["folder"]["name"], "Tools");
    assert_eq!(
        roots.last().unwrap()["folder"]["children"][0]["folder"]["children"][0]["app"]["name"],
        "Safari"
    );
}

#[test]
fn test_rename_and_delete() {
    let sandbox = Sandbox::new();
    let id = printed_id(&sandbox.run(&["add-folder", "Temp"]));

    sandbox.run(&["rename", &id, "Scratch"]);
    assert!(sandbox.run(&["list"]).contains("Scratch/"));

    sandbox.run(&["delete", &id]);
    assert!(!sandbox.run(&["list"]).contains("Scratch/"));

    sandbox
        .cmd()
        .args(["--no-seed", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No item matches"));
}

#[test]
fn test_list_json_is_the_stored_shape() {
    let sandbox = Sandbox::new();
    let stdout = sandbox.run(&["list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value[0]["type"], "folder");
    assert_eq!(value[0]["folder"]["name"], "Browsers");
}

#[test]
fn test_first_run_seeds_from_configured_roots() {
    let sandbox = Sandbox::new();
    sandbox.make_bundle("Zed.app");
    sandbox.make_bundle("Alacritty.app");
    fs::write(
        sandbox.config_path(),
        format!(
            "[scan]\nroots = [{:?}]\n",
            sandbox.path().join("Apps").display().to_string()
        ),
    )
    .unwrap();

    let output = sandbox.cmd().arg("list").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("Applications/"));
    assert!(lines[1].starts_with("  Alacritty"));
    assert!(lines[2].starts_with("  Zed"));

    // A second run must not seed again
    sandbox.make_bundle("Helix.app");
    let output = sandbox.cmd().arg("list").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains("Helix"));
    assert_eq!(stdout.matches("Applications/").count(), 1);
}

#[test]
fn test_import_dry_run_then_import() {
    let sandbox = Sandbox::new();
    sandbox.make_bundle("Zed.app");
    fs::write(
        sandbox.config_path(),
        format!(
            "[scan]\nroots = [{:?}]\nseed_on_first_run = false\n",
            sandbox.path().join("Apps").display().to_string()
        ),
    )
    .unwrap();

    let preview = sandbox.run(&["import", "--dry-run"]);
    assert!(preview.contains("1 application(s) would be imported"));
    assert!(!sandbox.run(&["list"]).contains("Zed"));

    assert!(sandbox.run(&["import"]).contains("Imported 1 application(s)"));
    assert!(sandbox.run(&["import"]).contains("Imported 0 application(s)"));
    assert!(sandbox.run(&["list"]).contains("Zed"));
}

#[test]
fn test_import_subset_by_filter_and_name() {
    let sandbox = Sandbox::new();
    sandbox.make_bundle("Zed.app");
    sandbox.make_bundle("Alacritty.app");
    sandbox.make_bundle("Safari.app");
    fs::write(
        sandbox.config_path(),
        format!(
            "[scan]\nroots = [{:?}]\nseed_on_first_run = false\n",
            sandbox.path().join("Apps").display().to_string()
        ),
    )
    .unwrap();

    let preview = sandbox.run(&["import", "--dry-run", "--only", "zed", "--only", "Safari"]);
    assert!(preview.contains("2 application(s) would be imported"));
    assert!(!preview.contains("Alacritty"));

    assert!(sandbox
        .run(&["import", "--filter", "ALACR"])
        .contains("Imported 1 application(s)"));
    let listing = sandbox.run(&["list"]);
    assert!(listing.contains("Alacritty"));
    assert!(!listing.contains("Zed"));

    assert!(sandbox
        .run(&["import", "--filter", "nothing-like-this"])
        .contains("No applications match the selection"));
}

#[test]
fn test_menu_surfaces() {
    let sandbox = Sandbox::new();
    let status = sandbox.run(&["menu"]);
    assert!(status.contains("Browsers >"));
    assert!(status.contains("Quit  (Cmd-q)"));

    let dock = sandbox.run(&["menu", "--surface", "dock"]);
    assert!(dock.contains("Open Settings…"));
    assert!(!dock.contains("Quit"));
}
