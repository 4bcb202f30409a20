//! End-to-end tests for the `qb` binary. Offline only: the remote points at
//! a closed local port.

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const CLOSED_REMOTE: &str = "http://127.0.0.1:9";

fn qb(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qb").unwrap();
    cmd.env("QB_DATA_DIR", data_dir.path())
        .env("QB_REMOTE_URL", CLOSED_REMOTE)
        .env("QB_SESSION_KEY", "cli-test")
        .env_remove("QB_DB")
        .env_remove("QB_SYNC_INTERVAL")
        .env_remove("RUST_LOG");
    cmd
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn count(data_dir: &TempDir) -> u64 {
    json_of(qb(data_dir).arg("list"))["count"].as_u64().unwrap()
}

#[test]
fn test_fresh_library_has_seed_quotes() {
    let dir = TempDir::new().unwrap();

    let listed = json_of(qb(&dir).arg("list"));
    assert_eq!(listed["count"], 3);
    assert_eq!(listed["selection"], "all");

    let categories = json_of(qb(&dir).arg("categories"));
    assert_eq!(
        categories["categories"],
        serde_json::json!(["Life", "Motivation", "Success"])
    );
}

#[test]
fn test_add_survives_unreachable_remote() {
    let dir = TempDir::new().unwrap();

    let added = json_of(qb(&dir).args(["add", "  Keep going ", "Grit"]));
    assert_eq!(added["quote"]["text"], "Keep going");
    assert_eq!(added["posted"], false);

    assert_eq!(count(&dir), 4);
}

#[test]
fn test_add_rejects_empty_text() {
    let dir = TempDir::new().unwrap();

    qb(&dir)
        .args(["add", "   ", "Grit", "--no-post", "--json"])
        .assert()
        .code(4);

    assert_eq!(count(&dir), 3);
}

#[test]
fn test_filter_persists_and_falls_back() {
    let dir = TempDir::new().unwrap();

    let set = json_of(qb(&dir).args(["filter", "Motivation"]));
    assert_eq!(set["selection"], "Motivation");
    assert_eq!(set["fell_back"], false);
    assert_eq!(count(&dir), 1);

    let unknown = json_of(qb(&dir).args(["filter", "Nope"]));
    assert_eq!(unknown["selection"], "all");
    assert_eq!(unknown["fell_back"], true);
    assert_eq!(count(&dir), 3);
}

#[test]
fn test_export_then_import_appends() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("out").join("quotes.json");

    qb(&dir)
        .args(["export", "--output"])
        .arg(&file)
        .assert()
        .success();
    let document: Value = serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
    assert_eq!(document["format"], "quotebook");
    assert_eq!(document["count"], 3);

    let imported = json_of(qb(&dir).arg("import").arg(&file));
    assert_eq!(imported["added"], 3);
    assert_eq!(imported["hash_mismatch"], false);

    assert_eq!(count(&dir), 6);
}

#[test]
fn test_import_skips_invalid_records() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("in.json");
    std::fs::write(
        &file,
        r#"[{"text":"","category":"X"},{"text":"Valid","category":"Y"}]"#,
    )
    .unwrap();

    let imported = json_of(qb(&dir).arg("import").arg(&file));
    assert_eq!(imported["added"], 1);
    assert_eq!(imported["skipped"], 1);
    assert_eq!(count(&dir), 4);
}

#[test]
fn test_import_garbage_fails_with_parse_code() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("junk.txt");
    std::fs::write(&file, "this is not json").unwrap();

    qb(&dir).arg("import").arg(&file).arg("--json").assert().code(8);
    assert_eq!(count(&dir), 3);
}

#[test]
fn test_show_then_last() {
    let dir = TempDir::new().unwrap();

    let shown = json_of(qb(&dir).arg("show"));
    let last = json_of(qb(&dir).arg("last"));

    assert_eq!(last["quote"], shown["quote"]);
}

#[test]
fn test_sync_with_unreachable_remote_keeps_local() {
    let dir = TempDir::new().unwrap();
    qb(&dir)
        .args(["add", "Local only", "Mine", "--no-post", "--json"])
        .assert()
        .success();

    let output = qb(&dir).args(["sync", "--json"]).assert().code(6).get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["outcome"], "failed");

    assert_eq!(count(&dir), 4);
}

#[test]
fn test_config_set_and_show() {
    let dir = TempDir::new().unwrap();

    qb(&dir)
        .args(["config", "set", "--sync-interval", "45", "--json"])
        .assert()
        .success();

    let shown = json_of(qb(&dir).args(["config", "show"]));
    assert_eq!(shown["sync_interval_secs"], 45);
    assert_eq!(shown["remote_url"], CLOSED_REMOTE);

    qb(&dir).args(["config", "set", "--json"]).assert().code(4);
}

#[test]
fn test_version_json() {
    let dir = TempDir::new().unwrap();
    let version = json_of(qb(&dir).arg("version"));
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(version["formats"]["export"], "quotebook/v1");
}
