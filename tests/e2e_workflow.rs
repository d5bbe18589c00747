//! End-to-end tests for the `vocab` binary.
//!
//! Each test runs in its own temp directory with `HOME` pointed at it, so no
//! user config leaks in.

mod common;

use common::cli::Workspace;
use predicates::prelude::*;
use std::fs;

#[test]
fn commands_fail_before_init() {
    let ws = Workspace::new();
    ws.vocab()
        .arg("due")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("vocab init"));
}

#[test]
fn init_twice_requires_force() {
    let ws = Workspace::initialized();
    assert!(ws.path().join(".vocab").join("vocab.db").exists());
    assert!(ws.path().join(".vocab").join("config.yaml").exists());

    ws.vocab().arg("init").assert().code(4);
    ws.vocab()
        .args(["init", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Re-initialized"));
}

#[test]
fn add_due_review_cycle() {
    let ws = Workspace::initialized();

    ws.vocab()
        .args(["add", "serendipity", "--definition", "a happy accident"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added #1 serendipity (word)"));
    let added = ws.json(&["add", "kick the bucket"]);
    assert_eq!(added["id"], 2);
    assert_eq!(added["kind"], "phrase");

    let due = ws.json(&["due"]);
    let items = due["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["content"], "serendipity");
    assert_eq!(items[0]["status"], "learning");

    // Selecting did not record anything.
    let again = ws.json(&["due"]);
    assert_eq!(again["items"][0]["review_count"], 0);

    let review = ws.json(&["review", "1", "1", "77"]);
    assert_eq!(review["requested"], 3);
    assert_eq!(review["updated"], 1);

    let due = ws.json(&["due"]);
    assert_eq!(due["items"][0]["content"], "kick the bucket");
    assert_eq!(due["items"][1]["review_count"], 1);
}

#[test]
fn due_mark_reviewed_records_batch() {
    let ws = Workspace::initialized();
    for word in ["alpha", "beta", "gamma"] {
        ws.vocab().args(["add", word]).assert().success();
    }

    let due = ws.json(&["due", "--limit", "2", "--mark-reviewed"]);
    assert_eq!(due["items"].as_array().unwrap().len(), 2);
    assert_eq!(due["marked_reviewed"], 2);

    let gamma = ws.json(&["show", "3"]);
    assert_eq!(gamma["review_count"], 0);
    let alpha = ws.json(&["show", "1"]);
    assert_eq!(alpha["review_count"], 1);
    assert_eq!(alpha["events"].as_array().unwrap().len(), 2);
}

#[test]
fn reviews_promote_status() {
    let ws = Workspace::initialized();
    ws.vocab().args(["add", "persevere"]).assert().success();

    for _ in 0..3 {
        ws.vocab().args(["review", "1"]).assert().success();
    }
    assert_eq!(ws.json(&["show", "1"])["status"], "reviewing");

    for _ in 0..4 {
        ws.vocab().args(["review", "1"]).assert().success();
    }
    assert_eq!(ws.json(&["show", "1"])["status"], "mastered");

    let stats = ws.json(&["stats"]);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["by_status"][2]["status"], "mastered");
    assert_eq!(stats["by_status"][2]["count"], 1);
}

#[test]
fn archive_sweeps_idle_mastered_items() {
    let ws = Workspace::initialized();
    ws.vocab().args(["add", "stale"]).assert().success();
    for day in 1..=7 {
        ws.vocab()
            .args(["review", "1", "--date", &format!("2020-01-0{day}")])
            .assert()
            .success();
    }
    ws.vocab().args(["add", "fresh"]).assert().success();

    let outcome = ws.json(&["archive"]);
    assert_eq!(outcome["archived"], 1);
    assert_eq!(outcome["days_threshold"], 30);
    assert_eq!(ws.json(&["archive"])["archived"], 0);

    let due = ws.json(&["due"]);
    let contents: Vec<&str> = due["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["fresh"]);

    let all = ws.json(&["list", "--all"]);
    assert_eq!(all.as_array().unwrap().len(), 2);
    let archived = ws.json(&["list", "--archived"]);
    assert_eq!(archived[0]["content"], "stale");
}

#[test]
fn duplicate_add_needs_force() {
    let ws = Workspace::initialized();
    ws.vocab().args(["add", "Gossamer"]).assert().success();
    ws.vocab()
        .args(["add", "gossamer"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists as #1"));
    ws.vocab()
        .args(["add", "gossamer", "--force"])
        .assert()
        .success();
}

#[test]
fn blank_content_is_a_validation_error() {
    let ws = Workspace::initialized();
    let output = ws
        .vocab()
        .args(["add", "   ", "--json"])
        .output()
        .expect("run vocab");
    assert_eq!(output.status.code(), Some(2));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["error"]["code"], "validation");
}

#[test]
fn show_unknown_id_is_not_found() {
    let ws = Workspace::initialized();
    ws.vocab()
        .args(["show", "42"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Item not found: 42"));
}

#[test]
fn config_set_changes_batch_size() {
    let ws = Workspace::initialized();
    for i in 0..5 {
        ws.vocab().args(["add", &format!("word{i}")]).assert().success();
    }

    ws.vocab()
        .args(["config", "set", "items_per_review", "3"])
        .assert()
        .success();
    assert_eq!(ws.json(&["config", "get", "items-per-review"])["value"], "3");
    assert_eq!(ws.json(&["due"])["items"].as_array().unwrap().len(), 3);

    // Project YAML outranks the DB layer.
    fs::write(
        ws.path().join(".vocab").join("config.yaml"),
        "items-per-review: 4\n",
    )
    .unwrap();
    assert_eq!(ws.json(&["due"])["items"].as_array().unwrap().len(), 4);

    // Environment outranks both.
    let output = ws
        .vocab()
        .env("VOCAB_ITEMS_PER_REVIEW", "1")
        .args(["due", "--json"])
        .output()
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    ws.vocab()
        .args(["config", "set", "items-per-review", "many"])
        .assert()
        .code(2);
}

#[test]
fn export_and_import_between_workspaces() {
    let source = Workspace::initialized();
    source
        .vocab()
        .args(["add", "ubiquitous", "--synonym", "everywhere"])
        .assert()
        .success();
    source.vocab().args(["add", "ephemeral"]).assert().success();
    source.vocab().args(["review", "1"]).assert().success();

    let export_path = source.path().join("backup.jsonl");
    let exported = source.json(&["export", export_path.to_str().unwrap()]);
    assert_eq!(exported["exported"], 2);
    let text = fs::read_to_string(&export_path).unwrap();
    assert_eq!(text.lines().count(), 2);

    let target = Workspace::initialized();
    target.vocab().args(["add", "EPHEMERAL"]).assert().success();
    let result = target.json(&[
        "import",
        export_path.to_str().unwrap(),
        "--preserve-progress",
    ]);
    assert_eq!(result["imported"], 1);
    assert_eq!(result["skipped_duplicates"], 1);

    let listed = target.json(&["list"]);
    let ubiquitous = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["content"] == "ubiquitous")
        .unwrap();
    assert_eq!(ubiquitous["review_count"], 1);
    assert_eq!(ubiquitous["synonyms"][0], "everywhere");
}

#[test]
fn db_flag_works_without_workspace() {
    let ws = Workspace::new();
    let db = ws.path().join("custom.db");
    let db_arg = db.to_str().unwrap();

    ws.vocab()
        .args(["--db", db_arg, "add", "standalone"])
        .assert()
        .success();
    assert!(db.exists());
    let listed = ws.json(&["--db", db_arg, "list"]);
    assert_eq!(listed[0]["content"], "standalone");
}
