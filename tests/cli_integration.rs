//! Integration tests for the `tb` CLI.
//!
//! Each test initializes a board in a temp directory, runs `tb` as a
//! subprocess, and checks stdout and/or the saved board.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `tb` binary.
fn tb_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tb");
    path
}

/// Run `tb` with the given args in the given directory, returning (stdout, stderr, success).
fn run_tb(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tb_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tb` expecting success, return stdout.
fn run_tb_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tb(dir, args);
    if !success {
        panic!("tb {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

fn run_tb_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.push("--json");
    let out = run_tb_ok(dir, &full);
    serde_json::from_str(&out).unwrap_or_else(|e| panic!("bad json from {:?}: {}\n{}", args, e, out))
}

fn init_board() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tb_ok(tmp.path(), &["init"]);
    tmp
}

/// Add a task and return its full id
fn add_task(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    let task = run_tb_json(dir, &full);
    task["id"].as_str().unwrap().to_string()
}

fn titles(list: &serde_json::Value) -> Vec<String> {
    list["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_config_and_board() {
    let tmp = init_board();
    assert!(tmp.path().join("taskboard.toml").exists());
    assert!(tmp.path().join("board.json").exists());

    let (_, stderr, success) = run_tb(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_commands_outside_board_fail() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_tb(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.starts_with("error: "));
    assert!(stderr.contains("tb init"));
}

#[test]
fn test_dir_flag_and_nested_discovery() {
    let tmp = init_board();
    let nested = tmp.path().join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();
    run_tb_ok(&nested, &["add", "From below"]);

    let other = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().to_str().unwrap();
    let out = run_tb_ok(other.path(), &["-C", dir, "list"]);
    assert!(out.contains("From below"));
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_list() {
    let tmp = init_board();
    add_task(tmp.path(), &["Write spec"]);
    add_task(tmp.path(), &["Review", "--status", "done", "-p", "high", "-t", "docs"]);

    let out = run_tb_ok(tmp.path(), &["list"]);
    assert!(out.contains("[ ]"));
    assert!(out.contains("Write spec"));
    assert!(out.contains("[x]"));
    assert!(out.contains("#docs"));

    let done = run_tb_json(tmp.path(), &["list", "--status", "done"]);
    assert_eq!(titles(&done), vec!["Review"]);
    assert_eq!(done["count"], 1);
}

#[test]
fn test_add_blank_title_fails() {
    let tmp = init_board();
    let (_, stderr, success) = run_tb(tmp.path(), &["add", "   "]);
    assert!(!success);
    assert!(stderr.contains("invalid title"));
}

#[test]
fn test_status_edit_and_show() {
    let tmp = init_board();
    let id = add_task(tmp.path(), &["Draft"]);
    let prefix = &id[..8];

    run_tb_ok(tmp.path(), &["status", prefix, "in progress"]);
    run_tb_ok(
        tmp.path(),
        &["edit", prefix, "--title", "Final draft", "--due", "2025-07-01", "-t", "a", "-t", "b"],
    );

    let task = run_tb_json(tmp.path(), &["show", prefix]);
    assert_eq!(task["title"], "Final draft");
    assert_eq!(task["status"], "in_progress");
    assert_eq!(task["due_date"], "2025-07-01");
    assert_eq!(task["tags"], serde_json::json!(["a", "b"]));

    let out = run_tb_ok(tmp.path(), &["show", prefix]);
    assert!(out.contains("status:   In Progress"));
}

#[test]
fn test_rm_twice_reports_not_found() {
    let tmp = init_board();
    let id = add_task(tmp.path(), &["Temp"]);
    run_tb_ok(tmp.path(), &["rm", &id]);
    let (_, stderr, success) = run_tb(tmp.path(), &["rm", &id]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_rm_blank_id_is_rejected() {
    let tmp = init_board();
    add_task(tmp.path(), &["Only task"]);
    let (_, stderr, success) = run_tb(tmp.path(), &["rm", ""]);
    assert!(!success);
    assert!(stderr.contains("must not be empty"));
    assert!(run_tb_ok(tmp.path(), &["list"]).contains("Only task"));
}

#[test]
fn test_archive_restore_and_purge() {
    let tmp = init_board();
    let keep = add_task(tmp.path(), &["Keep"]);
    let old = add_task(tmp.path(), &["Old"]);

    run_tb_ok(tmp.path(), &["archive", &old]);
    assert_eq!(titles(&run_tb_json(tmp.path(), &["list"])), vec!["Keep"]);
    assert_eq!(
        titles(&run_tb_json(tmp.path(), &["list", "--archived"])),
        vec!["Old"]
    );

    run_tb_ok(tmp.path(), &["restore", &old]);
    assert_eq!(
        titles(&run_tb_json(tmp.path(), &["list"])),
        vec!["Keep", "Old"]
    );

    run_tb_ok(tmp.path(), &["archive", &keep]);
    let purged = run_tb_json(tmp.path(), &["purge"]);
    assert_eq!(purged["removed"], 1);
    assert_eq!(titles(&run_tb_json(tmp.path(), &["list"])), vec!["Old"]);
}

#[test]
fn test_subtasks_comments_and_timer() {
    let tmp = init_board();
    let id = add_task(tmp.path(), &["Big job"]);

    let sub = run_tb_json(tmp.path(), &["sub", &id, "First step"]);
    let sub_id = sub["id"].as_str().unwrap().to_string();
    run_tb_ok(tmp.path(), &["sub", &id, &sub_id, "--toggle"]);
    run_tb_ok(tmp.path(), &["comment", &id, "Started on this"]);
    run_tb_ok(tmp.path(), &["timer", "start", &id]);

    let task = run_tb_json(tmp.path(), &["show", &id]);
    assert_eq!(task["subtasks"][0]["done"], true);
    assert_eq!(task["comments"][0]["text"], "Started on this");
    assert_eq!(task["time_tracking"]["is_running"], true);

    let (_, stderr, success) = run_tb(tmp.path(), &["timer", "start", &id]);
    assert!(!success);
    assert!(stderr.contains("already running"));

    let stopped = run_tb_json(tmp.path(), &["timer", "stop", &id]);
    assert_eq!(stopped["minutes"], 0);
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn test_list_sort_and_search() {
    let tmp = init_board();
    add_task(tmp.path(), &["fix login bug", "-p", "low"]);
    add_task(tmp.path(), &["Login page copy", "-p", "high"]);
    add_task(tmp.path(), &["Unrelated", "-p", "medium"]);

    let sorted = run_tb_json(tmp.path(), &["list", "--sort", "priority", "--desc"]);
    assert_eq!(
        titles(&sorted),
        vec!["Login page copy", "Unrelated", "fix login bug"]
    );

    let found = run_tb_json(tmp.path(), &["list", "-s", "LOGIN", "--sort", "title"]);
    assert_eq!(titles(&found), vec!["fix login bug", "Login page copy"]);
}

#[test]
fn test_board_columns() {
    let tmp = init_board();
    add_task(tmp.path(), &["A"]);
    add_task(tmp.path(), &["B", "--status", "in_progress"]);

    let out = run_tb_ok(tmp.path(), &["board"]);
    assert!(out.contains("To Do (1)"));
    assert!(out.contains("In Progress (1)"));
    assert!(out.contains("Done (0)"));

    let board = run_tb_json(tmp.path(), &["board"]);
    assert_eq!(board["columns"][1]["status"], "in_progress");
    assert_eq!(board["columns"][1]["tasks"][0]["title"], "B");
}

#[test]
fn test_stats_json() {
    let tmp = init_board();
    add_task(tmp.path(), &["A", "--project", "Acme"]);
    add_task(tmp.path(), &["B", "--status", "done", "--due", "2000-01-01"]);
    run_tb_ok(tmp.path(), &["project", "add", "Acme"]);

    let stats = run_tb_json(tmp.path(), &["stats"]);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["by_status"]["done"], 1);
    assert_eq!(stats["overdue"], 0);
    assert_eq!(stats["trend"].as_array().unwrap().len(), 7);
    assert_eq!(stats["by_project"][0]["name"], "Acme");
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[test]
fn test_project_add_conflict_and_list() {
    let tmp = init_board();
    run_tb_ok(tmp.path(), &["project", "add", "Acme", "--color", "#22c55e"]);

    let (_, stderr, success) = run_tb(tmp.path(), &["project", "add", "acme"]);
    assert!(!success);
    assert!(stderr.contains("conflict"));

    add_task(tmp.path(), &["Client call", "--project", "acme"]);
    let projects = run_tb_json(tmp.path(), &["project", "list"]);
    let projects = projects.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "Acme");
    assert_eq!(projects[0]["color"], "#22c55e");
    assert_eq!(projects[0]["task_count"], 1);
}

#[test]
fn test_project_archive_and_rm_keeps_tasks() {
    let tmp = init_board();
    run_tb_ok(tmp.path(), &["project", "add", "Acme"]);
    add_task(tmp.path(), &["Client call", "--project", "Acme"]);

    run_tb_ok(tmp.path(), &["project", "archive", "Acme"]);
    assert!(run_tb_json(tmp.path(), &["project", "list"]).as_array().unwrap().is_empty());
    assert_eq!(
        run_tb_json(tmp.path(), &["project", "list", "--all"]).as_array().unwrap().len(),
        1
    );

    run_tb_ok(tmp.path(), &["project", "rm", "Acme"]);
    let out = run_tb_ok(tmp.path(), &["list"]);
    assert!(out.contains("Client call"));
    assert!(out.contains("@Acme?"));
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[test]
fn test_export_import_round_trip() {
    let tmp = init_board();
    add_task(tmp.path(), &["Write spec", "-t", "docs", "-t", "q2", "--estimate", "90"]);
    add_task(tmp.path(), &["Review, then merge", "-d", "multi\nline"]);
    run_tb_ok(tmp.path(), &["export", "-o", "out.csv"]);
    let exported = fs::read_to_string(tmp.path().join("out.csv")).unwrap();
    assert!(exported.starts_with("id,title,description,status,project,priority"));

    let other = init_board();
    fs::copy(tmp.path().join("out.csv"), other.path().join("in.csv")).unwrap();
    let report = run_tb_json(other.path(), &["import", "in.csv"]);
    assert_eq!(report["kind"], "tasks");
    assert_eq!(report["imported"].as_array().unwrap().len(), 2);
    assert!(report["errors"].as_array().unwrap().is_empty());

    let again = run_tb_ok(other.path(), &["export"]);
    assert_eq!(again, exported);
}

#[test]
fn test_import_reports_bad_rows() {
    let tmp = init_board();
    fs::write(
        tmp.path().join("in.csv"),
        "title,status\nGood,todo\nBad,blocked\n,done\n",
    )
    .unwrap();
    let out = run_tb_ok(tmp.path(), &["import", "in.csv"]);
    assert!(out.contains("imported 1 tasks, skipped 2 rows"));
    assert!(out.contains("line 3:"));
    assert!(out.contains("line 4:"));
}

#[test]
fn test_import_unknown_header_fails() {
    let tmp = init_board();
    fs::write(tmp.path().join("in.csv"), "foo,bar\n1,2\n").unwrap();
    let (_, stderr, success) = run_tb(tmp.path(), &["import", "in.csv"]);
    assert!(!success);
    assert!(stderr.contains("unrecognized CSV header"));
}

#[test]
fn test_export_projects() {
    let tmp = init_board();
    run_tb_ok(tmp.path(), &["project", "add", "Acme", "-d", "Client work"]);
    let out = run_tb_ok(tmp.path(), &["export", "--projects"]);
    let mut lines = out.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,name,description,color,status,createdAt,updatedAt"
    );
    assert!(lines.next().unwrap().contains(",Acme,Client work,#6366f1,active,"));
}
