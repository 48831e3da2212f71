//! Integration tests for the prio CLI.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_prio(args: &[&str], dir: &Path) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_prio"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute prio");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let status = output.status.code().unwrap_or(1);

    (stdout, stderr, status)
}

fn add(args: &[&str], dir: &Path) -> i64 {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    let (stdout, stderr, status) = run_prio(&full, dir);
    assert_eq!(status, 0, "add failed: {stderr}");
    stdout.trim().parse().expect("add should print the new id")
}

#[test]
fn test_add_creates_store_file() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id = add(&["Task A"], dir);
    assert_eq!(id, 1);
    assert!(dir.join("tasks.json").exists());
}

#[test]
fn test_dependency_orders_before_score() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id_a = add(&["Task A", "--urgency", "5"], dir);
    let id_b = add(&["Task B", "--urgency", "9", "--dep", &id_a.to_string()], dir);

    let (stdout, _, status) = run_prio(&["list"], dir);
    assert_eq!(status, 0);

    // B scores higher but depends on A: A must print first.
    let pos_a = stdout.find("Task A").unwrap();
    let pos_b = stdout.find("Task B").unwrap();
    assert!(pos_a < pos_b, "expected A before B in:\n{stdout}");
    assert!(stdout.contains(&format!("deps: #{id_a}")));
    let _ = id_b;
}

#[test]
fn test_done_excludes_from_default_list() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id_a = add(&["Task A"], dir);
    add(&["Task B"], dir);

    let (_stdout, _stderr, status) = run_prio(&["done", &id_a.to_string()], dir);
    assert_eq!(status, 0);

    let (stdout, _, _) = run_prio(&["list"], dir);
    assert!(!stdout.contains("Task A"));
    assert!(stdout.contains("Task B"));

    let (stdout, _, _) = run_prio(&["list", "--all"], dir);
    assert!(stdout.contains("Task A"));
    assert!(stdout.contains("✓"));
}

#[test]
fn test_cycle_rejected_and_store_untouched() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id_a = add(&["Task A"], dir);
    let id_b = add(&["Task B", "--dep", &id_a.to_string()], dir);

    let before = fs::read_to_string(dir.join("tasks.json")).unwrap();

    let (_stdout, stderr, status) =
        run_prio(&["depend", &id_a.to_string(), &id_b.to_string()], dir);
    assert_ne!(status, 0);
    assert!(stderr.contains("cycle"), "stderr: {stderr}");

    let after = fs::read_to_string(dir.join("tasks.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_delete_cascades_dependencies() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id_a = add(&["Task A"], dir);
    let id_b = add(&["Task B", "--dep", &id_a.to_string()], dir);

    let (_stdout, _stderr, status) = run_prio(&["delete", &id_a.to_string()], dir);
    assert_eq!(status, 0);

    let (stdout, _, status) = run_prio(&["show", &id_b.to_string()], dir);
    assert_eq!(status, 0);
    assert!(!stdout.contains("deps:"), "dangling dependency in:\n{stdout}");
}

#[test]
fn test_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let (_stdout, stderr, status) = run_prio(&["done", "42"], dir);
    assert_ne!(status, 0);
    assert!(stderr.contains("#42"));
}

#[test]
fn test_edit_and_filters() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id = add(&["Task A"], dir);
    let (_stdout, _stderr, status) = run_prio(
        &["edit", &id.to_string(), "--deadline", "2020-01-01", "--urgency", "9"],
        dir,
    );
    assert_eq!(status, 0);

    // Deadline in the past: shows up in --overdue and scores the penalty.
    let (stdout, _, _) = run_prio(&["list", "--overdue"], dir);
    assert!(stdout.contains("Task A"));

    let (stdout, _, _) = run_prio(&["list", "--high"], dir);
    assert!(stdout.contains("Task A"));

    let (_stdout, _stderr, status) = run_prio(&["edit", &id.to_string(), "--no-deadline"], dir);
    assert_eq!(status, 0);
    let (stdout, _, _) = run_prio(&["list", "--overdue"], dir);
    assert!(!stdout.contains("Task A"));
}

#[test]
fn test_edit_description_set_and_clear() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id = add(&["Task A"], dir);
    let id_str = id.to_string();

    let (_stdout, _stderr, status) = run_prio(&["edit", &id_str, "--desc", "call vendor"], dir);
    assert_eq!(status, 0);
    let (stdout, _, _) = run_prio(&["show", &id_str], dir);
    assert!(stdout.contains("desc:     call vendor"), "show: {stdout}");

    let (_stdout, _stderr, status) = run_prio(&["edit", &id_str, "--no-desc"], dir);
    assert_eq!(status, 0);
    let (stdout, _, _) = run_prio(&["show", &id_str], dir);
    assert!(!stdout.contains("desc:"), "description not cleared: {stdout}");

    // The two flags contradict each other and must be rejected.
    let (_stdout, _stderr, status) =
        run_prio(&["edit", &id_str, "--desc", "x", "--no-desc"], dir);
    assert_ne!(status, 0);
}

#[test]
fn test_export_csv() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let id_a = add(&["Task A"], dir);
    add(&["Task B", "--dep", &id_a.to_string()], dir);

    let (_stdout, _stderr, status) = run_prio(&["export", "out.csv"], dir);
    assert_eq!(status, 0);

    let csv = fs::read_to_string(dir.join("out.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,title,deadline,urgency,dependencies,score,completed"
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_invalid_deadline_rejected() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let (_stdout, stderr, status) = run_prio(&["add", "Task A", "--deadline", "soon"], dir);
    assert_ne!(status, 0);
    assert!(stderr.contains("Invalid deadline"));
    assert!(!dir.join("tasks.json").exists());
}

#[test]
fn test_custom_store_file_flag() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();

    let (stdout, stderr, status) = run_prio(&["add", "Task A", "--file", "other.json"], dir);
    assert_eq!(status, 0, "add failed: {stderr}");
    assert_eq!(stdout.trim(), "1");
    assert!(dir.join("other.json").exists());
    assert!(!dir.join("tasks.json").exists());

    let (stdout, _, _) = run_prio(&["list", "--file", "other.json"], dir);
    assert!(stdout.contains("Task A"));
}
