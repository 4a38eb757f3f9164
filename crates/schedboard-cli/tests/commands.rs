//! End-to-end tests for the schedboard binary
//!
//! Each test writes its fixtures into a fresh temp directory and runs the
//! binary from there, so no stray `schedboard.toml` is picked up.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// A depends on an external milestone, B on A, C stands alone
const THREE_TASKS: &str = "\
Name,Start,End,Duration,Predecessors,PercentComplete
A,01/01/24,10/01/24,10 dias,0,0
B,05/01/24,08/01/24,3 dias,1,0
C,20/01/24,25/01/24,5 dias,,0
";

fn schedboard_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_schedboard"))
}

fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(schedboard_binary())
        .current_dir(dir)
        .env_remove("SCHEDBOARD_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute schedboard")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// check
// =============================================================================

#[test]
fn check_valid_schedule_exits_0() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);

    let output = run(dir.path(), &["check", "plan.csv"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("3 task(s) from 3 row(s), 0 warning(s)"));
}

#[test]
fn check_missing_columns_exits_1_with_e001() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", "Name,Duration\nA,3\n");

    let output = run(dir.path(), &["check", "plan.csv"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error[E001]: missing required column(s): Start, End"), "{err}");
}

#[test]
fn check_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["check", "nope.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to load nope.csv"));
}

#[test]
fn warnings_only_fail_in_strict_mode() {
    let dir = TempDir::new().unwrap();
    fixture(
        &dir,
        "plan.csv",
        "Name,Start,End,Duration\nA,a definir,10/01/24,5\nB,01/01/24,05/01/24,5\n",
    );

    let relaxed = run(dir.path(), &["check", "plan.csv"]);
    assert_eq!(relaxed.status.code(), Some(0));
    assert!(stderr(&relaxed).contains("warning[W001]"));

    let strict = run(dir.path(), &["--strict", "check", "plan.csv"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stderr(&strict).contains("error[W001]"));
}

#[test]
fn quiet_hides_warnings_but_keeps_exit_code() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", "Name,Start,End,Duration\nA,10/01/24,01/01/24,3\n");

    let quiet = run(dir.path(), &["--quiet", "check", "plan.csv"]);
    assert_eq!(quiet.status.code(), Some(0));
    assert!(!stderr(&quiet).contains("W002"));

    let strict_quiet = run(dir.path(), &["--quiet", "--strict", "check", "plan.csv"]);
    assert_eq!(strict_quiet.status.code(), Some(1));
    assert!(stderr(&strict_quiet).contains("error[W002]"));
}

// =============================================================================
// summary
// =============================================================================

#[test]
fn summary_text_for_three_task_scenario() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);

    let output = run(dir.path(), &["summary", "plan.csv", "--today", "2024-01-12"]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("Status date: 2024-01-12"), "{out}");
    assert!(out.contains("Tasks:            3"));
    assert!(out.contains("Overdue:          2"));
    assert!(out.contains("24 days (2024-01-01 to 2024-01-25)"));
    assert!(out.contains("13 days remaining"));
    // Empty views are reported as info, not failures
    assert!(stderr(&output).contains("info[I001]: view 'Long Duration' has no tasks"));
}

#[test]
fn summary_json_carries_views_and_indicators() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);

    let output = run(
        dir.path(),
        &["summary", "plan.csv", "--today", "2024-01-12", "--format", "json"],
    );

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &json["report"];
    assert_eq!(report["indicators"]["overdue_count"], 2);
    assert_eq!(report["indicators"]["project_span_days"], 24);

    let views = report["views"].as_array().unwrap();
    let names: Vec<&str> = views.iter().map(|v| v["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "All Tasks",
            "Overdue",
            "Without Predecessors",
            "Long Duration",
            "Next 7 Days",
            "Next 15 Days",
        ]
    );
    let without: Vec<&str> = views[2]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(without, vec!["C"]);
    assert!(json["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["severity"] == "info"));
}

#[test]
fn flags_override_view_options() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);

    let output = run(
        dir.path(),
        &[
            "summary",
            "plan.csv",
            "--today",
            "2024-01-12",
            "--long-duration",
            "5",
            "--window",
            "30",
        ],
    );

    let out = stdout(&output);
    assert!(out.contains("Next 30 Days"), "{out}");
    assert!(!out.contains("Next 7 Days"));
    // A (10 days) is now long
    assert!(out.contains("Long Duration              1"));
}

#[test]
fn config_file_sets_title_and_columns() {
    let dir = TempDir::new().unwrap();
    fixture(
        &dir,
        "plan.csv",
        "Nome,Início,Término,Duração\nEscavação,01/01/24,10/01/24,10 dias\n",
    );
    let config = fixture(
        &dir,
        "custom.toml",
        r#"
[loader.columns]
name = "Nome"
start = "Início"
end = "Término"
duration = "Duração"

[report]
title = "Obra Norte"
"#,
    );

    let output = run(
        dir.path(),
        &[
            "-c",
            config.to_str().unwrap(),
            "summary",
            "plan.csv",
            "--today",
            "2024-01-12",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("Obra Norte\n"), "{out}");
    assert!(out.contains("Tasks:            1"));
}

#[test]
fn config_in_working_directory_is_discovered() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);
    fixture(&dir, "schedboard.toml", "[report]\ntitle = \"Found\"\n");

    let output = run(dir.path(), &["summary", "plan.csv", "--today", "2024-01-12"]);

    assert!(stdout(&output).starts_with("Found\n"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);
    let config = fixture(&dir, "bad.toml", "[views]\nupcoming_windows = \"soon\"\n");

    let output = run(
        dir.path(),
        &["--config", config.to_str().unwrap(), "check", "plan.csv"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid config"));
}

// =============================================================================
// export
// =============================================================================

#[test]
fn export_writes_every_requested_artifact() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);

    let output = run(
        dir.path(),
        &[
            "export",
            "plan.csv",
            "--today",
            "2024-01-12",
            "--xlsx",
            "dash.xlsx",
            "--pdf",
            "dash.pdf",
            "--svg",
            "curve.svg",
            "--title",
            "Site works",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let xlsx = std::fs::read(dir.path().join("dash.xlsx")).unwrap();
    let pdf = std::fs::read(dir.path().join("dash.pdf")).unwrap();
    let svg = std::fs::read_to_string(dir.path().join("curve.svg")).unwrap();

    assert!(xlsx.starts_with(b"PK"));
    assert!(pdf.starts_with(b"%PDF"));
    assert!(svg.contains("Site works"));
    assert!(stdout(&output).contains("wrote dash.xlsx"));
}

#[test]
fn export_without_targets_is_an_error() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);

    let output = run(dir.path(), &["export", "plan.csv"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nothing to export"));
}

#[test]
fn bad_report_date_format_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", THREE_TASKS);
    fixture(&dir, "schedboard.toml", "[report]\npdf_date_format = \"%Q\"\n");

    let output = run(dir.path(), &["export", "plan.csv", "--pdf", "out.pdf"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid date format '%Q'"), "{}", stderr(&output));
    assert!(!dir.path().join("out.pdf").exists());
}

#[test]
fn export_skips_writing_on_schema_error() {
    let dir = TempDir::new().unwrap();
    fixture(&dir, "plan.csv", "Name\nA\n");

    let output = run(dir.path(), &["export", "plan.csv", "--pdf", "out.pdf"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("out.pdf").exists());
}
