//! CLI contract tests
//!
//! Drives the built binary against a fake `gocyclo` shell script so the
//! command surface (avg, details, watch, init, doctor) is checked end to end
//! without a Go toolchain.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::{Command, Stdio};

fn cyclolens_bin() -> String {
    env!("CARGO_BIN_EXE_cyclolens").to_string()
}

/// Workspace with one Go file, one text file and a fake analyzer that
/// records every invocation in `calls.log`.
fn setup_workspace() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not go\n").unwrap();

    let tools = dir.path().join("tools");
    std::fs::create_dir(&tools).unwrap();
    let script = tools.join("gocyclo");
    std::fs::write(
        &script,
        format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
if [ "$1" = "-avg" ]; then
  echo '{{"average": 4.5}}'
else
  echo '[{{"PkgName":"main","FuncName":"Run","Complexity":12,"MaintainabilityIndex":55}},{{"PkgName":"main","FuncName":"main","Complexity":1,"MaintainabilityIndex":90}}]'
fi
"#,
            log = dir.path().join("calls.log").display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    (dir, script)
}

fn run(args: &[&str], analyzer: &Path) -> (i32, String, String) {
    let output = Command::new(cyclolens_bin())
        .args(args)
        .arg("--no-emoji")
        .arg("--analyzer")
        .arg(analyzer)
        .env_remove("CYCLOLENS_ANALYZER")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run cyclolens");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

// ============================================================================
// avg
// ============================================================================

#[test]
fn test_avg_for_go_file() {
    let (dir, analyzer) = setup_workspace();
    let file = dir.path().join("main.go");
    let (code, stdout, _) = run(&["avg", file.to_str().unwrap()], &analyzer);

    assert_eq!(code, 0);
    assert!(
        stdout.contains("Average Cyclomatic: 4.5 (GOOD)"),
        "unexpected stdout: {}",
        stdout
    );
    let calls = calls(dir.path());
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("-avg "));
    assert!(calls[0].ends_with("main.go"));
}

#[test]
fn test_avg_for_workspace() {
    let (dir, analyzer) = setup_workspace();
    let (code, stdout, _) = run(&["avg", dir.path().to_str().unwrap()], &analyzer);

    assert_eq!(code, 0);
    assert!(stdout.contains("4.5"));
    assert_eq!(calls(dir.path()).len(), 1);
}

#[test]
fn test_avg_skips_non_go_file() {
    let (dir, analyzer) = setup_workspace();
    let file = dir.path().join("notes.txt");
    let (code, stdout, _) = run(&["avg", file.to_str().unwrap()], &analyzer);

    assert_eq!(code, 0);
    assert!(stdout.trim().is_empty(), "unexpected stdout: {}", stdout);
    assert!(calls(dir.path()).is_empty());
}

#[test]
fn test_avg_missing_analyzer_stays_hidden() {
    let (dir, _) = setup_workspace();
    let missing = dir.path().join("nowhere").join("gocyclo");
    let (code, stdout, _) = run(&["avg", dir.path().to_str().unwrap()], &missing);

    assert_eq!(code, 0);
    assert!(!stdout.contains("Average"));
}

// ============================================================================
// details
// ============================================================================

#[test]
fn test_details_text_report() {
    let (dir, analyzer) = setup_workspace();
    let (code, stdout, _) = run(&["details", dir.path().to_str().unwrap()], &analyzer);

    assert_eq!(code, 0);
    assert!(stdout.contains("Average Cyclomatic Complexity: 4.5"));
    assert!(stdout.contains("Cyclomatic Complexity Thresholds:"));
    assert!(stdout.contains("Maintainability Index Thresholds:"));
    assert!(stdout.contains("Function Level Analysis"));
    assert!(stdout.contains("COMPLEX"));

    // Records keep the analyzer's order
    let run_pos = stdout.find("Run").unwrap();
    let main_pos = stdout.rfind("| main ").or_else(|| stdout.rfind("main")).unwrap();
    assert!(run_pos < main_pos);

    let calls = calls(dir.path());
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().any(|c| c.starts_with("-avg ")));
    assert!(calls
        .iter()
        .any(|c| c.starts_with("-top 10000 -ignore _test.go ")));
}

#[test]
fn test_run_alias_json_report() {
    let (dir, analyzer) = setup_workspace();
    let (code, stdout, _) = run(
        &["run", dir.path().to_str().unwrap(), "--format", "json"],
        &analyzer,
    );

    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(value["average"], "4.5");
    let functions = value["functions"].as_array().unwrap();
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0]["FuncName"], "Run");
    assert_eq!(functions[0]["Remark"], "COMPLEX");
}

#[test]
fn test_details_remark_scale_from_config() {
    let (dir, analyzer) = setup_workspace();
    std::fs::write(
        dir.path().join("cyclolens.toml"),
        "[report]\nremark_scale = \"cyclomatic\"\nformat = \"json\"\n",
    )
    .unwrap();
    let (code, stdout, _) = run(&["details", dir.path().to_str().unwrap()], &analyzer);

    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(value["functions"][0]["Remark"], "MODERATE");
    assert_eq!(value["functions"][1]["Remark"], "GOOD");
}

#[test]
fn test_details_output_file() {
    let (dir, analyzer) = setup_workspace();
    let report = dir.path().join("report.txt");
    let (code, stdout, _) = run(
        &[
            "details",
            dir.path().to_str().unwrap(),
            "-o",
            report.to_str().unwrap(),
        ],
        &analyzer,
    );

    assert_eq!(code, 0);
    assert!(stdout.contains("Report written to"));
    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.contains("Function Level Analysis"));
}

#[test]
fn test_details_missing_analyzer_fails() {
    let (dir, _) = setup_workspace();
    let missing = dir.path().join("nowhere").join("gocyclo");
    let (code, _, stderr) = run(&["details", dir.path().to_str().unwrap()], &missing);

    assert_eq!(code, 1);
    assert!(stderr.contains("not found"), "unexpected stderr: {}", stderr);
}

// ============================================================================
// watch
// ============================================================================

/// Folder to watch, kept apart from `calls.log` so analyzer runs do not
/// show up as file changes.
fn watched_folder(dir: &Path) -> PathBuf {
    let ws = dir.join("ws");
    std::fs::create_dir(&ws).unwrap();
    std::fs::write(ws.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();
    std::fs::write(ws.join("util.go"), "package main\n").unwrap();
    ws.canonicalize().unwrap()
}

fn watch(ws: &Path, args: &[&str], analyzer: &Path, input: &str) -> (i32, String, String) {
    let mut child = Command::new(cyclolens_bin())
        .arg("watch")
        .arg(ws)
        .args(args)
        .arg("--no-emoji")
        .arg("--analyzer")
        .arg(analyzer)
        .env_remove("CYCLOLENS_ANALYZER")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run cyclolens");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_watch_details_reports_active_file_before_exit() {
    let (dir, analyzer) = setup_workspace();
    let ws = watched_folder(dir.path());
    let file = ws.join("main.go");
    let (code, stdout, stderr) = watch(
        &ws,
        &["--file", file.to_str().unwrap()],
        &analyzer,
        "details\nquit\n",
    );

    assert_eq!(code, 0, "stderr: {}", stderr);
    let report = stdout
        .find("Function Level Analysis")
        .unwrap_or_else(|| panic!("no report in stdout: {}", stdout));
    let stopped = stdout.find("Stopped watching.").unwrap();
    assert!(report < stopped);

    let calls = calls(dir.path());
    let full: Vec<_> = calls.iter().filter(|c| c.starts_with("-top ")).collect();
    assert_eq!(full.len(), 1, "calls: {:?}", calls);
    assert_eq!(*full[0], format!("-top 10000 -ignore _test.go {}", file.display()));
}

#[test]
fn test_watch_run_and_explicit_details_target() {
    let (dir, analyzer) = setup_workspace();
    let ws = watched_folder(dir.path());
    let (code, stdout, stderr) = watch(&ws, &[], &analyzer, "run\ndetails util.go\nq\n");

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("Function Level Analysis"));

    let calls = calls(dir.path());
    assert!(calls.contains(&format!("-top 10000 -ignore _test.go {}", ws.display())));
    assert!(calls.contains(&format!(
        "-top 10000 -ignore _test.go {}",
        ws.join("util.go").display()
    )));
}

#[test]
fn test_watch_missing_file_fails() {
    let (dir, analyzer) = setup_workspace();
    let ws = watched_folder(dir.path());
    let (code, _, stderr) = watch(&ws, &["--file", "nope.go"], &analyzer, "quit\n");

    assert_eq!(code, 1);
    assert!(stderr.contains("does not exist"), "unexpected stderr: {}", stderr);
    assert!(calls(dir.path()).is_empty());
}

// ============================================================================
// init / doctor
// ============================================================================

#[test]
fn test_init_writes_config_once() {
    let (dir, analyzer) = setup_workspace();
    let (code, stdout, _) = run(&["init", dir.path().to_str().unwrap()], &analyzer);
    assert_eq!(code, 0);
    assert!(stdout.contains("Created"));
    assert!(dir.path().join("cyclolens.toml").exists());

    let (code, stdout, _) = run(&["init", dir.path().to_str().unwrap()], &analyzer);
    assert_eq!(code, 0);
    assert!(stdout.contains("Already initialized"));
}

#[test]
fn test_doctor_reports_analyzer() {
    let (dir, analyzer) = setup_workspace();
    let (code, stdout, _) = run(&["doctor", dir.path().to_str().unwrap()], &analyzer);
    assert_eq!(code, 0);
    assert!(stdout.contains("Analyzer:"));
    assert!(stdout.contains("All checks passed"));

    let missing = dir.path().join("nowhere").join("gocyclo");
    let (code, stdout, _) = run(&["doctor", dir.path().to_str().unwrap()], &missing);
    assert_eq!(code, 1);
    assert!(stdout.contains("not found"));
}
