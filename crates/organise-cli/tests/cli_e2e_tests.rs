//! CLI end-to-end tests that invoke the compiled `organise` binary.
//!
//! These tests use `env!("CARGO_BIN_EXE_organise")` to locate the binary and
//! `std::process::Command` to run it against temporary runfolders.

use organise_test_utils::{RUNFOLDER_RULES, TestRunfolder};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to the compiled `organise` binary.
fn organise_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_organise"))
}

/// The sample rule document shipped with the workspace.
fn sample_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/organise_runfolder.yml")
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(organise_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("ORGANISE_CONFIG")
        .env_remove("ORGANISE_ROOT")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute organise binary")
}

/// `run <config> --var RUNFOLDERPATH=.. --var RUNFOLDER_NAME=..` plus `extra`.
fn organise(run_folder: &TestRunfolder, extra: &[&str]) -> Output {
    let config = run_folder.write_config("organise.yml", RUNFOLDER_RULES);
    let base = format!("RUNFOLDERPATH={}", run_folder.base().display());
    let name = format!("RUNFOLDER_NAME={}", run_folder.name());
    let config = config.to_string_lossy().to_string();

    let mut args = vec!["run", config.as_str(), "--var", base.as_str(), "--var", name.as_str()];
    args.extend_from_slice(extra);
    run(run_folder.base(), &args)
}

fn populated() -> TestRunfolder {
    let run_folder = TestRunfolder::new();
    run_folder.add_fastq("AB-1234", "AB-1234-14092", 35, 1, 1);
    run_folder.add_report("AB-1234");
    run_folder
}

#[test]
fn test_help_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_run_organises_runfolder() {
    let run_folder = populated();
    let out = organise(&run_folder, &[]);

    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 file(s) organised"), "stdout: {stdout}");
    run_folder.assert_symlink(&format!(
        "Projects/AB-1234/{}/Sample_AB-1234-14092/AB-1234-14092_S35_L001_R1_001.fastq.gz",
        run_folder.name()
    ));
}

#[test]
fn test_run_json_report() {
    let run_folder = populated();
    let out = organise(&run_folder, &["--json"]);

    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["rules"].as_array().unwrap().len(), 3);
    assert_eq!(report["rules"][0]["status"], "satisfied");
    assert_eq!(report["rules"][0]["outcomes"][0]["status"], "created");
    assert_eq!(report["rules"][0]["outcomes"][0]["action"], "symlink");
    assert_eq!(report["rules"][2]["status"], "no_matches");
}

#[test]
fn test_dry_run_changes_nothing() {
    let run_folder = populated();
    let out = organise(&run_folder, &["--dry-run", "--json"]);

    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["rules"][0]["outcomes"][0]["status"], "planned");
    run_folder.assert_missing("Projects");
}

#[test]
fn test_unsatisfied_required_rule_exits_non_zero() {
    let run_folder = TestRunfolder::new();
    run_folder.add_report("AB-1234");

    let out = organise(&run_folder, &[]);

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stdout.contains("UNSATISFIED"), "stdout: {stdout}");
    assert!(stderr.contains("1 required rule(s) unsatisfied"), "stderr: {stderr}");
}

#[test]
fn test_json_report_printed_on_failure() {
    let run_folder = TestRunfolder::new();
    let out = organise(&run_folder, &["--json"]);

    assert_eq!(out.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["success"], false);
    assert_eq!(report["rules"][0]["status"], "unsatisfied");
}

#[test]
fn test_relative_config_paths_resolve_against_root() {
    let run_folder = TestRunfolder::new();
    run_folder.add_file("reports/summary.txt", "summary");
    run_folder.write_config(
        "relative.yml",
        "files_to_organize:\n  - source: <RUNFOLDER_NAME>/reports/*\n    destination: <RUNFOLDER_NAME>/delivery/\n    options:\n      required: true\n",
    );
    let name = format!("RUNFOLDER_NAME={}", run_folder.name());
    let root = run_folder.base().to_string_lossy().to_string();
    let dir = tempfile::tempdir().unwrap();
    let config = run_folder.base().join("relative.yml");
    let config = config.to_string_lossy().to_string();

    let out = run(
        dir.path(),
        &["run", config.as_str(), "--root", root.as_str(), "--var", name.as_str()],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    run_folder.assert_copied("delivery/summary.txt", "summary");
}

#[test]
fn test_config_from_environment() {
    let run_folder = TestRunfolder::new();
    let out = Command::new(organise_bin())
        .args(["check", "--var", "RUNFOLDER_NAME=R1"])
        .env("ORGANISE_CONFIG", sample_config())
        .current_dir(run_folder.base())
        .output()
        .expect("failed to execute organise binary");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("4 rule(s) valid"));
}

#[test]
fn test_check_reports_undefined_variable() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_config();
    let out = run(dir.path(), &["check", config.to_str().unwrap()]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("<RUNFOLDER_NAME>"), "stderr: {stderr}");
}

#[test]
fn test_malformed_var_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_config();
    let out = run(dir.path(), &["check", config.to_str().unwrap(), "--var", "NOEQUALS"]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("KEY=VALUE"));
}
