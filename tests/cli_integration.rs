//! CLI smoke tests: exit codes, human output, JSON output.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn run(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("cargo run")
}

fn write_fixture(dir: &TempDir, name: &str, source: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn clean_file_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "ok.rb", "def foo\n  1\nend\n");

    let output = run(&[&path]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no block syntax problems"));
}

#[test]
fn broken_file_exits_nonzero_and_names_the_line() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "broken.rb",
        "Foo.call\n  def foo\n    print \"lol\"\n   end\nend\n",
    );

    let output = run(&[&path]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("suspect"));
    assert!(stdout.contains('5'));
}

#[test]
fn json_output_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        &dir,
        "broken.rb",
        "Foo.call\n  def foo\n    print \"lol\"\n   end\nend\n",
    );

    let output = run(&["--json", &path]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let ranges = parsed.as_array().expect("array of ranges");
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0]["start"], 5);
    assert_eq!(ranges[0]["end"], 5);
}

#[test]
fn missing_file_reports_a_readable_error() {
    let output = run(&["/definitely/not/here.rb"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}
