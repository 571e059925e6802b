//! Integration tests for the non-interactive command line (--output, --search)

use std::path::Path;
use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sheetsync"))
        // Keep a user's ~/.config/sheetsync/config.toml out of the picture.
        .args(["--config", "/nonexistent/sheetsync.toml"])
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write_csv(dir: &Path) -> String {
    let path = dir.join("fruit.csv");
    std::fs::write(&path, "name,qty\napple,3\npear,apple\n").unwrap();
    path.display().to_string()
}

#[test]
fn test_help() {
    let (_, stderr, code) = run_command(&["--help"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Usage: sheetsync"));
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run_command(&["--bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown option: --bogus"));
}

#[test]
fn test_missing_option_value() {
    let (_, stderr, code) = run_command(&["fruit.csv", "--output"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--output requires a file path"));
}

#[test]
fn test_convert_csv_to_xlsx_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path());
    let xlsx = dir.path().join("fruit.xlsx");
    let xlsx_arg = xlsx.display().to_string();

    let (stdout, _, code) = run_command(&[&input, "-o", &xlsx_arg]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Saved to"));
    assert!(xlsx.exists());

    let back = dir.path().join("again.csv");
    let back_arg = back.display().to_string();
    let (_, _, code) = run_command(&[&xlsx_arg, "--output", &back_arg]);
    assert_eq!(code, 0);
    assert_eq!(
        std::fs::read_to_string(&back).unwrap(),
        "name,qty\napple,3\npear,apple\n"
    );
}

#[test]
fn test_search_prints_positions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path());

    let (stdout, _, code) = run_command(&[&input, "-s", "APPLE"]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["Sheet1!A2\tapple", "Sheet1!B3\tapple"]);

    let (stdout, _, code) = run_command(&[&input, "--search", "app", "--all-sheets"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv").display().to_string();
    let (_, stderr, code) = run_command(&[&missing, "-s", "x"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot open"));
}

#[test]
fn test_output_without_file() {
    let (_, stderr, code) = run_command(&["-o", "out.xlsx"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("need a FILE"));
}
