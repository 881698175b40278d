use std::fs;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_options-demo"))
        .args(args)
        .env_remove("OPTIONS_DEMO_CONFIG")
        .output()
        .expect("failed to run options-demo")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// Verb dispatch
// ---------------------------------------------------------------------------

#[test]
fn add_prints_options_with_default_company() {
    let output = run(&["add", "Ann"]);
    assert_eq!(output.status.code(), Some(0));

    let text = stdout(&output);
    assert!(text.contains("Options [AddOptions]"));
    assert!(text.contains("Name = 'Ann'"));
    assert!(text.contains("Company = 'myCompany'"));
    assert!(text.contains("Quiet = 'false'"));
    assert!(text.contains("return = 0"));
}

#[test]
fn remove_accepts_named_options_and_switch() {
    let output = run(&["remove", "-name", "Bob", "-quiet"]);
    assert_eq!(output.status.code(), Some(0));

    let text = stdout(&output);
    assert!(text.contains("Options [RemoveOptions]"));
    assert!(text.contains("Name = 'Bob'"));
    assert!(text.contains("Quiet = 'true'"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unknown_verb_reports_error() {
    let output = run(&["rename", "Ann"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("verb 'rename' not defined"));
}

#[test]
fn missing_mandatory_reports_error() {
    let output = run(&["add", "-quiet"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("mandatory options: name"));
}

#[test]
fn no_arguments_reports_missing_verb() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("no verb given"));
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

#[test]
fn global_help_lists_verbs() {
    let output = run(&["-?"]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    assert!(text.starts_with("Club - "));
    assert!(text.contains("VERBS"));
    assert!(text.contains("add - Adds a person to the club"));
    assert!(text.contains("remove - Removes a person from the club"));
}

#[test]
fn verb_help_lists_options() {
    let output = run(&["add", "-help"]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    assert!(text.contains("options-demo add [-name] <string>"));
    assert!(text.contains("The company of a person."));
    assert!(text.contains("default: 'myCompany'"));
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

#[test]
fn config_file_changes_option_marker() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("demo.yaml");
    fs::write(
        &path,
        "option_char: \"/\"\nprogram:\n  title: Members\n  version: \"9.9\"\n  executable: members\n",
    )
    .expect("failed to write config");

    let output = Command::new(env!("CARGO_BIN_EXE_options-demo"))
        .args(["remove", "/name", "Cy"])
        .env("OPTIONS_DEMO_CONFIG", &path)
        .output()
        .expect("failed to run options-demo");
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Name = 'Cy'"));

    let output = Command::new(env!("CARGO_BIN_EXE_options-demo"))
        .args(["/?"])
        .env("OPTIONS_DEMO_CONFIG", &path)
        .output()
        .expect("failed to run options-demo");
    assert!(stdout(&output).starts_with("Members - 9.9"));
}

#[test]
fn invalid_config_file_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("demo.yaml");
    fs::write(&path, "option_char: \",\"\n").expect("failed to write config");

    let output = Command::new(env!("CARGO_BIN_EXE_options-demo"))
        .args(["add", "Ann"])
        .env("OPTIONS_DEMO_CONFIG", &path)
        .output()
        .expect("failed to run options-demo");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}
