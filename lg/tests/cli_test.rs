//! CLI tests for the lgf binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `lgf` running inside `dir`, isolated from any user config
fn lgf(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lgf").expect("Failed to find lgf binary");
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("HOME", dir)
        .env_remove("RUST_LOG");
    cmd
}

fn greet_dir() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path();
    fs::write(dir.join("Greet.lg"), "# Greeting\n- Hello {{name}}").unwrap();
    fs::write(dir.join("Greet.fr.lg"), "# Greeting\n- Salut {{name}}").unwrap();
    fs::write(dir.join("Greet.fr-fr.lg"), "# Greeting\n- Bonjour de France {{name}}").unwrap();
    temp_dir
}

#[test]
fn test_chain_prints_fallbacks() {
    let temp_dir = TempDir::new().unwrap();
    lgf(temp_dir.path())
        .args(["chain", "en-US"])
        .assert()
        .success()
        .stdout(predicate::str::contains("en-us -> en -> <neutral>"));
}

#[test]
fn test_group_lists_buckets() {
    let temp_dir = greet_dir();
    lgf(temp_dir.path())
        .arg("group")
        .assert()
        .success()
        .stdout(predicate::str::contains("fr-fr"))
        .stdout(predicate::str::contains("  Greet.fr.lg"))
        .stdout(predicate::str::contains("fr-be").not());
}

#[test]
fn test_resolve_with_available_list() {
    let temp_dir = TempDir::new().unwrap();
    lgf(temp_dir.path())
        .args(["resolve", "en-gb", "--available", "fr,en"])
        .assert()
        .success()
        .stdout("en\n");
}

#[test]
fn test_resolve_without_match_fails() {
    let temp_dir = TempDir::new().unwrap();
    lgf(temp_dir.path())
        .args(["resolve", "en-gb", "--available", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No locale fallback available"));
}

#[test]
fn test_render_with_base() {
    let temp_dir = greet_dir();
    lgf(temp_dir.path())
        .args(["render", "Greeting", "--locale", "fr-CA", "--base", "Greet.lg"])
        .args(["--data", r#"{"name": "Ada"}"#])
        .assert()
        .success()
        .stdout("Salut Ada\n");
}

#[test]
fn test_render_with_config_file() {
    let temp_dir = greet_dir();
    let dir = temp_dir.path();
    fs::write(dir.join("lgfallback.yml"), "strategy: entry\nentry: greet\n").unwrap();

    lgf(dir)
        .args(["render", "Greeting", "--locale", "fr-FR"])
        .assert()
        .success()
        .stdout("Bonjour de France \n");
}

#[test]
fn test_render_strict_unknown_template_fails() {
    let temp_dir = greet_dir();
    lgf(temp_dir.path())
        .args(["render", "Nope", "--base", "Greet.lg", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nope"));
}

#[test]
fn test_render_strict_keeps_lenient_variables() {
    let temp_dir = greet_dir();
    lgf(temp_dir.path())
        .args(["render", "Greeting", "--locale", "fr", "--base", "Greet.lg", "--strict"])
        .assert()
        .success()
        .stdout("Salut \n");
}

#[test]
fn test_render_strict_templates_rejects_missing_variables() {
    let temp_dir = greet_dir();
    lgf(temp_dir.path())
        .args(["render", "Greeting", "--locale", "fr", "--base", "Greet.lg"])
        .args(["--strict", "--strict-templates"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Greeting"));

    lgf(temp_dir.path())
        .args(["render", "Greeting", "--locale", "fr", "--base", "Greet.lg", "--strict-templates"])
        .assert()
        .success()
        .stdout("\n");
}

#[test]
fn test_render_without_base_or_entry_fails() {
    let temp_dir = greet_dir();
    lgf(temp_dir.path())
        .args(["render", "Greeting"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No base resource"));
}
