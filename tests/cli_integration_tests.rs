//! CLI integration tests driving the compiled binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn jsonrule() -> Command {
    Command::cargo_bin("jsonrule").unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_check_valid_document_exits_zero() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"{"": ["object", {"aaa": "number"}]}"#);
    let doc = write_file(&dir, "doc.json", r#"{"aaa": 10}"#);

    jsonrule()
        .args(["check", &schema, &doc])
        .assert()
        .success()
        .stderr(predicate::str::contains("OK"));
}

#[test]
fn test_check_rejected_document_exits_one() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"{"": "string"}"#);
    let doc = write_file(&dir, "doc.json", "12.5");

    jsonrule()
        .args(["check", &schema, &doc])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("REJECTED"));
}

#[test]
fn test_check_json_format_reports_trail() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.json",
        r#"{"": ["object", {"aaa": "number", "bbb": "string"}]}"#,
    );
    let doc = write_file(&dir, "doc.json", r#"{"aaa": 10}"#);

    let output = jsonrule()
        .args(["check", &schema, &doc, "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["files_rejected"], 1);
    let rejection = &report["files"][0]["rejections"][0];
    assert_eq!(rejection["path"], serde_json::json!(["bbb"]));
    assert_eq!(rejection["rule"], "string");
    assert_eq!(rejection["location"], "/bbb");
}

#[test]
fn test_check_multiple_files() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"{"": "number"}"#);
    let good = write_file(&dir, "good.json", "1");
    let bad = write_file(&dir, "bad.json", r#""x""#);

    let output = jsonrule()
        .args(["check", &schema, &good, &bad, "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["files_checked"], 2);
    assert_eq!(report["files_rejected"], 1);
}

#[test]
fn test_check_reads_stdin_by_default() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"{"": ["array", "number"]}"#);

    jsonrule()
        .args(["check", &schema])
        .write_stdin("[1, 2, 3]")
        .assert()
        .success();
}

#[test]
fn test_check_named_rule_flag() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.json",
        r#"{"": "number", "side": ["array", "number"]}"#,
    );
    let doc = write_file(&dir, "doc.json", "[1, 2]");

    jsonrule()
        .args(["check", &schema, &doc, "--rule", "side"])
        .assert()
        .success();
}

#[test]
fn test_check_missing_schema_exits_two() {
    let dir = TempDir::new().unwrap();
    let doc = write_file(&dir, "doc.json", "1");

    jsonrule()
        .args(["check", "/nonexistent/schema.json", &doc])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_check_invalid_schema_exits_two() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"["not", "an", "object"]"#);
    let doc = write_file(&dir, "doc.json", "1");

    jsonrule()
        .args(["check", &schema, &doc])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_check_unparsable_document_exits_one() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"{"": "any"}"#);
    let doc = write_file(&dir, "doc.json", "{not json");

    jsonrule()
        .args(["check", &schema, &doc])
        .assert()
        .code(1);
}

#[test]
fn test_lint_well_formed_schema() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(
        &dir,
        "schema.json",
        r#"{"": ["string", ["array", "number"]]}"#,
    );

    jsonrule().args(["lint", &schema]).assert().success();
}

#[test]
fn test_lint_malformed_schema_exits_one() {
    let dir = TempDir::new().unwrap();
    let schema = write_file(&dir, "schema.json", r#"{"": ["max-size", "three"]}"#);

    jsonrule().args(["lint", &schema]).assert().code(1);
}

#[test]
fn test_grammar_prints_valid_json() {
    let output = jsonrule()
        .arg("grammar")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let grammar: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert!(grammar.get("").is_some());
    assert!(grammar.get("ruleline").is_some());
}

#[test]
fn test_grammar_output_lints_clean() {
    let dir = TempDir::new().unwrap();
    let output = jsonrule().arg("grammar").assert().success().get_output().stdout.clone();
    let schema = write_file(&dir, "grammar.json", std::str::from_utf8(&output).unwrap());

    jsonrule().args(["lint", &schema]).assert().success();
}
