use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::tempdir;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn qty_rules() -> String {
    json!([{
        "name": "qty_range",
        "natural_language_rule": "qty must be between 0 and 10",
        "check_spec": {
            "check_type": "value-between",
            "parameters": {"column": "qty", "min": 0, "max": 10}
        },
        "type": "range"
    }])
    .to_string()
}

fn parse_stderr_json_lines(stderr: &[u8]) -> Vec<Value> {
    let text = String::from_utf8(stderr.to_vec()).expect("stderr utf8");
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stderr json line"))
        .collect()
}

#[test]
fn passing_run_exits_zero_with_report_on_stdout() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,5\n2,6\n");
    let rules = write_file(dir.path(), "rules.json", &qty_rules());

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["summary"]["status"], json!("Passed"));
    assert_eq!(payload["summary"]["total_rules"], json!(1));
    assert_eq!(payload["dataset"], json!("data.csv"));
    assert_eq!(payload["results"][0]["passed"], json!(true));
}

#[test]
fn violations_exit_two_with_failure_sample() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,5\n2,60\n3,70\n");
    let rules = write_file(dir.path(), "rules.json", &qty_rules());

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(2));
    let payload: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(payload["summary"]["status"], json!("Failed"));
    let result = &payload["results"][0];
    assert_eq!(result["failed_records"], json!(2));
    assert_eq!(result["total_records"], json!(3));
    let sample = result["failed_records_sample"]
        .as_array()
        .expect("failure sample");
    assert_eq!(sample.len(), 2);
    assert_eq!(sample[0]["qty"], json!(60));
}

#[test]
fn unsupported_dataset_extension_exits_three() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.parquet", "ignored");
    let rules = write_file(dir.path(), "rules.json", &qty_rules());

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let errors = parse_stderr_json_lines(&output.stderr);
    assert_eq!(errors[0]["error"], json!("input_usage_error"));
}

#[test]
fn malformed_rules_document_exits_three() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id\n1\n");
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{"name": "no_spec"}]).to_string(),
    );

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(3));
    let errors = parse_stderr_json_lines(&output.stderr);
    let message = errors[0]["message"].as_str().expect("message");
    assert!(message.contains("invalid rules document"));
}

#[test]
fn yaml_rules_documents_are_accepted() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,5\n");
    let rules = write_file(
        dir.path(),
        "rules.yaml",
        concat!(
            "rules:\n",
            "  - name: qty_range\n",
            "    check_spec:\n",
            "      check_type: value-between\n",
            "      parameters:\n",
            "        column: qty\n",
            "        min: 0\n",
            "        max: 10\n",
        ),
    );

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn emit_notification_writes_payload_to_stderr() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,60\n");
    let rules = write_file(dir.path(), "rules.json", &qty_rules());

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
            "--emit-notification",
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(2));
    let lines = parse_stderr_json_lines(&output.stderr);
    let notification = lines
        .iter()
        .find(|line| line.get("status").is_some())
        .expect("notification line");
    assert_eq!(notification["status"], json!("VALIDATION FAILED"));
}

#[test]
fn emit_pipeline_writes_diagnostics_to_stderr() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,5\n");
    let rules = write_file(dir.path(), "rules.json", &qty_rules());

    let output = assert_cmd::cargo::cargo_bin_cmd!("rulecheck")
        .args([
            "validate",
            "--emit-pipeline",
            "--input",
            data.to_str().expect("utf8 data path"),
            "--rules",
            rules.to_str().expect("utf8 rules path"),
        ])
        .output()
        .expect("run validate");

    assert_eq!(output.status.code(), Some(0));
    let lines = parse_stderr_json_lines(&output.stderr);
    let pipeline = lines
        .iter()
        .find(|line| line.get("pipeline").is_some())
        .expect("pipeline line");
    assert_eq!(pipeline["pipeline"]["command"], json!("validate"));
    assert_eq!(
        pipeline["pipeline"]["input"]["sources"][0]["format"],
        json!("csv")
    );
}
