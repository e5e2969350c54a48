use std::fs;
use std::path::{Path, PathBuf};

use rulecheck::cmd::validate::{ValidateCommandArgs, run};
use serde_json::{Value, json};
use tempfile::tempdir;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn array_field_violations_count_whole_records() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(
        dir.path(),
        "data.json",
        &json!([
            {"id": 1, "tags": ["a", "b", "c"]},
            {"id": 2, "tags": ["a"]},
            {"id": 3, "tags": ["c"]}
        ])
        .to_string(),
    );
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{
            "name": "tags_allowed",
            "check_spec": {
                "check_type": "value-in-set",
                "parameters": {"column": "tags", "value_set": ["a", "c"]}
            }
        }])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    assert_eq!(response.exit_code, 2);
    let result = &response.payload["results"][0];
    assert_eq!(result["total_records"], json!(3));
    assert_eq!(result["failed_records"], json!(1));
    let sample = result["failed_records_sample"]
        .as_array()
        .expect("failure sample");
    assert_eq!(sample.len(), 1);
    assert_eq!(sample[0]["id"], json!(1));
    assert_eq!(sample[0]["tags"], json!(["a", "b", "c"]));
}

#[test]
fn partial_element_failures_never_multiply_record_counts() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(
        dir.path(),
        "data.json",
        &json!([
            {"id": 1, "scores": [1, 200, 300, 400, 500]},
            {"id": 2, "scores": [5, 6, 7]},
            {"id": 3, "scores": []}
        ])
        .to_string(),
    );
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{
            "name": "score_range",
            "check_spec": {
                "check_type": "value-between",
                "parameters": {"column": "scores", "min": 0, "max": 100}
            }
        }])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    let result = &response.payload["results"][0];
    assert_eq!(result["total_records"], json!(3));
    // four bad elements in record 1, but only one failed record
    assert_eq!(result["failed_records"], json!(1));
}

#[test]
fn dotted_paths_reach_nested_fields() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(
        dir.path(),
        "data.json",
        &json!([
            {"user": {"email": "a@example.com"}},
            {"user": {"email": null}}
        ])
        .to_string(),
    );
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{
            "name": "email_present",
            "check_spec": {"check_type": "not-null", "parameters": {"column": "user.email"}}
        }])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    let result = &response.payload["results"][0];
    assert_eq!(result["failed_records"], json!(1));
    let sample = result["failed_records_sample"]
        .as_array()
        .expect("failure sample");
    assert_eq!(sample[0]["user"]["email"], Value::Null);
}

#[test]
fn scalar_json_columns_behave_like_tabular_rows() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(
        dir.path(),
        "data.json",
        &json!([{"qty": 5}, {"qty": 60}, {"qty": 7}]).to_string(),
    );
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{
            "name": "qty_range",
            "check_spec": {
                "check_type": "value-between",
                "parameters": {"column": "qty", "min": 0, "max": 10}
            }
        }])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    let result = &response.payload["results"][0];
    assert_eq!(result["total_records"], json!(3));
    assert_eq!(result["failed_records"], json!(1));
    let sample = result["failed_records_sample"]
        .as_array()
        .expect("failure sample");
    assert_eq!(sample[0]["qty"], json!(60));
}
