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

fn ten_row_price_csv() -> String {
    let mut out = String::from("id,price\n");
    for id in 0..10 {
        if id < 2 {
            out.push_str(&format!("{id},\n"));
        } else {
            out.push_str(&format!("{id},{}\n", id * 10));
        }
    }
    out
}

#[test]
fn null_violations_report_per_record_counts() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", &ten_row_price_csv());
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{
            "name": "price_not_null",
            "check_spec": {"check_type": "not-null", "parameters": {"column": "price"}}
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
    assert_eq!(result["total_records"], json!(10));
    assert_eq!(result["failed_records"], json!(2));
    assert_eq!(result["success_rate"], json!(80.0));
    assert_eq!(result["passed"], json!(false));
}

#[test]
fn satisfied_bounds_pass_without_error_message() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "qty\n1\n2\n3\n4\n5\n");
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([{
            "name": "qty_range",
            "check_spec": {
                "check_type": "value-between",
                "parameters": {"column": "qty", "min": 0, "max": 100}
            }
        }])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    assert_eq!(response.exit_code, 0);
    let result = &response.payload["results"][0];
    assert_eq!(result["failed_records"], json!(0));
    assert_eq!(result["success_rate"], json!(100.0));
    assert_eq!(result["passed"], json!(true));
    assert_eq!(result["error_message"], Value::Null);
}

#[test]
fn missing_column_surfaces_available_columns_without_aborting() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,2\n");
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([
            {
                "name": "ghost",
                "check_spec": {"check_type": "not-null", "parameters": {"column": "nonexistent"}}
            },
            {
                "name": "qty_present",
                "check_spec": {"check_type": "not-null", "parameters": {"column": "qty"}}
            }
        ])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    assert_eq!(response.exit_code, 2);
    assert_eq!(response.payload["summary"]["status"], json!("Imperfect"));
    let ghost = &response.payload["results"][0];
    assert_eq!(ghost["passed"], json!(false));
    let message = ghost["error_message"].as_str().expect("message");
    assert!(message.contains("not found"));
    assert!(message.contains("qty"));
    assert_eq!(response.payload["results"][1]["passed"], json!(true));
}

#[test]
fn repeated_runs_are_idempotent() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", &ten_row_price_csv());
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([
            {
                "name": "price_not_null",
                "check_spec": {"check_type": "not-null", "parameters": {"column": "price"}}
            },
            {
                "name": "id_unique",
                "check_spec": {"check_type": "unique", "parameters": {"column": "id"}}
            }
        ])
        .to_string(),
    );
    let args = ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    };

    let first = run(&args);
    let second = run(&args);
    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(first.payload["results"], second.payload["results"]);
    assert_eq!(first.payload["summary"], second.payload["summary"]);
}

#[test]
fn every_result_satisfies_rate_and_pass_invariants() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", &ten_row_price_csv());
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([
            {
                "name": "price_not_null",
                "check_spec": {"check_type": "not-null", "parameters": {"column": "price"}}
            },
            {
                "name": "price_mean",
                "check_spec": {
                    "check_type": "mean-between",
                    "parameters": {"column": "price", "min": 1000}
                }
            },
            {
                "name": "shape",
                "check_spec": {"check_type": "column-count-equals", "parameters": {"value": 2}}
            },
            {
                "name": "bogus",
                "check_spec": {"check_type": "expect_magic", "parameters": {}}
            }
        ])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });
    let results = response.payload["results"].as_array().expect("results");
    assert_eq!(results.len(), 4);
    for result in results {
        let total = result["total_records"].as_u64().expect("total") as f64;
        let failed = result["failed_records"].as_u64().expect("failed") as f64;
        let rate = result["success_rate"].as_f64().expect("rate");
        let expected = if total > 0.0 {
            100.0 * (total - failed) / total
        } else {
            0.0
        };
        assert!((rate - expected).abs() < 1e-9, "rate invariant violated");
        let passed = result["passed"].as_bool().expect("passed");
        assert_eq!(passed, failed == 0.0 && total > 0.0, "pass invariant violated");
    }
}
