use std::fs;
use std::path::{Path, PathBuf};

use rulecheck::cmd::validate::{ValidateCommandArgs, run};
use rulecheck::domain::report::ValidationResponse;
use rulecheck::engine::clean::{clean_result, json_safe_f64};
use serde_json::{Map, Value, json};
use tempfile::tempdir;

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn full_report_survives_json_round_trip() {
    let dir = tempdir().expect("temp dir");
    let data = write_file(dir.path(), "data.csv", "id,qty\n1,5\n2,60\n");
    let rules = write_file(
        dir.path(),
        "rules.json",
        &json!([
            {
                "name": "qty_range",
                "check_spec": {
                    "check_type": "value-between",
                    "parameters": {"column": "qty", "min": 0, "max": 10}
                }
            },
            {
                "name": "id_unique",
                "check_spec": {"check_type": "unique", "parameters": {"column": "id"}}
            }
        ])
        .to_string(),
    );

    let response = run(&ValidateCommandArgs {
        input: data,
        rules,
        emit_notification: false,
    });

    let decoded: ValidationResponse =
        serde_json::from_value(response.payload.clone()).expect("decode report");
    let re_encoded = serde_json::to_value(&decoded).expect("re-encode report");
    assert_eq!(re_encoded, response.payload);
    assert_eq!(decoded.summary.total_rules, 2);
    assert_eq!(decoded.results.len(), 2);
}

#[test]
fn nan_sample_values_serialize_as_null() {
    let mut sample_record = Map::new();
    sample_record.insert("price".to_string(), json_safe_f64(f64::NAN));
    sample_record.insert("ratio".to_string(), json_safe_f64(0.5));
    let result = rulecheck::domain::report::RuleResult {
        rule_name: "price_not_null".to_string(),
        natural_language_rule: String::new(),
        passed: false,
        check_type: "not-null".to_string(),
        parameters: Map::new(),
        columns: vec!["price".to_string()],
        total_records: 4,
        failed_records: 1,
        success_rate: 75.0,
        error_message: Some("Validation failed: 1 of 4 records failed not-null".to_string()),
        failed_records_sample: Some(vec![sample_record]),
    };

    let cleaned = clean_result(result);
    let encoded = serde_json::to_value(&cleaned).expect("serialize result");
    assert_eq!(encoded["failed_records_sample"][0]["price"], Value::Null);
    assert_eq!(encoded["failed_records_sample"][0]["ratio"], json!(0.5));

    let text = serde_json::to_string(&cleaned).expect("encode result");
    let decoded: rulecheck::domain::report::RuleResult =
        serde_json::from_str(&text).expect("decode result");
    assert_eq!(decoded.total_records, 4);
    assert_eq!(decoded.failed_records, 1);
    assert_eq!(decoded.success_rate, 75.0);
}
