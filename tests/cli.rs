mod common;

use std::fs;

use predicates::prelude::*;
use serde_json::Value;

use common::{CLEAN_ORDERS, MESSY_ORDERS, TestWorkspace, csv_tidy};

const CLEANED_MESSY_ORDERS: &str = "\
Order_Num,Customer_Name,Revenue_Dol,Discount_pct,Order_Date,Notes
1001,Ann Lee,1000,0.1,2024-01-15,first
1002,Bob Stone,2500.50,0.25,2024-02-20,
1003,Cy Young,,0.05,2024-03-10,rush
";

#[test]
fn clean_directory_uses_default_output_and_log_dirs() {
    let ws = TestWorkspace::new();
    ws.write("in/orders.csv", MESSY_ORDERS);
    ws.write("in/readme.txt", "not a csv");

    csv_tidy()
        .args(["clean", "-i"])
        .arg(ws.join("in"))
        .assert()
        .success();

    assert_eq!(ws.read("in/cleaned_csvs/orders.csv"), CLEANED_MESSY_ORDERS);
    assert!(!ws.join("in/cleaned_csvs/readme.txt").exists());

    let log = ws.only_log("in/logs");
    assert!(log.contains("Found 1 CSV file(s) to clean"));
    assert!(log.contains("File: orders.csv"));
    assert!(log.contains("Original dimensions: 3 rows × 6 columns"));
    assert!(log.contains("=== DATA AUDIT ==="));
    assert!(log.contains("column 'Revenue_Dol' null_count changed from 0 to 1"));
    assert!(log.contains("Status: SUCCESS"));
    assert!(log.contains("Processing completed at"));
}

#[test]
fn json_report_describes_profiles_and_audit() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", MESSY_ORDERS);
    let report = ws.join("report.json");

    csv_tidy()
        .args(["clean", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(ws.join("out"))
        .arg("--log-dir")
        .arg(ws.join("logs"))
        .arg("--report-json")
        .arg(&report)
        .assert()
        .success();

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&report).expect("read report"))
        .expect("parse report");
    let file = &parsed["files"][0];
    assert_eq!(file["status"], "success");
    assert_eq!(file["fingerprint"].as_str().map(str::len), Some(64));
    let kinds: Vec<&str> = file["profiles"]
        .as_array()
        .expect("profiles")
        .iter()
        .map(|p| p["kind"].as_str().expect("kind"))
        .collect();
    assert_eq!(
        kinds,
        vec!["numeric", "text", "currency", "percentage", "date", "text"]
    );
    assert_eq!(file["profiles"][4]["date_pattern"], "MM/DD/YYYY");
    assert_eq!(file["audit"]["row_count_match"], true);
    assert!(ws.join("out/orders.csv").exists());
}

#[test]
fn undecodable_file_fails_without_stopping_the_run() {
    let ws = TestWorkspace::new();
    ws.write("in/good.csv", CLEAN_ORDERS);
    fs::write(ws.join("in/bad.csv"), b"name\ncaf\xe9\n").expect("write bad file");

    csv_tidy()
        .args(["clean", "-i"])
        .arg(ws.join("in"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 file(s) failed to clean"));

    assert_eq!(ws.read("in/cleaned_csvs/good.csv"), CLEAN_ORDERS);
    assert!(!ws.join("in/cleaned_csvs/bad.csv").exists());
    let log = ws.only_log("in/logs");
    assert!(log.contains("File: bad.csv"));
    assert!(log.contains("Status: FAILED"));
    assert!(log.contains("File: good.csv"));
}

#[test]
fn clean_refuses_to_overwrite_its_input() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", MESSY_ORDERS);

    csv_tidy()
        .args(["clean", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to clean"));

    assert_eq!(ws.read("orders.csv"), MESSY_ORDERS);
    assert!(ws.only_log("logs").contains("refusing to overwrite input"));
}

#[test]
fn profile_prints_inferred_kinds() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", MESSY_ORDERS);

    csv_tidy()
        .args(["profile", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Revenue_Dol"))
        .stdout(predicate::str::contains("currency"))
        .stdout(predicate::str::contains("MM/DD/YYYY"));
}

#[test]
fn audit_passes_for_an_untouched_clean_file() {
    let ws = TestWorkspace::new();
    let original = ws.write("orders.csv", CLEAN_ORDERS);

    csv_tidy()
        .arg("audit")
        .arg("--original")
        .arg(&original)
        .arg("--cleaned")
        .arg(&original)
        .assert()
        .success()
        .stdout(predicate::str::contains("[PASS] Audit PASSED"));
}

#[test]
fn audit_reports_a_dropped_row_as_structural() {
    let ws = TestWorkspace::new();
    let original = ws.write("orders.csv", CLEAN_ORDERS);
    let truncated = ws.write(
        "truncated.csv",
        "id,customer,amount,ordered_on\n1,Ann,10.50,2024-01-15\n",
    );

    csv_tidy()
        .arg("audit")
        .arg("--original")
        .arg(&original)
        .arg("--cleaned")
        .arg(&truncated)
        .assert()
        .failure()
        .stderr(predicate::str::contains("row_count"));
}

#[test]
fn audit_fails_on_value_level_mismatches() {
    let ws = TestWorkspace::new();
    let original = ws.write("orders.csv", MESSY_ORDERS);
    let cleaned = ws.write("cleaned.csv", CLEANED_MESSY_ORDERS);

    csv_tidy()
        .arg("audit")
        .arg("--original")
        .arg(&original)
        .arg("--cleaned")
        .arg(&cleaned)
        .assert()
        .failure()
        .stdout(predicate::str::contains("null_count"))
        .stdout(predicate::str::contains("[FAIL] Audit FAILED"))
        .stderr(predicate::str::contains("mismatch(es)"));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders.csv", CLEAN_ORDERS);
    let config = ws.write("tidy.yaml", "marker_threshold: 0.5\nbogus: 1\n");

    csv_tidy()
        .args(["profile", "-i"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parsing config YAML"));
}
