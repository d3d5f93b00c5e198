use assert_cmd::Command;
use predicates::prelude::*;

const NOW: &str = "2026-02-18T14:30:45Z";

fn granular() -> Command {
    let mut cmd = Command::cargo_bin("granular").unwrap();
    cmd.args(["--now", NOW]);
    cmd
}

fn json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_limit_drops_time() {
    granular()
        .args(["limit", "Y-m-d H:i", "-g", "year,month,day"])
        .assert()
        .success()
        .stdout("Y-m-d\n");
}

#[test]
fn test_limit_rejects_unknown_element() {
    granular()
        .args(["limit", "Y-m-d", "-g", "year,fortnight"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fortnight"));
}

#[test]
fn test_parse_with_format() {
    let report = json(granular().args(["parse", "25/12/2024", "-f", "d/m/Y"]));
    assert_eq!(report["parts"]["year"], 2024);
    assert_eq!(report["parts"]["month"], 12);
    assert_eq!(report["parts"]["day"], 25);
    assert_eq!(report["iso"], "2024-12-25");
    assert_eq!(report["date_only"], true);
    assert_eq!(
        report["value"]["granularity"],
        serde_json::json!(["year", "month", "day"])
    );
}

#[test]
fn test_parse_failure_exits_nonzero() {
    granular()
        .args(["parse", "13/25/2024", "-f", "d/m/Y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("13/25/2024"));
}

#[test]
fn test_parse_parts_object() {
    let report = json(granular().args(["parse", r#"{"year": 2024}"#]));
    assert_eq!(report["iso"], "2024");
    assert_eq!(report["display"], "2024");
}

#[test]
fn test_parts_errors_reported() {
    let report = json(granular().args(["parse", r#"{"year": 2023, "month": 2, "day": 30}"#]));
    assert_eq!(report["errors"]["day"], "The day is invalid.");
}

#[test]
fn test_format_limited_to_granularity() {
    granular()
        .args(["format", "2024-05-01", "-f", "Y-m-d", "-p", "Y-m-d H:i"])
        .assert()
        .success()
        .stdout("2024-05-01\n");
}

#[test]
fn test_format_forced() {
    granular()
        .args(["format", "2024-05-01", "-f", "Y-m-d", "-p", "Y-m-d H:i", "--force"])
        .assert()
        .success()
        .stdout("2024-05-01 00:00\n");
}

#[test]
fn test_diff_months() {
    let report = json(granular().args([
        "diff", "2023-01-01", "2024-03-01", "-u", "months", "-f", "Y-m-d",
    ]));
    assert_eq!(report["unit"], "months");
    assert_eq!(report["difference"], 14.0);
}

#[test]
fn test_diff_unknown_unit() {
    granular()
        .args(["diff", "2023-01-01", "2024-03-01", "-u", "fortnights", "-f", "Y-m-d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unrecognized unit"));
}

#[test]
fn test_merge_date_with_time() {
    let report = json(granular().args([
        "merge",
        "2024-05-01",
        "09:30",
        "--format-a",
        "Y-m-d",
        "--format-b",
        "H:i",
    ]));
    assert_eq!(report["display"], "2024-05-01 09:30");
}

#[test]
fn test_fuzzy_first() {
    let report = json(granular().args(["fuzzy", "2023-02", "-f", "Y-m", "-m", "first"]));
    assert_eq!(report["display"], "2023-02-01 00:00:00");
}

#[test]
fn test_fuzzy_rejects_unknown_mode() {
    granular()
        .args(["fuzzy", "2023-02", "-f", "Y-m", "-m", "sometime"])
        .assert()
        .failure();
}
