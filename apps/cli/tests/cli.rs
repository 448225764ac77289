use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn content_ev() -> Command {
    let mut cmd = Command::cargo_bin("content-ev").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn evaluate_reference_defaults() {
    content_ev()
        .arg("evaluate")
        .assert()
        .success()
        .stdout(predicate::str::contains("₹ -175.0 Cr"))
        .stdout(predicate::str::contains("₹ 49.5 Cr"))
        .stdout(predicate::str::contains("₹ 224.5 Cr"))
        .stdout(predicate::str::contains("70/30 Contract Impact"))
        .stdout(predicate::str::contains("+₹ 4.5 Cr"));
}

#[test]
fn evaluate_rejects_rates_over_one() {
    content_ev()
        .args(["evaluate", "--flop-rate", "0.7", "--hit-rate", "0.5"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("exceeds 100%"));
}

#[test]
fn evaluate_json_has_result_set() {
    let out = content_ev()
        .args(["--format", "json", "evaluate"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let steps = v["evaluation"]["value_bridge"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[3]["factor"], "contract_impact");
    assert_eq!(v["dashboard"]["waterfall"].as_array().unwrap().len(), 6);
    assert_eq!(v["scenario"], "reference");
}

#[test]
fn scenario_file_then_flags() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name: stress\nflop_rate: 0.5\nhit_rate: 0.2").unwrap();
    content_ev()
        .args(["evaluate", "--scenario"])
        .arg(file.path())
        .args(["--hit-rate", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario: stress"))
        .stdout(predicate::str::contains("flop: 50%"))
        .stdout(predicate::str::contains("hit: 10%"));
}

#[test]
fn missing_scenario_file_fails() {
    content_ev()
        .args(["evaluate", "--scenario", "/nonexistent/scenario.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load scenario"));
}

#[test]
fn sweep_marks_infeasible_cells() {
    content_ev()
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("infeasible"))
        .stdout(predicate::str::contains("cells: 66 | infeasible: 3"))
        .stdout(predicate::str::contains("break-even pilot cost: ₹ 18.0 Cr"));
}

#[test]
fn sweep_rejects_bad_axis() {
    content_ev()
        .args(["sweep", "--flop-step", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid axis"));
}

#[test]
fn evaluate_rejects_oversized_cost() {
    content_ev()
        .args(["evaluate", "--tv-cost", "10000000000000000000000000000"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("tv_cost must be at most"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn sweep_rejects_overly_fine_step() {
    content_ev()
        .args([
            "sweep",
            "--flop-start",
            "0.3",
            "--flop-end",
            "0.3",
            "--hit-step",
            "0.0000001",
        ])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds 1001 points"));
}

#[test]
fn sweep_rejects_rates_above_one() {
    content_ev()
        .args(["sweep", "--flop-end", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid axis"));
}

#[test]
fn shipped_high_risk_scenario() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scenarios/high-risk.yaml");
    content_ev()
        .args(["evaluate", "--scenario", path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario: high-risk"))
        .stdout(predicate::str::contains("shows: 10"))
        .stdout(predicate::str::contains("₹ -424.0 Cr"))
        .stdout(predicate::str::contains("₹ 28.3 Cr"))
        .stdout(predicate::str::contains("₹ 452.3 Cr"));
}

#[test]
fn shipped_reference_scenario_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scenarios/reference.yaml");
    content_ev()
        .args(["evaluate", "--scenario", path])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scenario: reference"))
        .stdout(predicate::str::contains("₹ 224.5 Cr"));
}
