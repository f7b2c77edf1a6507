//! E2E tests for the command line interface

use std::io::Write;
use std::process::{Command, Output, Stdio};

const TODAY: &str = "2025-02-01";

fn ltcg(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn summary_current_year() {
    let output = ltcg(&["summary", "-g", "tests/data/gains.csv", "--today", TODAY]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("CAPITAL GAINS SUMMARY (FY 2024-25)"));
    assert!(stdout.contains("Net LTCG: +₹49,000"));
    assert!(stdout.contains("STCL set off against LTCG: ₹6,000"));
    assert!(stdout.contains("Remaining: ₹76,000"));
}

#[test]
fn summary_json_for_past_year() {
    let output = ltcg(&[
        "summary",
        "-g",
        "tests/data/gains.csv",
        "--year",
        "2023-24",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fiscal_year"], "FY 2023-24");
    assert_eq!(json["exemption_limit"], "100000");
    assert_eq!(json["offset"]["net_long_gain"], "150000");
    assert_eq!(json["remaining_exemption"], "0");
    assert_eq!(json["taxable_long_gain"], "50000");
    assert_eq!(json["estimated_tax"], "6250");
}

#[test]
fn summary_with_rules_file() {
    let output = ltcg(&[
        "summary",
        "-g",
        "tests/data/gains.csv",
        "--year",
        "FY 2024-25",
        "--rules",
        "tests/data/rules.json",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["exemption_limit"], "150000");
    assert_eq!(json["remaining_exemption"], "101000");
}

#[test]
fn summary_reads_stdin() {
    let mut child = Command::new("cargo")
        .args(["run", "--quiet", "--", "summary", "--year", "2022", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    let input = std::fs::read("tests/data/gains.csv").unwrap();
    child.stdin.take().unwrap().write_all(&input).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fiscal_year"], "FY 2022-23");
    assert_eq!(json["totals"]["long_gain"], "40000");
}

#[test]
fn invalid_year_rejected() {
    let output = ltcg(&["summary", "-g", "tests/data/gains.csv", "--year", "2024-26"]);
    assert!(!output.status.success());
}

#[test]
fn harvest_skips_lock_in_and_fills_exemption() {
    let output = ltcg(&[
        "harvest",
        "--holdings",
        "tests/data/holdings.csv",
        "--realized",
        "0",
        "--today",
        TODAY,
    ]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("LTCG HARVEST PLAN (FY 2024-25)"));
    assert!(stdout.contains("Nifty Index Fund"));
    assert!(stdout.contains("Partial"));
    assert!(!stdout.contains("Mirae"));
    assert!(stdout.contains("Gain harvested: ₹1,25,000"));
    assert!(stdout.contains("Exemption fully used"));
}

#[test]
fn harvest_json_uses_realised_gains() {
    let output = ltcg(&[
        "harvest",
        "--holdings",
        "tests/data/holdings.json",
        "-g",
        "tests/data/gains.csv",
        "--year",
        "2024-25",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["realized_long_gain"], "49000");
    assert_eq!(json["remaining_exemption"], "76000");
    assert_eq!(json["status"], "Filled");
    assert_eq!(json["total_gain_harvested"], "76000");

    let first = &json["recommendations"][0];
    assert_eq!(first["instrument"], "A");
    assert_eq!(first["units_to_sell"], "95");
    assert_eq!(first["full_disposal"], false);
}

#[test]
fn harvest_csv_equity_only() {
    let output = ltcg(&[
        "harvest",
        "--holdings",
        "tests/data/holdings.csv",
        "--realized",
        "0",
        "--year",
        "2024-25",
        "--filter",
        "equity",
        "--csv",
    ]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.starts_with("rank,instrument,asset_class,units,gain,capital,efficiency,sale"));
    assert!(stdout.contains("RELIANCE"));
    assert!(stdout.contains("Full"));
    assert!(!stdout.contains("Nifty"));
}

#[test]
fn harvest_exhausted() {
    let output = ltcg(&[
        "harvest",
        "--holdings",
        "tests/data/holdings.csv",
        "--realized",
        "125000",
        "--year",
        "2024-25",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("LTCG exemption already exhausted"));
}

#[test]
fn history_table() {
    let output = ltcg(&["history", "-g", "tests/data/gains.csv", "--today", TODAY]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("FY 2024-25 *"));
    assert!(stdout.contains("FY 2023-24"));
    assert!(stdout.contains("FY 2022-23"));
    assert!(stdout.contains("Tax saved: ₹23,625"));
    assert!(stdout.contains("Missed in closed years: ₹7,500"));
}

#[test]
fn history_json_descending() {
    let output = ltcg(&["history", "-g", "tests/data/gains.csv", "--today", TODAY, "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let years = json["years"].as_array().unwrap();
    assert_eq!(years.len(), 3);
    assert_eq!(years[0]["fiscal_year"], "FY 2024-25");
    assert_eq!(years[0]["in_progress"], true);
    assert_eq!(years[2]["fiscal_year"], "FY 2022-23");
    assert_eq!(years[2]["exemption_wasted"], "60000");
}

#[test]
fn gains_grouped_by_instrument() {
    let output = ltcg(&["gains", "-g", "tests/data/gains.csv", "--year", "2024-25", "--csv"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("instrument,asset_class,lots,quantity"));
    assert!(stdout.contains("Axis Bluechip Fund"));
    assert!(stdout.contains("TCS"));
    assert!(!stdout.contains("HDFC Index Fund"));
}

#[test]
fn holdings_sorted_by_gain() {
    let output = ltcg(&["holdings", "tests/data/holdings.csv"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let nifty = stdout.find("Nifty Index Fund").unwrap();
    let mirae = stdout.find("Mirae Asset ELSS").unwrap();
    let reliance = stdout.find("RELIANCE").unwrap();
    assert!(nifty < mirae && mirae < reliance);
    assert!(stdout.contains("yes"));
}

#[test]
fn validate_reports_issues() {
    let output = ltcg(&["validate", "-g", "tests/data/bad_gains.csv"]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("3 issue(s) found"));
    assert!(stdout.contains("UnparsableDate"));
    assert!(stdout.contains("FractionalShares"));
    assert!(stdout.contains("GainMismatch"));
}

#[test]
fn validate_clean_holdings() {
    let output = ltcg(&["validate", "--holdings", "tests/data/holdings.csv"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("No issues found"));
}

#[test]
fn schema_csv_header() {
    let output = ltcg(&["schema", "csv-header"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout(&output).trim(),
        "instrument,asset_class,acquisition_date,disposal_date,quantity,cost_basis,proceeds,short_term,long_term"
    );
}

#[test]
fn schema_holdings_fields() {
    let output = ltcg(&["schema", "csv-fields", "--input", "holdings"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("lock_in_excluded"));
    assert!(stdout.contains("Scheme Name"));
}
