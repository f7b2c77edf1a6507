//! Validate command - surface data quality issues without generating full reports

use crate::cmd::{read_gains, read_holdings};
use crate::tax::warnings::{holding_warnings, record_warnings, Warning};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Capital gains file (CSV or JSON)
    #[arg(short, long)]
    gains: Option<PathBuf>,

    /// Holdings file (CSV or JSON)
    #[arg(long)]
    holdings: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    source: &'static str,
    row: usize,
    #[serde(rename = "type")]
    issue_type: &'static str,
    instrument: String,
    date: String,
    message: String,
    warning: Warning,
}

#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    issue_count: usize,
    issues: &'a [ValidationIssue],
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        if self.gains.is_none() && self.holdings.is_none() {
            anyhow::bail!("Nothing to validate. Pass --gains and/or --holdings.");
        }

        let mut issues = Vec::new();

        if let Some(path) = &self.gains {
            for (i, record) in read_gains(path)?.iter().enumerate() {
                let date = record
                    .disposal_date
                    .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string());
                issues.extend(record_warnings(record).into_iter().map(|w| ValidationIssue {
                    source: "gains",
                    row: i + 1,
                    issue_type: w.kind(),
                    instrument: record.instrument.clone(),
                    date: date.clone(),
                    message: w.message(),
                    warning: w,
                }));
            }
        }

        if let Some(path) = &self.holdings {
            for (i, holding) in read_holdings(path)?.iter().enumerate() {
                issues.extend(holding_warnings(holding).into_iter().map(|w| ValidationIssue {
                    source: "holdings",
                    row: i + 1,
                    issue_type: w.kind(),
                    instrument: holding.instrument.clone(),
                    date: "-".to_string(),
                    message: w.message(),
                    warning: w,
                }));
            }
        }

        if self.json {
            let output = ValidationOutput {
                issue_count: issues.len(),
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(&issues);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn print_text(issues: &[ValidationIssue]) {
    println!();
    println!("VALIDATION RESULTS");
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        println!(
            "  {}. [{}] {} row {}: {} ({})",
            i + 1,
            issue.issue_type,
            issue.source,
            issue.row,
            issue.instrument,
            issue.date
        );
        println!("     {}", issue.message);
        println!();
    }
}
