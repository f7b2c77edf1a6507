//! History command - exemption use and missed savings per fiscal year

use crate::cmd::format::{format_inr, format_inr_signed};
use crate::cmd::{read_gains, RulesArgs};
use crate::tax::{analyze_history, FiscalYearReport};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HistoryCommand {
    /// Capital gains file (CSV or JSON). Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    gains: PathBuf,

    #[command(flatten)]
    rules: RulesArgs,

    /// Output as JSON instead of a formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct HistoryOutput<'a> {
    years: &'a [FiscalYearReport],
    total_tax_saved: Decimal,
    total_missed_savings: Decimal,
}

#[derive(Tabled)]
struct YearRow {
    #[tabled(rename = "Fiscal Year")]
    year: String,
    #[tabled(rename = "Net STCG")]
    net_short: String,
    #[tabled(rename = "Net LTCG")]
    net_long: String,
    #[tabled(rename = "Exemption")]
    limit: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Unused")]
    wasted: String,
    #[tabled(rename = "Tax Saved")]
    saved: String,
    #[tabled(rename = "Missed")]
    missed: String,
}

impl From<&FiscalYearReport> for YearRow {
    fn from(report: &FiscalYearReport) -> Self {
        let year = if report.in_progress {
            format!("{} *", report.fiscal_year)
        } else {
            report.fiscal_year.label()
        };
        YearRow {
            year,
            net_short: format_inr_signed(report.net_short_gain),
            net_long: format_inr_signed(report.net_long_gain),
            limit: format_inr(report.exemption_limit),
            used: format_inr(report.exemption_used),
            wasted: format_inr(report.exemption_wasted),
            saved: format_inr(report.tax_saved),
            missed: format_inr(report.missed_savings),
        }
    }
}

impl HistoryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rules = self.rules.load()?;
        let records = read_gains(&self.gains)?;
        let reports = analyze_history(&records, &rules, self.rules.today());

        let total_tax_saved: Decimal = reports.iter().map(|r| r.tax_saved).sum();
        // the running year can still be harvested
        let total_missed_savings: Decimal = reports
            .iter()
            .filter(|r| !r.in_progress)
            .map(|r| r.missed_savings)
            .sum();

        if self.json {
            let output = HistoryOutput {
                years: &reports,
                total_tax_saved,
                total_missed_savings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if reports.is_empty() {
            println!("No disposals with a valid date found");
            return Ok(());
        }

        println!();
        println!("LTCG EXEMPTION HISTORY");
        println!();
        let rows: Vec<YearRow> = reports.iter().map(YearRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        if reports.iter().any(|r| r.in_progress) {
            println!("* year in progress");
        }
        println!();
        println!(
            "  Tax saved: {} | Missed in closed years: {}",
            format_inr(total_tax_saved),
            format_inr(total_missed_savings)
        );
        println!();
        Ok(())
    }
}
