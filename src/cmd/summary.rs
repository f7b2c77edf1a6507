//! Summary command - realised gains, set-off and remaining exemption for a year

use crate::cmd::format::{format_inr, format_inr_signed};
use crate::cmd::{read_gains, resolve_year, RulesArgs};
use crate::tax::records::AssetClass;
use crate::tax::{compute_filing_year_summary, FilingYearSummary, FiscalYear, GainLossTotals};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    /// Capital gains file (CSV or JSON). Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    gains: PathBuf,

    /// Fiscal year (e.g. 2024-25); defaults to the current one
    #[arg(short, long)]
    year: Option<FiscalYear>,

    #[command(flatten)]
    rules: RulesArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SummaryOutput<'a> {
    #[serde(flatten)]
    summary: &'a FilingYearSummary,
    taxable_long_gain: Decimal,
    estimated_tax: Decimal,
}

#[derive(Tabled)]
struct TotalsRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "STCG")]
    short_gain: String,
    #[tabled(rename = "STCL")]
    short_loss: String,
    #[tabled(rename = "LTCG")]
    long_gain: String,
    #[tabled(rename = "LTCL")]
    long_loss: String,
}

impl TotalsRow {
    fn new(class: &str, totals: &GainLossTotals) -> Self {
        TotalsRow {
            class: class.to_string(),
            short_gain: format_inr(totals.short_gain),
            short_loss: format_inr(totals.short_loss),
            long_gain: format_inr(totals.long_gain),
            long_loss: format_inr(totals.long_loss),
        }
    }
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rules = self.rules.load()?;
        let year = resolve_year(self.year, self.rules.today());
        let records = read_gains(&self.gains)?;

        let summary = compute_filing_year_summary(&records, year, rules.exemption_limit(year));
        let estimated_tax = rules.tax_on(summary.taxable_long_gain());

        if self.json {
            let output = SummaryOutput {
                summary: &summary,
                taxable_long_gain: summary.taxable_long_gain(),
                estimated_tax,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            self.print_summary(&summary, estimated_tax);
        }
        Ok(())
    }

    fn print_summary(&self, summary: &FilingYearSummary, estimated_tax: Decimal) {
        println!();
        println!("CAPITAL GAINS SUMMARY ({})", summary.fiscal_year);
        println!();

        if summary.totals.is_empty() {
            println!("No disposals recorded in {}", summary.fiscal_year);
            println!();
        } else {
            let rows = vec![
                TotalsRow::new(AssetClass::Fund.display(), summary.by_class.get(AssetClass::Fund)),
                TotalsRow::new(
                    AssetClass::Equity.display(),
                    summary.by_class.get(AssetClass::Equity),
                ),
                TotalsRow::new("Total", &summary.totals),
            ];
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
            println!();
        }

        let offset = &summary.offset;
        println!("SET-OFF");
        println!(
            "  Net STCG: {} | Net LTCG: {}",
            format_inr_signed(summary.net_short_gain()),
            format_inr_signed(summary.net_long_gain())
        );
        if offset.short_loss_applied_to_long > Decimal::ZERO {
            println!(
                "  STCL set off against LTCG: {}",
                format_inr(offset.short_loss_applied_to_long)
            );
        }
        let unabsorbed = offset.remaining_short_loss - offset.short_loss_applied_to_long;
        if unabsorbed > Decimal::ZERO {
            println!("  Unabsorbed STCL: {}", format_inr(unabsorbed));
        }
        println!();

        println!("LTCG EXEMPTION");
        println!(
            "  Limit: {} | Remaining: {}",
            format_inr(summary.exemption_limit),
            format_inr(summary.remaining_exemption)
        );
        println!(
            "  Taxable LTCG: {} | Estimated tax: {}",
            format_inr(summary.taxable_long_gain()),
            format_inr(estimated_tax)
        );
        println!();
    }
}
