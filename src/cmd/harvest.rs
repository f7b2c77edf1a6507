//! Harvest command - which holdings to sell and rebuy to use the LTCG exemption

use crate::cmd::format::{format_inr, format_percent, format_quantity};
use crate::cmd::{read_gains, read_holdings, resolve_year, RulesArgs};
use crate::tax::harvest::allocate;
use crate::tax::{compute_filing_year_summary, AssetFilter, FiscalYear, HarvestPlan};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HarvestCommand {
    /// Holdings file (CSV or JSON), "-" for stdin
    #[arg(long)]
    holdings: PathBuf,

    /// Capital gains file used to work out LTCG already realised this year
    #[arg(short, long, conflicts_with = "realized")]
    gains: Option<PathBuf>,

    /// Net LTCG already realised this year, instead of --gains
    #[arg(long)]
    realized: Option<Decimal>,

    /// Fiscal year (e.g. 2024-25); defaults to the current one
    #[arg(short, long)]
    year: Option<FiscalYear>,

    /// Which holdings may be sold
    #[arg(short, long, value_enum, default_value_t = FilterArg::Both)]
    filter: FilterArg,

    #[command(flatten)]
    rules: RulesArgs,

    /// Output as JSON instead of a formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output recommendations as CSV
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FilterArg {
    Fund,
    Equity,
    #[default]
    Both,
}

impl From<FilterArg> for AssetFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Fund => AssetFilter::Fund,
            FilterArg::Equity => AssetFilter::Equity,
            FilterArg::Both => AssetFilter::Both,
        }
    }
}

#[derive(Debug, Serialize)]
struct HarvestOutput<'a> {
    fiscal_year: String,
    filter: AssetFilter,
    realized_long_gain: Decimal,
    exemption_limit: Decimal,
    #[serde(flatten)]
    plan: &'a HarvestPlan,
    estimated_tax_saved: Decimal,
}

/// Row for the recommendations table and CSV output
#[derive(Debug, Tabled, Serialize)]
struct RecommendationRow {
    #[tabled(rename = "#")]
    #[serde(rename = "rank")]
    rank: usize,
    #[tabled(rename = "Instrument")]
    instrument: String,
    #[tabled(rename = "Type")]
    asset_class: String,
    #[tabled(rename = "Units")]
    units: String,
    #[tabled(rename = "Gain")]
    gain: String,
    #[tabled(rename = "Capital")]
    capital: String,
    #[tabled(rename = "Gain %")]
    efficiency: String,
    #[tabled(rename = "Sale")]
    sale: String,
}

impl HarvestCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rules = self.rules.load()?;
        let year = resolve_year(self.year, self.rules.today());
        let exemption_limit = rules.exemption_limit(year);

        let realized = match (&self.gains, self.realized) {
            (Some(path), _) => {
                let records = read_gains(path)?;
                compute_filing_year_summary(&records, year, exemption_limit).net_long_gain()
            }
            (None, Some(amount)) => amount.max(Decimal::ZERO),
            (None, None) => {
                log::warn!("No realised gains supplied, assuming none for {}", year);
                Decimal::ZERO
            }
        };

        let holdings = read_holdings(&self.holdings)?;
        let filter: AssetFilter = self.filter.into();
        let plan = allocate(realized, exemption_limit, &holdings, filter);

        if self.json {
            let output = HarvestOutput {
                fiscal_year: year.label(),
                filter,
                realized_long_gain: realized,
                exemption_limit,
                plan: &plan,
                estimated_tax_saved: rules.tax_on(plan.total_gain_harvested),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        let rows = build_rows(&plan);
        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        } else {
            println!();
            println!("LTCG HARVEST PLAN ({})", year);
            println!();
            println!(
                "  Realised LTCG: {} | Exemption: {} | Remaining: {}",
                format_inr(realized),
                format_inr(exemption_limit),
                format_inr(plan.remaining_exemption)
            );
            println!();

            if !rows.is_empty() {
                let table = Table::new(&rows)
                    .with(Style::rounded())
                    .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                    .to_string();
                println!("{}", table);
                println!();
                println!(
                    "  Gain harvested: {} | Capital to cycle: {} | Tax saved: {}",
                    format_inr(plan.total_gain_harvested),
                    format_inr(plan.total_capital_required),
                    format_inr(rules.tax_on(plan.total_gain_harvested))
                );
                if plan.unfilled() > Decimal::ZERO {
                    println!("  Unused exemption: {}", format_inr(plan.unfilled()));
                }
                println!();
            }
            println!("{}", plan.status.display());
            println!();
        }
        Ok(())
    }
}

fn build_rows(plan: &HarvestPlan) -> Vec<RecommendationRow> {
    plan.recommendations
        .iter()
        .enumerate()
        .map(|(i, r)| RecommendationRow {
            rank: i + 1,
            instrument: r.instrument.clone(),
            asset_class: r.asset_class.display().to_string(),
            units: format_quantity(r.units_to_sell),
            gain: format_inr(r.gain_realized),
            capital: format_inr(r.capital_required),
            efficiency: format_percent(r.efficiency),
            sale: if r.full_disposal { "Full" } else { "Partial" }.to_string(),
        })
        .collect()
}
