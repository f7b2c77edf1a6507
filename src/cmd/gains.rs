//! Gains command - redeemed lots rolled up per instrument

use crate::cmd::format::{format_inr_signed, format_quantity};
use crate::cmd::{parse_today, read_gains, resolve_year, today};
use crate::tax::{group_by_instrument, FiscalYear, InstrumentSummary};
use chrono::NaiveDate;
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct GainsCommand {
    /// Capital gains file (CSV or JSON). Reads from stdin if not specified.
    #[arg(short, long, default_value = "-")]
    gains: PathBuf,

    /// Fiscal year (e.g. 2024-25); defaults to the current one
    #[arg(short, long)]
    year: Option<FiscalYear>,

    /// Date used to pick the current fiscal year (YYYY-MM-DD)
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the gains table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct GainRowView {
    #[tabled(rename = "Instrument")]
    pub instrument: String,

    #[tabled(rename = "Type")]
    pub asset_class: String,

    #[tabled(rename = "Lots")]
    pub lots: usize,

    #[tabled(rename = "Quantity")]
    pub quantity: String,

    #[tabled(rename = "Acquired")]
    pub acquired: String,

    #[tabled(rename = "Redeemed")]
    pub redeemed: String,

    #[tabled(rename = "STCG")]
    pub short_term: String,

    #[tabled(rename = "LTCG")]
    pub long_term: String,
}

impl From<&InstrumentSummary> for GainRowView {
    fn from(summary: &InstrumentSummary) -> Self {
        let fmt_date =
            |d: Option<NaiveDate>| d.map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        let acquired = match (summary.first_acquired, summary.last_acquired) {
            (Some(first), Some(last)) if first != last => {
                format!("{} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
            }
            (first, _) => fmt_date(first),
        };
        GainRowView {
            instrument: summary.instrument.clone(),
            asset_class: summary.asset_class.display().to_string(),
            lots: summary.lots,
            quantity: format_quantity(summary.quantity),
            acquired,
            redeemed: fmt_date(summary.last_disposed),
            short_term: format_inr_signed(summary.short_term),
            long_term: format_inr_signed(summary.long_term),
        }
    }
}

impl GainsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = resolve_year(self.year, today(self.today));
        let records = read_gains(&self.gains)?;
        let rows: Vec<GainRowView> = group_by_instrument(&records, year)
            .iter()
            .map(GainRowView::from)
            .collect();

        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
            return Ok(());
        }

        if rows.is_empty() {
            println!("No redemptions found in {}", year);
            return Ok(());
        }

        println!();
        println!("REDEEMED ({})", year);
        println!();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();
        Ok(())
    }
}
