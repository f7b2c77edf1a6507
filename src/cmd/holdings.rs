//! Holdings command - open positions ranked by unrealised gain

use crate::cmd::format::{format_inr, format_inr_signed, format_percent, format_quantity};
use crate::cmd::read_holdings;
use crate::tax::HoldingPosition;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct HoldingsCommand {
    /// Holdings file (CSV or JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct HoldingView<'a> {
    #[serde(flatten)]
    holding: &'a HoldingPosition,
    unrealized_gain: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_on_investment: Option<Decimal>,
}

#[derive(Tabled)]
struct HoldingRow {
    #[tabled(rename = "Instrument")]
    instrument: String,
    #[tabled(rename = "Type")]
    asset_class: String,
    #[tabled(rename = "Units")]
    quantity: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Gain")]
    gain: String,
    #[tabled(rename = "Return")]
    roi: String,
    #[tabled(rename = "Lock-in")]
    lock_in: String,
}

impl HoldingsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut holdings = read_holdings(&self.file)?;
        holdings.sort_by(|a, b| b.unrealized_gain().cmp(&a.unrealized_gain()));

        if self.json {
            let views: Vec<HoldingView> = holdings
                .iter()
                .map(|h| HoldingView {
                    holding: h,
                    unrealized_gain: h.unrealized_gain(),
                    return_on_investment: h.return_on_investment(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
            return Ok(());
        }

        if holdings.is_empty() {
            println!("No holdings found");
            return Ok(());
        }

        let rows: Vec<HoldingRow> = holdings
            .iter()
            .map(|h| HoldingRow {
                instrument: h.instrument.clone(),
                asset_class: h.asset_class.display().to_string(),
                quantity: format_quantity(h.quantity),
                invested: format_inr(h.invested_value),
                current: format_inr(h.current_value),
                gain: format_inr_signed(h.unrealized_gain()),
                roi: h.return_on_investment().map_or("-".to_string(), format_percent),
                lock_in: if h.lock_in_excluded { "yes" } else { "" }.to_string(),
            })
            .collect();

        let invested: Decimal = holdings.iter().map(|h| h.invested_value).sum();
        let current: Decimal = holdings.iter().map(|h| h.current_value).sum();

        println!();
        println!("HOLDINGS");
        println!();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();
        println!(
            "  Invested: {} | Current: {} | Unrealised: {}",
            format_inr(invested),
            format_inr(current),
            format_inr_signed(current - invested)
        );
        println!();
        Ok(())
    }
}
