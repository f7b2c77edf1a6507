pub mod format;
pub mod gains;
pub mod harvest;
pub mod history;
pub mod holdings;
pub mod schema;
pub mod summary;
pub mod validate;

use crate::tax::records::{self, CapitalGainRecord, HoldingPosition};
use crate::tax::rules::{self, TaxRules};
use crate::tax::{parse_date, FiscalYear};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Tax regime overrides shared by the commands that price the exemption
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// JSON file with exemption schedule and LTCG rate overrides
    #[arg(long)]
    rules: Option<PathBuf>,

    /// LTCG tax rate as a fraction (e.g. 0.125)
    #[arg(long)]
    tax_rate: Option<Decimal>,

    /// Evaluate as of this date instead of the system clock (YYYY-MM-DD)
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,
}

impl RulesArgs {
    pub fn load(&self) -> anyhow::Result<TaxRules> {
        let mut rules = match &self.rules {
            Some(path) => rules::read_rules_json(BufReader::new(File::open(path)?))?,
            None => TaxRules::default(),
        };
        if let Some(rate) = self.tax_rate {
            if rate.is_sign_negative() || rate > Decimal::ONE {
                anyhow::bail!("--tax-rate must be between 0 and 1, got {}", rate);
            }
            rules.ltcg_rate = rate;
        }
        log::debug!("Using tax rules {:?}", rules);
        Ok(rules)
    }

    pub fn today(&self) -> NaiveDate {
        today(self.today)
    }
}

pub fn today(override_date: Option<NaiveDate>) -> NaiveDate {
    override_date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Requested year, or the one in progress
pub fn resolve_year(year: Option<FiscalYear>, today: NaiveDate) -> FiscalYear {
    year.unwrap_or_else(|| FiscalYear::current(today))
}

pub fn parse_today(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("invalid date '{}'", value))
}

/// Read realised gains from CSV or JSON (or stdin with "-")
pub fn read_gains(path: &Path) -> anyhow::Result<Vec<CapitalGainRecord>> {
    let (input, json) = open_input(path)?;
    let records = if json {
        records::read_gains_json(input)?
    } else {
        records::read_gains_csv(input)?
    };
    log::info!("Read {} capital gain records from {}", records.len(), path.display());
    Ok(records)
}

/// Read open positions from CSV or JSON (or stdin with "-")
pub fn read_holdings(path: &Path) -> anyhow::Result<Vec<HoldingPosition>> {
    let (input, json) = open_input(path)?;
    let holdings = if json {
        records::read_holdings_json(input)?
    } else {
        records::read_holdings_csv(input)?
    };
    log::info!("Read {} holdings from {}", holdings.len(), path.display());
    Ok(holdings)
}

/// Opens the input and reports whether it holds JSON. Files go by extension,
/// stdin by its first non-blank byte.
fn open_input(path: &Path) -> anyhow::Result<(Box<dyn Read>, bool)> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        BufReader::new(io::stdin().lock()).read_to_end(&mut buffer)?;

        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }

        let json = buffer
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'[');
        Ok((Box::new(Cursor::new(buffer)), json))
    } else {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("Cannot open {}: {}", path.display(), e))?;
        let json = path.extension().and_then(|s| s.to_str()) == Some("json");
        Ok((Box::new(BufReader::new(file)), json))
    }
}
