use super::fiscal::{parse_date, FiscalYear};
use chrono::NaiveDate;
use ltcg_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row}: instrument name is empty")]
    MissingInstrument { row: usize },
    #[error("row {row}: negative quantity {quantity} for {instrument}")]
    NegativeQuantity {
        row: usize,
        instrument: String,
        quantity: Decimal,
    },
}

/// Asset class for tax treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Mutual fund units, may be fractional
    #[default]
    Fund,
    /// Listed shares, whole units only
    Equity,
}

impl AssetClass {
    pub fn display(&self) -> &'static str {
        match self {
            AssetClass::Fund => "MF",
            AssetClass::Equity => "Stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset class '{0}' (expected fund or equity)")]
pub struct ParseAssetClassError(String);

impl FromStr for AssetClass {
    type Err = ParseAssetClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fund" | "mf" | "mutual_fund" | "mutual fund" => Ok(AssetClass::Fund),
            "equity" | "stock" | "share" => Ok(AssetClass::Equity),
            _ => Err(ParseAssetClassError(s.to_string())),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl<'de> Deserialize<'de> for AssetClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One matched buy/sell lot of an instrument already disposed of.
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalGainRecord {
    pub instrument: String,
    pub asset_class: AssetClass,
    pub acquisition_date: Option<NaiveDate>,
    /// `None` when the source date could not be parsed
    pub disposal_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub proceeds: Decimal,
    pub short_term: Decimal,
    pub long_term: Decimal,
}

impl CapitalGainRecord {
    pub fn fiscal_year(&self) -> Option<FiscalYear> {
        self.disposal_date.map(FiscalYear::from_date)
    }

    pub fn gain(&self) -> Decimal {
        self.proceeds - self.cost_basis
    }

    /// Gain as reported by the source, across both terms
    pub fn reported_gain(&self) -> Decimal {
        self.short_term + self.long_term
    }

    /// Difference between `proceeds - cost` and the reported figure. `None`
    /// when the source did not carry cost and proceeds.
    pub fn reconciliation_gap(&self) -> Option<Decimal> {
        if self.cost_basis.is_zero() && self.proceeds.is_zero() {
            None
        } else {
            Some(self.gain() - self.reported_gain())
        }
    }
}

/// A currently open position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingPosition {
    pub instrument: String,
    pub asset_class: AssetClass,
    pub quantity: Decimal,
    pub invested_value: Decimal,
    pub current_value: Decimal,
    /// Statutory lock-in (e.g. ELSS): may not be sold to realise gains
    pub lock_in_excluded: bool,
}

impl HoldingPosition {
    pub fn unrealized_gain(&self) -> Decimal {
        self.current_value - self.invested_value
    }

    /// True when per-unit figures are undefined
    pub fn is_degenerate(&self) -> bool {
        self.quantity.is_zero() || self.current_value.is_zero()
    }

    pub fn gain_per_unit(&self) -> Option<Decimal> {
        (!self.is_degenerate()).then(|| self.unrealized_gain() / self.quantity)
    }

    pub fn price_per_unit(&self) -> Option<Decimal> {
        (!self.is_degenerate()).then(|| self.current_value / self.quantity)
    }

    /// Fraction of the position's value that is gain
    pub fn efficiency(&self) -> Option<Decimal> {
        (!self.is_degenerate()).then(|| self.unrealized_gain() / self.current_value)
    }

    /// Return on invested value, as a fraction
    pub fn return_on_investment(&self) -> Option<Decimal> {
        (!self.invested_value.is_zero()).then(|| self.unrealized_gain() / self.invested_value)
    }
}

/// Column description produced by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
}

/// Blank cells in amount columns count as zero
fn blank_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default())
}

/// Input row for a realised capital gain lot
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct GainRow {
    /// Scheme or stock name
    #[serde(alias = "Scheme Name", alias = "Stock name")]
    pub instrument: String,
    /// fund or equity
    pub asset_class: AssetClass,
    /// Purchase date (YYYY-MM-DD, DD-MM-YYYY or DD Mon YYYY)
    #[serde(default, alias = "Purchase Date", alias = "Buy date")]
    pub acquisition_date: Option<String>,
    /// Redemption/sell date, determines the fiscal year
    #[serde(alias = "Redeem Date", alias = "Sell date")]
    pub disposal_date: String,
    /// Matched quantity of units or shares
    #[serde(alias = "Matched Quantity", alias = "Quantity")]
    #[schemars(with = "f64")]
    pub quantity: Decimal,
    /// Total purchase value of the lot
    #[serde(default, alias = "Buy value", deserialize_with = "blank_as_zero")]
    #[schemars(with = "f64")]
    pub cost_basis: Decimal,
    /// Total sale value of the lot
    #[serde(default, alias = "Sell value", deserialize_with = "blank_as_zero")]
    #[schemars(with = "f64")]
    pub proceeds: Decimal,
    /// Short-term gain (negative for a loss)
    #[serde(default, alias = "STCG", deserialize_with = "blank_as_zero")]
    #[schemars(with = "f64")]
    pub short_term: Decimal,
    /// Long-term gain (negative for a loss)
    #[serde(default, alias = "LTCG", deserialize_with = "blank_as_zero")]
    #[schemars(with = "f64")]
    pub long_term: Decimal,
}

/// Input row for an open position
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct HoldingRow {
    /// Scheme or stock name
    #[serde(alias = "Scheme Name", alias = "Stock Name")]
    pub instrument: String,
    /// fund or equity
    pub asset_class: AssetClass,
    /// Fund sub-category, used to detect ELSS when lock_in_excluded is absent
    #[serde(default, alias = "Sub-category")]
    pub sub_category: Option<String>,
    /// Units or shares held
    #[serde(alias = "Units")]
    #[schemars(with = "f64")]
    pub quantity: Decimal,
    /// Amount invested
    #[serde(alias = "Invested Value", alias = "Buy value")]
    #[schemars(with = "f64")]
    pub invested_value: Decimal,
    /// Current market value
    #[serde(alias = "Current Value", alias = "Closing value")]
    #[schemars(with = "f64")]
    pub current_value: Decimal,
    /// true for lock-in instruments that cannot be sold
    #[serde(default)]
    pub lock_in_excluded: Option<bool>,
}

impl GainRow {
    pub fn into_record(self, row: usize) -> Result<CapitalGainRecord, InputError> {
        let instrument = self.instrument.trim().to_string();
        if instrument.is_empty() {
            return Err(InputError::MissingInstrument { row });
        }
        if self.quantity.is_sign_negative() {
            return Err(InputError::NegativeQuantity {
                row,
                instrument,
                quantity: self.quantity,
            });
        }

        match FiscalYear::classify(&self.disposal_date) {
            Some(year) => log::debug!("Row {}: {} disposed in {}", row, instrument, year),
            None => log::warn!(
                "Row {}: unparsable disposal date '{}' for {}, excluded from fiscal years",
                row,
                self.disposal_date,
                instrument
            ),
        }
        let disposal_date = parse_date(&self.disposal_date);

        Ok(CapitalGainRecord {
            instrument,
            asset_class: self.asset_class,
            acquisition_date: self.acquisition_date.as_deref().and_then(parse_date),
            disposal_date,
            quantity: self.quantity,
            cost_basis: self.cost_basis,
            proceeds: self.proceeds,
            short_term: self.short_term,
            long_term: self.long_term,
        })
    }
}

impl HoldingRow {
    pub fn into_position(self, row: usize) -> Result<HoldingPosition, InputError> {
        let instrument = self.instrument.trim().to_string();
        if instrument.is_empty() {
            return Err(InputError::MissingInstrument { row });
        }
        if self.quantity.is_sign_negative() {
            return Err(InputError::NegativeQuantity {
                row,
                instrument,
                quantity: self.quantity,
            });
        }

        let lock_in_excluded = self.lock_in_excluded.unwrap_or_else(|| {
            is_tax_saver(&instrument, self.sub_category.as_deref().unwrap_or_default())
        });

        Ok(HoldingPosition {
            instrument,
            asset_class: self.asset_class,
            quantity: self.quantity,
            invested_value: self.invested_value,
            current_value: self.current_value,
            lock_in_excluded,
        })
    }
}

/// ELSS funds carry a 3 year lock-in.
fn is_tax_saver(name: &str, sub_category: &str) -> bool {
    let name = name.to_lowercase();
    sub_category.to_lowercase().contains("elss")
        || name.contains("elss")
        || name.contains("tax saver")
}

/// Read capital gain rows from CSV
pub fn read_gains_csv<R: Read>(reader: R) -> Result<Vec<CapitalGainRecord>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<GainRow>().enumerate() {
        records.push(result?.into_record(i + 1)?);
    }
    Ok(records)
}

/// Read capital gain rows from a JSON array
pub fn read_gains_json<R: Read>(reader: R) -> Result<Vec<CapitalGainRecord>, InputError> {
    let rows: Vec<GainRow> = serde_json::from_reader(reader)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| row.into_record(i + 1))
        .collect()
}

/// Read holdings from CSV
pub fn read_holdings_csv<R: Read>(reader: R) -> Result<Vec<HoldingPosition>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut holdings = Vec::new();
    for (i, result) in rdr.deserialize::<HoldingRow>().enumerate() {
        holdings.push(result?.into_position(i + 1)?);
    }
    Ok(holdings)
}

/// Read holdings from a JSON array
pub fn read_holdings_json<R: Read>(reader: R) -> Result<Vec<HoldingPosition>, InputError> {
    let rows: Vec<HoldingRow> = serde_json::from_reader(reader)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| row.into_position(i + 1))
        .collect()
}
