use super::records::{AssetClass, CapitalGainRecord, HoldingPosition};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Largest `proceeds - cost` vs reported gain difference tolerated, in rupees.
/// Broker reports round each lot.
pub const RECONCILIATION_TOLERANCE: Decimal = dec!(1);

/// Data quality issues found in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// Disposal date missing or unparsable; the lot counts towards no fiscal year.
    UnparsableDisposalDate,
    /// `proceeds - cost_basis` disagrees with the reported short + long gain.
    GainMismatch {
        computed: Decimal,
        reported: Decimal,
    },
    /// Both short and long term figures are non-zero on one lot.
    BothTermsReported,
    /// Equity quantity is not a whole number of shares.
    FractionalEquityQuantity {
        quantity: Decimal,
    },
    /// Holding has zero quantity or zero value and cannot be ranked.
    DegenerateHolding,
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::UnparsableDisposalDate => "UnparsableDate",
            Warning::GainMismatch { .. } => "GainMismatch",
            Warning::BothTermsReported => "BothTerms",
            Warning::FractionalEquityQuantity { .. } => "FractionalShares",
            Warning::DegenerateHolding => "Degenerate",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Warning::UnparsableDisposalDate => {
                "Disposal date could not be parsed - excluded from every fiscal year".to_string()
            }
            Warning::GainMismatch { computed, reported } => format!(
                "Proceeds - cost = {:.2} but reported gain is {:.2}",
                computed, reported
            ),
            Warning::BothTermsReported => {
                "Both short and long term gains reported on one lot".to_string()
            }
            Warning::FractionalEquityQuantity { quantity } => {
                format!("Equity quantity {} is not a whole number", quantity.normalize())
            }
            Warning::DegenerateHolding => {
                "Zero quantity or value - skipped when planning sales".to_string()
            }
        }
    }
}

pub fn record_warnings(record: &CapitalGainRecord) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if record.disposal_date.is_none() {
        warnings.push(Warning::UnparsableDisposalDate);
    }
    if let Some(gap) = record.reconciliation_gap() {
        if gap.abs() > RECONCILIATION_TOLERANCE {
            warnings.push(Warning::GainMismatch {
                computed: record.gain(),
                reported: record.reported_gain(),
            });
        }
    }
    if !record.short_term.is_zero() && !record.long_term.is_zero() {
        warnings.push(Warning::BothTermsReported);
    }
    if record.asset_class == AssetClass::Equity && !record.quantity.fract().is_zero() {
        warnings.push(Warning::FractionalEquityQuantity {
            quantity: record.quantity,
        });
    }
    warnings
}

pub fn holding_warnings(holding: &HoldingPosition) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if holding.is_degenerate() {
        warnings.push(Warning::DegenerateHolding);
    }
    if holding.asset_class == AssetClass::Equity && !holding.quantity.fract().is_zero() {
        warnings.push(Warning::FractionalEquityQuantity {
            quantity: holding.quantity,
        });
    }
    warnings
}
