use super::aggregate::{aggregate, ClassTotals, GainLossTotals};
use super::fiscal::FiscalYear;
use super::offset::OffsetResult;
use super::records::CapitalGainRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// Realised position for a filing year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingYearSummary {
    #[serde(serialize_with = "serialize_label")]
    pub fiscal_year: FiscalYear,
    pub by_class: ClassTotals,
    pub totals: GainLossTotals,
    pub offset: OffsetResult,
    pub exemption_limit: Decimal,
    pub remaining_exemption: Decimal,
}

impl FilingYearSummary {
    pub fn net_long_gain(&self) -> Decimal {
        self.offset.net_long_gain
    }

    pub fn net_short_gain(&self) -> Decimal {
        self.offset.net_short_gain
    }

    /// Net LTCG above the exemption
    pub fn taxable_long_gain(&self) -> Decimal {
        (self.offset.net_long_gain - self.exemption_limit).max(Decimal::ZERO)
    }
}

pub(crate) fn serialize_label<S: serde::Serializer>(
    year: &FiscalYear,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&year.label())
}

pub fn compute_filing_year_summary(
    records: &[CapitalGainRecord],
    year: FiscalYear,
    exemption_limit: Decimal,
) -> FilingYearSummary {
    let by_class = aggregate(records, year);
    let totals = by_class.combined();
    let offset = totals.offset();
    let remaining_exemption = (exemption_limit - offset.net_long_gain).max(Decimal::ZERO);

    log::debug!(
        "{}: net LTCG {}, net STCG {}, remaining exemption {}",
        year,
        offset.net_long_gain,
        offset.net_short_gain,
        remaining_exemption
    );

    FilingYearSummary {
        fiscal_year: year,
        by_class,
        totals,
        offset,
        exemption_limit,
        remaining_exemption,
    }
}
