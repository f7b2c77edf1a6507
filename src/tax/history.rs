use super::aggregate::{aggregate, fiscal_years, GainLossTotals};
use super::fiscal::FiscalYear;
use super::records::CapitalGainRecord;
use super::rules::TaxRules;
use super::summary::serialize_label;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Exemption utilisation for one fiscal year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalYearReport {
    #[serde(serialize_with = "serialize_label")]
    pub fiscal_year: FiscalYear,
    pub totals: GainLossTotals,
    pub net_long_gain: Decimal,
    pub net_short_gain: Decimal,
    pub exemption_limit: Decimal,
    pub exemption_used: Decimal,
    pub exemption_wasted: Decimal,
    pub tax_saved: Decimal,
    pub missed_savings: Decimal,
    /// The year has not ended yet, so wasted exemption can still be used
    pub in_progress: bool,
}

/// Replay aggregation and set-off for every fiscal year with disposals,
/// most recent first. Records without a usable disposal date are ignored.
pub fn analyze_history(
    records: &[CapitalGainRecord],
    rules: &TaxRules,
    today: NaiveDate,
) -> Vec<FiscalYearReport> {
    let current = FiscalYear::current(today);

    fiscal_years(records)
        .into_iter()
        .rev()
        .map(|year| {
            let totals = aggregate(records, year).combined();
            let offset = totals.offset();
            let exemption_limit = rules.exemption_limit(year);
            let exemption_used = offset.net_long_gain.min(exemption_limit);
            let exemption_wasted = (exemption_limit - offset.net_long_gain).max(Decimal::ZERO);

            FiscalYearReport {
                fiscal_year: year,
                totals,
                net_long_gain: offset.net_long_gain,
                net_short_gain: offset.net_short_gain,
                exemption_limit,
                exemption_used,
                exemption_wasted,
                tax_saved: rules.tax_on(exemption_used),
                missed_savings: rules.tax_on(exemption_wasted),
                in_progress: year == current,
            }
        })
        .collect()
}
