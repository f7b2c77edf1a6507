use super::fiscal::FiscalYear;
use super::records::{AssetClass, CapitalGainRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::ops::Add;

/// Gains and losses for one bucket. Losses are held as absolute values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GainLossTotals {
    pub short_gain: Decimal,
    pub short_loss: Decimal,
    pub long_gain: Decimal,
    pub long_loss: Decimal,
}

impl GainLossTotals {
    /// Accumulate a record's short and long figures independently
    pub fn add_record(&mut self, record: &CapitalGainRecord) {
        if record.short_term > Decimal::ZERO {
            self.short_gain += record.short_term;
        } else {
            self.short_loss += record.short_term.abs();
        }
        if record.long_term > Decimal::ZERO {
            self.long_gain += record.long_term;
        } else {
            self.long_loss += record.long_term.abs();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GainLossTotals::default()
    }
}

impl Add for GainLossTotals {
    type Output = GainLossTotals;

    fn add(self, other: GainLossTotals) -> GainLossTotals {
        GainLossTotals {
            short_gain: self.short_gain + other.short_gain,
            short_loss: self.short_loss + other.short_loss,
            long_gain: self.long_gain + other.long_gain,
            long_loss: self.long_loss + other.long_loss,
        }
    }
}

/// Totals split by asset class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassTotals {
    pub fund: GainLossTotals,
    pub equity: GainLossTotals,
}

impl ClassTotals {
    pub fn combined(&self) -> GainLossTotals {
        self.fund + self.equity
    }

    pub fn get(&self, class: AssetClass) -> &GainLossTotals {
        match class {
            AssetClass::Fund => &self.fund,
            AssetClass::Equity => &self.equity,
        }
    }

    fn get_mut(&mut self, class: AssetClass) -> &mut GainLossTotals {
        match class {
            AssetClass::Fund => &mut self.fund,
            AssetClass::Equity => &mut self.equity,
        }
    }
}

/// Sum the records disposed of in `year`, per asset class
pub fn aggregate(records: &[CapitalGainRecord], year: FiscalYear) -> ClassTotals {
    let mut totals = ClassTotals::default();
    for record in records.iter().filter(|r| r.fiscal_year() == Some(year)) {
        totals.get_mut(record.asset_class).add_record(record);
    }
    log::debug!(
        "{}: fund={:?} equity={:?}",
        year,
        totals.fund,
        totals.equity
    );
    totals
}

/// Distinct fiscal years of all classifiable disposals
pub fn fiscal_years(records: &[CapitalGainRecord]) -> BTreeSet<FiscalYear> {
    records.iter().filter_map(|r| r.fiscal_year()).collect()
}

/// Redeemed lots rolled up per instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentSummary {
    pub instrument: String,
    pub asset_class: AssetClass,
    pub lots: usize,
    pub quantity: Decimal,
    pub short_term: Decimal,
    pub long_term: Decimal,
    pub first_acquired: Option<NaiveDate>,
    pub last_acquired: Option<NaiveDate>,
    pub last_disposed: Option<NaiveDate>,
}

/// Group a year's records by instrument, in first-seen order
pub fn group_by_instrument(
    records: &[CapitalGainRecord],
    year: FiscalYear,
) -> Vec<InstrumentSummary> {
    let mut index: HashMap<(&str, AssetClass), usize> = HashMap::new();
    let mut summaries: Vec<InstrumentSummary> = Vec::new();

    for record in records.iter().filter(|r| r.fiscal_year() == Some(year)) {
        let key = (record.instrument.as_str(), record.asset_class);
        let i = *index.entry(key).or_insert_with(|| {
            summaries.push(InstrumentSummary {
                instrument: record.instrument.clone(),
                asset_class: record.asset_class,
                lots: 0,
                quantity: Decimal::ZERO,
                short_term: Decimal::ZERO,
                long_term: Decimal::ZERO,
                first_acquired: None,
                last_acquired: None,
                last_disposed: None,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[i];
        summary.lots += 1;
        summary.quantity += record.quantity;
        summary.short_term += record.short_term;
        summary.long_term += record.long_term;
        if let Some(acquired) = record.acquisition_date {
            summary.first_acquired = Some(summary.first_acquired.map_or(acquired, |d| d.min(acquired)));
            summary.last_acquired = Some(summary.last_acquired.map_or(acquired, |d| d.max(acquired)));
        }
        summary.last_disposed = summary.last_disposed.max(record.disposal_date);
    }

    summaries
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn record(
        instrument: &str,
        class: AssetClass,
        disposal: &str,
        short_term: Decimal,
        long_term: Decimal,
    ) -> CapitalGainRecord {
        CapitalGainRecord {
            instrument: instrument.to_string(),
            asset_class: class,
            acquisition_date: None,
            disposal_date: crate::tax::fiscal::parse_date(disposal),
            quantity: dec!(1),
            cost_basis: Decimal::ZERO,
            proceeds: Decimal::ZERO,
            short_term,
            long_term,
        }
    }

    #[test]
    fn gains_and_losses_split_by_sign() {
        let records = vec![
            record("A", AssetClass::Fund, "2024-05-01", dec!(1000), dec!(0)),
            record("B", AssetClass::Fund, "2024-06-01", dec!(-300), dec!(0)),
            record("C", AssetClass::Fund, "2024-07-01", dec!(0), dec!(5000)),
            record("D", AssetClass::Fund, "2024-08-01", dec!(0), dec!(-1200)),
        ];
        let totals = aggregate(&records, FiscalYear(2024)).combined();
        assert_eq!(
            totals,
            GainLossTotals {
                short_gain: dec!(1000),
                short_loss: dec!(300),
                long_gain: dec!(5000),
                long_loss: dec!(1200),
            }
        );
    }

    #[test]
    fn short_and_long_fields_accumulate_independently() {
        let records = vec![record("A", AssetClass::Equity, "2024-05-01", dec!(200), dec!(-50))];
        let totals = aggregate(&records, FiscalYear(2024)).combined();
        assert_eq!(totals.short_gain, dec!(200));
        assert_eq!(totals.long_loss, dec!(50));
    }

    #[test]
    fn filters_by_disposal_fiscal_year() {
        let records = vec![
            record("A", AssetClass::Fund, "2024-03-31", dec!(0), dec!(100)),
            record("B", AssetClass::Fund, "2024-04-01", dec!(0), dec!(200)),
            record("C", AssetClass::Fund, "2025-03-31", dec!(0), dec!(400)),
            record("D", AssetClass::Fund, "garbage", dec!(0), dec!(800)),
        ];
        let totals = aggregate(&records, FiscalYear(2024)).combined();
        assert_eq!(totals.long_gain, dec!(600));

        let previous = aggregate(&records, FiscalYear(2023)).combined();
        assert_eq!(previous.long_gain, dec!(100));
    }

    #[test]
    fn class_split_sums_to_combined() {
        let records = vec![
            record("Fund", AssetClass::Fund, "2024-05-01", dec!(0), dec!(70000)),
            record("Stock", AssetClass::Equity, "2024-05-01", dec!(-4000), dec!(30000)),
        ];
        let totals = aggregate(&records, FiscalYear(2024));
        assert_eq!(totals.get(AssetClass::Fund).long_gain, dec!(70000));
        assert_eq!(totals.get(AssetClass::Equity).long_gain, dec!(30000));
        assert_eq!(totals.equity.short_loss, dec!(4000));
        assert_eq!(totals.combined().long_gain, dec!(100000));
    }

    #[test]
    fn empty_year_is_zero() {
        let totals = aggregate(&[], FiscalYear(2024));
        assert!(totals.combined().is_empty());
    }

    #[test]
    fn fiscal_years_deduplicated_and_ordered() {
        let records = vec![
            record("A", AssetClass::Fund, "2025-01-01", dec!(0), dec!(1)),
            record("B", AssetClass::Fund, "2022-06-01", dec!(0), dec!(1)),
            record("C", AssetClass::Fund, "2024-07-01", dec!(0), dec!(1)),
            record("D", AssetClass::Fund, "??", dec!(0), dec!(1)),
        ];
        let years: Vec<_> = fiscal_years(&records).into_iter().collect();
        assert_eq!(years, vec![FiscalYear(2022), FiscalYear(2024)]);
    }

    #[test]
    fn group_by_instrument_rolls_up_lots() {
        let mut first = record("Axis Bluechip", AssetClass::Fund, "2024-06-10", dec!(0), dec!(1500));
        first.acquisition_date = NaiveDate::from_ymd_opt(2021, 5, 1);
        first.quantity = dec!(10.5);
        let mut second = record("Axis Bluechip", AssetClass::Fund, "2024-06-12", dec!(-20), dec!(500));
        second.acquisition_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        second.quantity = dec!(4.5);
        let other = record("TCS", AssetClass::Equity, "2024-08-01", dec!(900), dec!(0));

        let groups = group_by_instrument(&[first, other, second], FiscalYear(2024));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].instrument, "Axis Bluechip");
        assert_eq!(groups[0].lots, 2);
        assert_eq!(groups[0].quantity, dec!(15));
        assert_eq!(groups[0].short_term, dec!(-20));
        assert_eq!(groups[0].long_term, dec!(2000));
        assert_eq!(groups[0].first_acquired, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(groups[0].last_acquired, NaiveDate::from_ymd_opt(2021, 5, 1));
        assert_eq!(groups[0].last_disposed, NaiveDate::from_ymd_opt(2024, 6, 12));
        assert_eq!(groups[1].instrument, "TCS");
    }
}
