use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Indian financial year (runs 1 April to 31 March)
/// The year value represents the start year (e.g., 2024 = FY 2024-25)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    /// Fiscal year a date falls in. January-March belong to the year that
    /// started the previous April.
    pub fn from_date(date: NaiveDate) -> Self {
        if date.month() <= 3 {
            FiscalYear(date.year() - 1)
        } else {
            FiscalYear(date.year())
        }
    }

    /// Classify a textual date, `None` if it cannot be parsed.
    pub fn classify(value: &str) -> Option<Self> {
        parse_date(value).map(Self::from_date)
    }

    /// Fiscal year containing `today`. The clock is always supplied by the caller.
    pub fn current(today: NaiveDate) -> Self {
        Self::from_date(today)
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    /// Display as "FY 2024-25"
    pub fn label(&self) -> String {
        format!("FY {}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fiscal year '{0}' (expected e.g. \"FY 2024-25\", \"2024-25\" or \"2024\")")]
pub struct ParseFiscalYearError(String);

impl FromStr for FiscalYear {
    type Err = ParseFiscalYearError;

    /// Accepts "FY 2024-25", "2024-25" or a bare start year "2024".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFiscalYearError(s.to_string());
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("FY")
            .or_else(|| trimmed.strip_prefix("fy"))
            .unwrap_or(trimmed)
            .trim();

        let (start, suffix) = match body.split_once('-') {
            Some((start, suffix)) => (start, Some(suffix)),
            None => (body, None),
        };
        let start: i32 = start.trim().parse().map_err(|_| err())?;
        if let Some(suffix) = suffix {
            let suffix: i32 = suffix.trim().parse().map_err(|_| err())?;
            if suffix != (start + 1).rem_euclid(100) {
                return Err(err());
            }
        }
        Ok(FiscalYear(start))
    }
}

/// Annual LTCG exemption. Limits changed from FY 2024-25, so the schedule is
/// data rather than a match on the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExemptionSchedule {
    /// First fiscal year (start year) using `limit_from`
    pub cutoff_start_year: i32,
    /// Exemption for fiscal years before the cutoff
    #[schemars(with = "f64")]
    pub limit_before: Decimal,
    /// Exemption from the cutoff year onwards
    #[schemars(with = "f64")]
    pub limit_from: Decimal,
}

impl ExemptionSchedule {
    pub fn limit_for(&self, year: FiscalYear) -> Decimal {
        if year.start_year() >= self.cutoff_start_year {
            self.limit_from
        } else {
            self.limit_before
        }
    }
}

impl Default for ExemptionSchedule {
    fn default() -> Self {
        ExemptionSchedule {
            // FY 2024-25 onwards: ₹1,25,000
            cutoff_start_year: 2024,
            // Earlier years: ₹1,00,000
            limit_before: dec!(100000),
            limit_from: dec!(125000),
        }
    }
}

/// Parse the date encodings found in broker exports.
///
/// Supports ISO `2024-01-15` (with or without a time part), `15-01-2024`,
/// `15/01/2024`, `15 Jan 2024`, `15-Jan-2024` and spreadsheet serial day numbers.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // "2024-01-15T10:30:00" / "2024-01-15 10:30:00"
    if let (Some(date_part), Some(sep)) = (s.get(..10), s.get(10..11)) {
        if sep == "T" || sep == " " {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    for format in ["%d-%m-%Y", "%d/%m/%Y", "%d %b %Y", "%d-%b-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    parse_serial_date(s)
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn parse_serial_date(s: &str) -> Option<NaiveDate> {
    let whole = s.split('.').next()?;
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let days: i64 = whole.parse().ok()?;
    if !(1..=2_958_465).contains(&days) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fiscal_year_from_date_march_31() {
        // 31 March 2024 is the last day of FY 2023-24
        assert_eq!(FiscalYear::from_date(date(2024, 3, 31)), FiscalYear(2023));
    }

    #[test]
    fn fiscal_year_from_date_april_1() {
        assert_eq!(FiscalYear::from_date(date(2024, 4, 1)), FiscalYear(2024));
    }

    #[test]
    fn fiscal_year_from_date_january() {
        assert_eq!(FiscalYear::from_date(date(2025, 1, 15)), FiscalYear(2024));
    }

    #[test]
    fn fiscal_year_from_date_december() {
        assert_eq!(FiscalYear::from_date(date(2024, 12, 31)), FiscalYear(2024));
    }

    #[test]
    fn current_uses_injected_today() {
        assert_eq!(FiscalYear::current(date(2026, 2, 1)), FiscalYear(2025));
        assert_eq!(FiscalYear::current(date(2026, 10, 17)), FiscalYear(2026));
    }

    #[test]
    fn label_format() {
        assert_eq!(FiscalYear(2024).label(), "FY 2024-25");
        assert_eq!(FiscalYear(1999).label(), "FY 1999-00");
        assert_eq!(FiscalYear(2008).to_string(), "FY 2008-09");
    }

    #[test]
    fn parse_fiscal_year_strings() {
        assert_eq!("FY 2024-25".parse::<FiscalYear>(), Ok(FiscalYear(2024)));
        assert_eq!("2024-25".parse::<FiscalYear>(), Ok(FiscalYear(2024)));
        assert_eq!("2023".parse::<FiscalYear>(), Ok(FiscalYear(2023)));
        assert_eq!("FY 1999-00".parse::<FiscalYear>(), Ok(FiscalYear(1999)));
        assert!("2024-26".parse::<FiscalYear>().is_err());
        assert!("next year".parse::<FiscalYear>().is_err());
    }

    #[test]
    fn classify_supported_encodings() {
        assert_eq!(FiscalYear::classify("2024-05-10"), Some(FiscalYear(2024)));
        assert_eq!(FiscalYear::classify("2024-02-10T09:15:00"), Some(FiscalYear(2023)));
        assert_eq!(FiscalYear::classify("10-05-2024"), Some(FiscalYear(2024)));
        assert_eq!(FiscalYear::classify("10/02/2024"), Some(FiscalYear(2023)));
        assert_eq!(FiscalYear::classify("15 Jan 2025"), Some(FiscalYear(2024)));
        assert_eq!(FiscalYear::classify("15-Apr-2025"), Some(FiscalYear(2025)));
    }

    #[test]
    fn classify_unparsable_is_none() {
        assert_eq!(FiscalYear::classify(""), None);
        assert_eq!(FiscalYear::classify("N/A"), None);
        assert_eq!(FiscalYear::classify("2024-13-01"), None);
        assert_eq!(FiscalYear::classify("31 Feb 2024"), None);
    }

    #[test]
    fn parse_spreadsheet_serial() {
        // 45306 = 2024-01-15
        assert_eq!(parse_date("45306"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("45306.5"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("-5"), None);
    }

    #[test]
    fn exemption_limits_by_cutoff() {
        let schedule = ExemptionSchedule::default();
        assert_eq!(schedule.limit_for(FiscalYear(2023)), dec!(100000));
        assert_eq!(schedule.limit_for(FiscalYear(2024)), dec!(125000));
        assert_eq!(schedule.limit_for(FiscalYear(2030)), dec!(125000));
    }

    #[test]
    fn exemption_schedule_is_configurable() {
        let schedule = ExemptionSchedule {
            cutoff_start_year: 2027,
            limit_before: dec!(125000),
            limit_from: dec!(150000),
        };
        assert_eq!(schedule.limit_for(FiscalYear(2026)), dec!(125000));
        assert_eq!(schedule.limit_for(FiscalYear(2027)), dec!(150000));
    }
}
