pub mod aggregate;
pub mod fiscal;
pub mod harvest;
pub mod history;
pub mod offset;
pub mod records;
pub mod rules;
pub mod summary;
pub mod warnings;

pub use aggregate::{group_by_instrument, GainLossTotals, InstrumentSummary};
pub use fiscal::{parse_date, FiscalYear};
pub use harvest::{AssetFilter, HarvestPlan};
pub use history::{analyze_history, FiscalYearReport};
pub use records::HoldingPosition;
pub use rules::TaxRules;
pub use summary::{compute_filing_year_summary, FilingYearSummary};
