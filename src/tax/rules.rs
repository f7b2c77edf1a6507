use super::fiscal::{ExemptionSchedule, FiscalYear};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Regime parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxRules {
    #[serde(default)]
    pub exemption: ExemptionSchedule,
    /// LTCG rate applied to exempted amounts when reporting savings
    #[serde(default = "default_ltcg_rate")]
    #[schemars(with = "f64")]
    pub ltcg_rate: Decimal,
}

fn default_ltcg_rate() -> Decimal {
    // 12.5% from 23 July 2024
    dec!(0.125)
}

impl Default for TaxRules {
    fn default() -> Self {
        TaxRules {
            exemption: ExemptionSchedule::default(),
            ltcg_rate: default_ltcg_rate(),
        }
    }
}

impl TaxRules {
    pub fn exemption_limit(&self, year: FiscalYear) -> Decimal {
        self.exemption.limit_for(year)
    }

    /// Tax on `amount` at the LTCG rate, rounded to whole rupees
    pub fn tax_on(&self, amount: Decimal) -> Decimal {
        (amount * self.ltcg_rate).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Read rules from JSON; missing fields take the defaults
pub fn read_rules_json<R: Read>(reader: R) -> serde_json::Result<TaxRules> {
    serde_json::from_reader(reader)
}
