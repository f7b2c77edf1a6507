//! LTCG harvesting: choose holdings to sell and immediately repurchase so that
//! realised long-term gains use up, but never exceed, the annual exemption.
//!
//! Selection is greedy by efficiency (gain as a fraction of current value),
//! which favours positions that realise the most gain per rupee of capital
//! cycled through the market. It is a heuristic; an exact answer is a bounded
//! knapsack. Ties keep their input order and only equity quantities are
//! rounded down, so results are reproducible.

use super::records::{AssetClass, HoldingPosition};
use rust_decimal::Decimal;
use serde::Serialize;

/// Which holdings may be sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFilter {
    Fund,
    Equity,
    #[default]
    Both,
}

impl AssetFilter {
    pub fn matches(&self, class: AssetClass) -> bool {
        match self {
            AssetFilter::Fund => class == AssetClass::Fund,
            AssetFilter::Equity => class == AssetClass::Equity,
            AssetFilter::Both => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarvestStatus {
    /// Realised LTCG already uses the whole exemption
    ExemptionExhausted,
    /// No eligible holding produced a sale
    NoCandidates,
    /// Exemption filled exactly
    Filled,
    /// Candidates ran out before the exemption was filled
    PartiallyFilled,
}

impl HarvestStatus {
    pub fn display(&self) -> &'static str {
        match self {
            HarvestStatus::ExemptionExhausted => "LTCG exemption already exhausted",
            HarvestStatus::NoCandidates => "No eligible holdings with unrealised gains",
            HarvestStatus::Filled => "Exemption fully used",
            HarvestStatus::PartiallyFilled => "Exemption partially used, no further candidates",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposalRecommendation {
    pub instrument: String,
    pub asset_class: AssetClass,
    /// Fractional for funds, whole shares for equities
    pub units_to_sell: Decimal,
    pub gain_realized: Decimal,
    /// Cash needed to buy the units back
    pub capital_required: Decimal,
    /// Ranking key only
    pub efficiency: Decimal,
    pub full_disposal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestPlan {
    pub status: HarvestStatus,
    pub remaining_exemption: Decimal,
    pub recommendations: Vec<DisposalRecommendation>,
    pub total_gain_harvested: Decimal,
    pub total_capital_required: Decimal,
}

impl HarvestPlan {
    fn empty(status: HarvestStatus, remaining_exemption: Decimal) -> Self {
        HarvestPlan {
            status,
            remaining_exemption,
            recommendations: Vec::new(),
            total_gain_harvested: Decimal::ZERO,
            total_capital_required: Decimal::ZERO,
        }
    }

    /// Exemption left unused after the plan
    pub fn unfilled(&self) -> Decimal {
        (self.remaining_exemption - self.total_gain_harvested).max(Decimal::ZERO)
    }
}

struct Candidate<'a> {
    holding: &'a HoldingPosition,
    /// Units that may be sold: whole shares for equities
    units: Decimal,
    /// Gain and value of selling all of `units`
    gain: Decimal,
    value: Decimal,
    gain_per_unit: Decimal,
    price_per_unit: Decimal,
    efficiency: Decimal,
}

impl<'a> Candidate<'a> {
    fn new(holding: &'a HoldingPosition, filter: AssetFilter) -> Option<Self> {
        if holding.lock_in_excluded || !filter.matches(holding.asset_class) {
            return None;
        }
        let gain = holding.unrealized_gain();
        if gain <= Decimal::ZERO {
            return None;
        }
        let (Some(gain_per_unit), Some(price_per_unit), Some(efficiency)) = (
            holding.gain_per_unit(),
            holding.price_per_unit(),
            holding.efficiency(),
        ) else {
            log::warn!(
                "Skipping {}: zero quantity or value (qty={}, value={})",
                holding.instrument,
                holding.quantity,
                holding.current_value
            );
            return None;
        };
        let (units, gain, value) = match holding.asset_class {
            AssetClass::Equity if !holding.quantity.fract().is_zero() => {
                let units = holding.quantity.floor();
                log::debug!(
                    "{}: fractional share quantity {}, only {} whole shares sellable",
                    holding.instrument,
                    holding.quantity,
                    units
                );
                (units, units * gain_per_unit, units * price_per_unit)
            }
            _ => (holding.quantity, gain, holding.current_value),
        };
        if units.is_zero() {
            return None;
        }
        Some(Candidate {
            holding,
            units,
            gain,
            value,
            gain_per_unit,
            price_per_unit,
            efficiency,
        })
    }

    /// Sale filling at most `remaining_to_fill`, `None` if nothing can be sold
    fn sale(&self, remaining_to_fill: Decimal) -> Option<DisposalRecommendation> {
        let holding = self.holding;
        let (units, gain, capital, full) = if self.gain <= remaining_to_fill {
            (self.units, self.gain, self.value, self.units == holding.quantity)
        } else {
            let units = remaining_to_fill / self.gain_per_unit;
            let (units, gain) = match holding.asset_class {
                AssetClass::Equity => {
                    let units = units.floor();
                    (units, (units * self.gain_per_unit).min(remaining_to_fill))
                }
                // fractional units fill the remainder exactly, up to division residue
                AssetClass::Fund => (units, remaining_to_fill),
            };
            (units, gain, units * self.price_per_unit, false)
        };

        if units <= Decimal::ZERO || gain <= Decimal::ZERO {
            log::debug!(
                "{}: partial sale rounds to nothing (remaining {})",
                holding.instrument,
                remaining_to_fill
            );
            return None;
        }

        Some(DisposalRecommendation {
            instrument: holding.instrument.clone(),
            asset_class: holding.asset_class,
            units_to_sell: units.normalize(),
            gain_realized: gain,
            capital_required: capital,
            efficiency: self.efficiency,
            full_disposal: full,
        })
    }
}

/// Plan disposals that fill `remaining_exemption` from `holdings`.
pub fn recommend_disposals(
    remaining_exemption: Decimal,
    holdings: &[HoldingPosition],
    filter: AssetFilter,
) -> HarvestPlan {
    if remaining_exemption <= Decimal::ZERO {
        return HarvestPlan::empty(HarvestStatus::ExemptionExhausted, Decimal::ZERO);
    }

    let mut candidates: Vec<Candidate> = holdings
        .iter()
        .filter_map(|h| Candidate::new(h, filter))
        .collect();
    // stable: equal efficiency keeps input order
    candidates.sort_by(|a, b| b.efficiency.cmp(&a.efficiency));

    let mut recommendations = Vec::new();
    let mut accumulated = Decimal::ZERO;
    let mut capital = Decimal::ZERO;

    for candidate in &candidates {
        if accumulated >= remaining_exemption {
            break;
        }
        let remaining_to_fill = remaining_exemption - accumulated;
        if let Some(sale) = candidate.sale(remaining_to_fill) {
            log::debug!(
                "Sell {} {} of {} for gain {}",
                sale.units_to_sell,
                sale.asset_class,
                sale.instrument,
                sale.gain_realized
            );
            accumulated += sale.gain_realized;
            capital += sale.capital_required;
            recommendations.push(sale);
        }
    }

    let status = if recommendations.is_empty() {
        HarvestStatus::NoCandidates
    } else if accumulated >= remaining_exemption {
        HarvestStatus::Filled
    } else {
        HarvestStatus::PartiallyFilled
    };

    HarvestPlan {
        status,
        remaining_exemption,
        recommendations,
        total_gain_harvested: accumulated,
        total_capital_required: capital,
    }
}

/// Plan disposals given this year's net LTCG and exemption limit.
pub fn allocate(
    net_long_gain: Decimal,
    exemption_limit: Decimal,
    holdings: &[HoldingPosition],
    filter: AssetFilter,
) -> HarvestPlan {
    let remaining = (exemption_limit - net_long_gain).max(Decimal::ZERO);
    recommend_disposals(remaining, holdings, filter)
}
