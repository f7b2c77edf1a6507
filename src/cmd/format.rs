//! Rupee and quantity formatting shared by the commands

use rust_decimal::{Decimal, RoundingStrategy};

/// Whole rupees with Indian digit grouping, e.g. `₹1,25,000`
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}₹{}", sign, group_indian(&rounded.abs().trunc().to_string()))
}

/// As [`format_inr`] with an explicit `+` on gains
pub fn format_inr_signed(amount: Decimal) -> String {
    let formatted = format_inr(amount);
    if amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) > Decimal::ZERO {
        format!("+{}", formatted)
    } else {
        formatted
    }
}

pub fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.4}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

pub fn format_percent(ratio: Decimal) -> String {
    format!("{:.1}%", ratio * Decimal::ONE_HUNDRED)
}

// last three digits, then groups of two: 12,34,56,789
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
