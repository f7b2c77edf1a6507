//! Loss set-off between short and long term buckets.
//!
//! Short-term losses may be set off against short-term gains and then against
//! long-term gains. Long-term losses may only be set off against long-term
//! gains, never against short-term gains.

use super::aggregate::GainLossTotals;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OffsetResult {
    pub net_short_gain: Decimal,
    pub net_long_gain: Decimal,
    /// Short-term loss left after netting short-term gains
    pub remaining_short_loss: Decimal,
    /// Portion of `remaining_short_loss` actually absorbed by long-term gains
    pub short_loss_applied_to_long: Decimal,
}

/// Apply set-off rules in fixed order:
/// 1. Short-term losses against short-term gains
/// 2. Long-term losses against long-term gains
/// 3. Leftover short-term losses against what remains of long-term gains
pub fn apply_offsets(
    short_gain: Decimal,
    short_loss: Decimal,
    long_gain: Decimal,
    long_loss: Decimal,
) -> OffsetResult {
    let net_short_gain = (short_gain - short_loss).max(Decimal::ZERO);
    let remaining_short_loss = (short_loss - short_gain).max(Decimal::ZERO);

    let long_after_long_loss = (long_gain - long_loss).max(Decimal::ZERO);
    let net_long_gain = (long_gain - long_loss - remaining_short_loss).max(Decimal::ZERO);
    let short_loss_applied_to_long = remaining_short_loss.min(long_after_long_loss);

    OffsetResult {
        net_short_gain,
        net_long_gain,
        remaining_short_loss,
        short_loss_applied_to_long,
    }
}

impl GainLossTotals {
    pub fn offset(&self) -> OffsetResult {
        apply_offsets(self.short_gain, self.short_loss, self.long_gain, self.long_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn long_loss_never_reduces_short_gain() {
        let result = apply_offsets(dec!(1000), dec!(0), dec!(0), dec!(1000));
        assert_eq!(result.net_short_gain, dec!(1000));
        assert_eq!(result.net_long_gain, dec!(0));
        assert_eq!(result.remaining_short_loss, dec!(0));
    }

    #[test]
    fn short_loss_spills_over_to_long_gain() {
        let result = apply_offsets(dec!(0), dec!(500), dec!(1000), dec!(0));
        assert_eq!(result.net_short_gain, dec!(0));
        assert_eq!(result.net_long_gain, dec!(500));
        assert_eq!(result.remaining_short_loss, dec!(500));
        assert_eq!(result.short_loss_applied_to_long, dec!(500));
    }

    #[test]
    fn short_loss_nets_short_gain_first() {
        let result = apply_offsets(dec!(300), dec!(500), dec!(1000), dec!(0));
        assert_eq!(result.net_short_gain, dec!(0));
        assert_eq!(result.remaining_short_loss, dec!(200));
        assert_eq!(result.net_long_gain, dec!(800));
    }

    #[test]
    fn long_loss_applied_before_short_spillover() {
        // 1000 LTCG - 700 LTCL leaves 300; only 300 of the 500 STCL is absorbed
        let result = apply_offsets(dec!(0), dec!(500), dec!(1000), dec!(700));
        assert_eq!(result.net_long_gain, dec!(0));
        assert_eq!(result.remaining_short_loss, dec!(500));
        assert_eq!(result.short_loss_applied_to_long, dec!(300));
    }

    #[test]
    fn excess_long_loss_floors_at_zero() {
        let result = apply_offsets(dec!(2000), dec!(100), dec!(1000), dec!(5000));
        assert_eq!(result.net_short_gain, dec!(1900));
        assert_eq!(result.net_long_gain, dec!(0));
        assert_eq!(result.short_loss_applied_to_long, dec!(0));
    }

    #[test]
    fn all_zero_inputs() {
        let result = apply_offsets(dec!(0), dec!(0), dec!(0), dec!(0));
        assert_eq!(result, OffsetResult::default());
    }

    #[test]
    fn nets_never_negative() {
        let amounts = [dec!(0), dec!(1), dec!(250.5), dec!(1000), dec!(99999.99)];
        for &sg in &amounts {
            for &sl in &amounts {
                for &lg in &amounts {
                    for &ll in &amounts {
                        let r = apply_offsets(sg, sl, lg, ll);
                        assert!(r.net_short_gain >= Decimal::ZERO);
                        assert!(r.net_long_gain >= Decimal::ZERO);
                        assert!(r.remaining_short_loss >= Decimal::ZERO);
                        assert!(r.short_loss_applied_to_long <= r.remaining_short_loss);
                        // long losses never touch short gains
                        assert_eq!(r.net_short_gain, (sg - sl).max(Decimal::ZERO));
                    }
                }
            }
        }
    }

    #[test]
    fn offset_from_totals() {
        let totals = GainLossTotals {
            short_gain: dec!(10000),
            short_loss: dec!(15000),
            long_gain: dec!(150000),
            long_loss: dec!(20000),
        };
        let result = totals.offset();
        assert_eq!(result.net_short_gain, dec!(0));
        assert_eq!(result.net_long_gain, dec!(125000));
    }
}
