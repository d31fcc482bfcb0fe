use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::quantize;

/// A `{flat, percent, threshold}` triple captured verbatim on an
/// escrow at creation time (`spec.md` §4.2). Later config changes
/// never retroactively alter an existing escrow's fee: this struct is
/// an owned snapshot, never a reference into the live config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSnapshot {
    /// Flat fee charged when `amount <= threshold`.
    pub flat: Decimal,
    /// Fraction of `amount` charged when `amount > threshold`.
    pub percent: Decimal,
    /// The flat/percent boundary.
    pub threshold: Decimal,
}

impl Default for FeeSnapshot {
    fn default() -> Self {
        Self { flat: Decimal::new(5, 0), percent: Decimal::new(2, 2), threshold: Decimal::new(100, 0) }
    }
}

/// Computes the fee for `amount` under `snapshot`, per `spec.md` §4.2:
/// flat below-or-at the threshold, percent above it.
pub fn calculate_fee(amount: Decimal, snapshot: &FeeSnapshot) -> Decimal {
    if amount <= snapshot.threshold {
        quantize(snapshot.flat)
    } else {
        quantize(amount * snapshot.percent)
    }
}

/// Computes `amount - calculate_fee(amount, snapshot)`, quantized.
pub fn calculate_net(amount: Decimal, snapshot: &FeeSnapshot) -> Decimal {
    quantize(amount - calculate_fee(amount, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fee_boundary_at_exactly_threshold_uses_flat() {
        let snapshot = FeeSnapshot::default();
        assert_eq!(calculate_fee(dec!(100), &snapshot), dec!(5.000000));
    }

    #[test]
    fn fee_boundary_just_above_threshold_uses_percent() {
        let snapshot = FeeSnapshot::default();
        assert_eq!(calculate_fee(dec!(100.000001), &snapshot), dec!(2.000000));
    }

    #[test]
    fn concrete_scenario_fee_at_fifty() {
        let snapshot = FeeSnapshot::default();
        assert_eq!(calculate_fee(dec!(50), &snapshot), dec!(5.000000));
        assert_eq!(calculate_net(dec!(50), &snapshot), dec!(45.000000));
    }

    #[test]
    fn concrete_scenario_fee_at_two_hundred() {
        let snapshot = FeeSnapshot::default();
        assert_eq!(calculate_fee(dec!(200), &snapshot), dec!(4.000000));
        assert_eq!(calculate_net(dec!(200), &snapshot), dec!(196.000000));
    }

    #[test]
    fn fee_plus_net_equals_amount() {
        let snapshot = FeeSnapshot::default();
        for amount in [dec!(10), dec!(100), dec!(100.000001), dec!(987.654321)] {
            let fee = calculate_fee(amount, &snapshot);
            let net = calculate_net(amount, &snapshot);
            assert_eq!(fee + net, quantize(amount));
        }
    }
}
