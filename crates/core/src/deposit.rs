use rust_decimal::Decimal;

use crate::amount::quantize;
use crate::state_machine::EscrowStatus;

/// The two-step sequence a reconciled deposit always drives: first
/// `DEPOSIT_SEEN`, then exactly one of `FUNDS_LOCKED`/`UNDERPAID`/
/// `OVERPAID_REVIEW` depending on how `amount_received` compares to
/// `amount_expected` (`spec.md` §4.1, §8 boundary cases).
pub fn deposit_status_sequence(
    amount_received: Decimal,
    amount_expected: Decimal,
) -> [EscrowStatus; 2] {
    let received = quantize(amount_received);
    let expected = quantize(amount_expected);
    let second = match received.cmp(&expected) {
        std::cmp::Ordering::Less => EscrowStatus::Underpaid,
        std::cmp::Ordering::Equal => EscrowStatus::FundsLocked,
        std::cmp::Ordering::Greater => EscrowStatus::OverpaidReview,
    };
    [EscrowStatus::DepositSeen, second]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn exact_amount_locks_funds() {
        assert_eq!(
            deposit_status_sequence(dec!(50), dec!(50)),
            [EscrowStatus::DepositSeen, EscrowStatus::FundsLocked]
        );
    }

    #[test]
    fn one_micro_unit_under_is_underpaid() {
        assert_eq!(
            deposit_status_sequence(dec!(99.999999), dec!(100)),
            [EscrowStatus::DepositSeen, EscrowStatus::Underpaid]
        );
    }

    #[test]
    fn one_micro_unit_over_is_overpaid_review() {
        assert_eq!(
            deposit_status_sequence(dec!(100.000001), dec!(100)),
            [EscrowStatus::DepositSeen, EscrowStatus::OverpaidReview]
        );
    }
}
