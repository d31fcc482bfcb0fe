use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::CoreError;

/// All monetary values in this system are fixed-point decimals at this
/// scale (`spec.md` §4.2).
pub const SCALE: u32 = 6;

/// One USDT micro-unit, as both chains represent native amounts.
const MICRO_UNITS_PER_TOKEN: i64 = 1_000_000;

/// Quantizes `value` to [`SCALE`] fractional digits, rounding toward
/// zero (never a binary float; `spec.md` §9).
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::ToZero)
}

/// Parses a decimal amount from a string, coercing to [`SCALE`] digits
/// with round-down, per `spec.md` §4.2.
pub fn parse_amount(raw: &str) -> Result<Decimal, CoreError> {
    let parsed =
        Decimal::from_str(raw.trim()).map_err(|_| CoreError::InvalidAmount(raw.to_owned()))?;
    Ok(quantize(parsed))
}

/// Formats `value` with exactly six fractional digits, the canonical
/// representation used inside HMAC payloads (`spec.md` §4.2).
pub fn format_amount(value: Decimal) -> String {
    format!("{:.6}", quantize(value))
}

/// Converts a decimal amount to the signed 64-bit on-chain micro-unit
/// representation (`value * 10^6`) used natively by both chains'
/// USDT contracts.
pub fn to_micro_units(value: Decimal) -> i64 {
    let quantized = quantize(value);
    let scaled = quantized * Decimal::from(MICRO_UNITS_PER_TOKEN);
    scaled.round_dp_with_strategy(0, RoundingStrategy::ToZero).try_into().unwrap_or(i64::MAX)
}

/// Converts raw on-chain micro-units back to a decimal amount.
pub fn from_micro_units(micro: i64) -> Decimal {
    quantize(Decimal::from(micro) / Decimal::from(MICRO_UNITS_PER_TOKEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantize_rounds_toward_zero() {
        assert_eq!(quantize(dec!(1.1234567)), dec!(1.123456));
        assert_eq!(quantize(dec!(-1.1234567)), dec!(-1.123456));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(parse_amount("not-a-number").is_err());
    }

    #[test]
    fn format_amount_has_six_digits() {
        assert_eq!(format_amount(dec!(5)), "5.000000");
        assert_eq!(format_amount(dec!(45.5)), "45.500000");
    }

    #[test]
    fn micro_unit_round_trip() {
        let amount = dec!(50.000000);
        assert_eq!(to_micro_units(amount), 50_000_000);
        assert_eq!(from_micro_units(50_000_000), amount);
    }

    #[test]
    fn boundary_underpaid_and_overpaid_by_one_micro_unit() {
        let expected = dec!(100);
        let under = quantize(expected - dec!(0.000001));
        let over = quantize(expected + dec!(0.000001));
        assert!(under < expected);
        assert!(over > expected);
    }
}
