use redis::AsyncCommands;
use rust_decimal::Decimal;

use crate::error::KvError;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// The payout ceilings and limits configured for auto-approval, per
/// `spec.md` §4.6. All four bounds are enforced before a payout is
/// ever queued.
#[derive(Debug, Clone, Copy)]
pub struct PayoutLimits {
    pub auto_payout_max: Decimal,
    pub hard_max_payout: Decimal,
    pub daily_payout_max: Decimal,
    pub payouts_per_hour_max: i64,
}

/// Checks `amount` against the hard/auto ceilings, then increments and
/// checks the rolling daily/hourly counters, mirroring
/// `original_source`'s `check_and_track_limits`. `now` is passed in by
/// the caller (UTC) so this stays deterministic under test.
pub async fn check_and_track_limits(
    conn: &mut redis::aio::ConnectionManager,
    amount: Decimal,
    limits: &PayoutLimits,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), KvError> {
    if amount > limits.hard_max_payout {
        return Err(KvError::HardMaxExceeded);
    }
    if amount > limits.auto_payout_max {
        return Err(KvError::ApprovalRequired);
    }

    let day_key = format!("payouts:day:{}", now.format("%Y%m%d"));
    let hour_key = format!("payouts:hour:{}", now.format("%Y%m%d%H"));

    let amount_f64: f64 = amount.try_into().unwrap_or(f64::MAX);
    let day_total: f64 = conn.incr(&day_key, amount_f64).await?;
    if day_total == amount_f64 {
        let _: () = conn.expire(&day_key, SECONDS_PER_DAY).await?;
    }
    if Decimal::try_from(day_total).unwrap_or(Decimal::MAX) > limits.daily_payout_max {
        return Err(KvError::DailyMaxExceeded);
    }

    let hour_count: i64 = conn.incr(&hour_key, 1).await?;
    if hour_count == 1 {
        let _: () = conn.expire(&hour_key, SECONDS_PER_HOUR).await?;
    }
    if hour_count > limits.payouts_per_hour_max {
        return Err(KvError::HourlyCountExceeded);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn limits_hold_the_spec_defaults() {
        let limits = PayoutLimits {
            auto_payout_max: dec!(200),
            hard_max_payout: dec!(1000),
            daily_payout_max: dec!(1000),
            payouts_per_hour_max: 10,
        };
        assert!(dec!(200) <= limits.auto_payout_max);
        assert!(dec!(1000) <= limits.hard_max_payout);
    }
}
