use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The fifteen states an escrow can be in, per `spec.md` §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    /// Row created, no deposit address issued yet.
    Created,
    /// Deposit address issued, waiting for a buyer transfer.
    AwaitingDeposit,
    /// A matching transfer has been observed, amount not yet reconciled.
    DepositSeen,
    /// Received amount equals expected amount; funds are escrowed.
    FundsLocked,
    /// Buyer has asked to release; awaiting processing.
    ReleaseRequested,
    /// Release has been approved (auto or admin) and is ready to pay out.
    ReleaseApproved,
    /// Payout has been accepted by the signer and is in flight.
    PayoutQueued,
    /// Payout transactions have been broadcast.
    PayoutSent,
    /// Deal is finished.
    Completed,
    /// A dispute has been opened.
    Disputed,
    /// Awaiting a review from buyer/seller.
    Review,
    /// Buyer or operator cancelled before funds locked.
    Cancelled,
    /// Deposit window elapsed with no deposit.
    Expired,
    /// Received amount is less than expected.
    Underpaid,
    /// Received amount is more than expected; needs manual review.
    OverpaidReview,
    /// A payout attempt failed and needs retry.
    PayoutFailed,
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::AwaitingDeposit => "AWAITING_DEPOSIT",
            Self::DepositSeen => "DEPOSIT_SEEN",
            Self::FundsLocked => "FUNDS_LOCKED",
            Self::ReleaseRequested => "RELEASE_REQUESTED",
            Self::ReleaseApproved => "RELEASE_APPROVED",
            Self::PayoutQueued => "PAYOUT_QUEUED",
            Self::PayoutSent => "PAYOUT_SENT",
            Self::Completed => "COMPLETED",
            Self::Disputed => "DISPUTED",
            Self::Review => "REVIEW",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
            Self::Underpaid => "UNDERPAID",
            Self::OverpaidReview => "OVERPAID_REVIEW",
            Self::PayoutFailed => "PAYOUT_FAILED",
        };
        f.write_str(s)
    }
}

/// Checks `(current, target)` against the allowed-transition table of
/// `spec.md` §4.1 and fails with [`CoreError::InvalidTransition`] if
/// the move isn't permitted.
///
/// This is deliberately a `match` over both states rather than a
/// `HashMap<EscrowStatus, HashSet<EscrowStatus>>` built at runtime: the
/// table is fixed at compile time, and `match` gives us exhaustiveness
/// checking if a new status is ever added without updating the table.
pub fn validate_transition(
    current: EscrowStatus,
    target: EscrowStatus,
) -> Result<(), CoreError> {
    use EscrowStatus::*;

    let allowed = matches!(
        (current, target),
        (Created, AwaitingDeposit)
            | (Created, Cancelled)
            | (AwaitingDeposit, DepositSeen)
            | (AwaitingDeposit, Expired)
            | (AwaitingDeposit, Cancelled)
            | (DepositSeen, FundsLocked)
            | (DepositSeen, Underpaid)
            | (DepositSeen, OverpaidReview)
            | (Underpaid, AwaitingDeposit)
            | (Underpaid, Cancelled)
            | (OverpaidReview, Review)
            | (FundsLocked, ReleaseRequested)
            | (FundsLocked, Disputed)
            | (ReleaseRequested, ReleaseApproved)
            | (ReleaseRequested, Disputed)
            | (ReleaseApproved, PayoutQueued)
            | (PayoutQueued, PayoutSent)
            | (PayoutQueued, PayoutFailed)
            | (PayoutSent, Completed)
            | (Completed, Review)
            | (Disputed, Review)
            | (Disputed, ReleaseApproved)
            | (Review, Completed)
            | (PayoutFailed, ReleaseApproved)
    );

    if allowed {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from: current, to: target })
    }
}

#[cfg(feature = "db")]
mod sqlx_impl {
    use super::EscrowStatus;
    use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
    use sqlx::Type;

    impl Type<sqlx::Postgres> for EscrowStatus {
        fn type_info() -> PgTypeInfo {
            PgTypeInfo::with_name("escrowstatus")
        }
    }

    impl PgHasArrayType for EscrowStatus {
        fn array_type_info() -> PgTypeInfo {
            PgTypeInfo::with_name("_escrowstatus")
        }
    }

    impl<'r> sqlx::Decode<'r, sqlx::Postgres> for EscrowStatus {
        fn decode(
            value: sqlx::postgres::PgValueRef<'r>,
        ) -> Result<Self, sqlx::error::BoxDynError> {
            use EscrowStatus::*;
            let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
            Ok(match s {
                "CREATED" => Created,
                "AWAITING_DEPOSIT" => AwaitingDeposit,
                "DEPOSIT_SEEN" => DepositSeen,
                "FUNDS_LOCKED" => FundsLocked,
                "RELEASE_REQUESTED" => ReleaseRequested,
                "RELEASE_APPROVED" => ReleaseApproved,
                "PAYOUT_QUEUED" => PayoutQueued,
                "PAYOUT_SENT" => PayoutSent,
                "COMPLETED" => Completed,
                "DISPUTED" => Disputed,
                "REVIEW" => Review,
                "CANCELLED" => Cancelled,
                "EXPIRED" => Expired,
                "UNDERPAID" => Underpaid,
                "OVERPAID_REVIEW" => OverpaidReview,
                "PAYOUT_FAILED" => PayoutFailed,
                other => return Err(format!("unknown escrow status: {other}").into()),
            })
        }
    }

    impl<'q> sqlx::Encode<'q, sqlx::Postgres> for EscrowStatus {
        fn encode_by_ref(
            &self,
            buf: &mut sqlx::postgres::PgArgumentBuffer,
        ) -> sqlx::encode::IsNull {
            <String as sqlx::Encode<sqlx::Postgres>>::encode(self.to_string(), buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transition_is_accepted() {
        validate_transition(EscrowStatus::Created, EscrowStatus::AwaitingDeposit).unwrap();
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let err =
            validate_transition(EscrowStatus::Created, EscrowStatus::Completed).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidTransition {
                from: EscrowStatus::Created,
                to: EscrowStatus::Completed
            }
        );
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for target in [
            EscrowStatus::Created,
            EscrowStatus::AwaitingDeposit,
            EscrowStatus::FundsLocked,
            EscrowStatus::Completed,
        ] {
            assert!(validate_transition(EscrowStatus::Expired, target).is_err());
            assert!(validate_transition(EscrowStatus::Cancelled, target).is_err());
        }
    }

    #[test]
    fn underpaid_has_no_direct_path_to_funds_locked() {
        // Open question in spec.md §9: preserved exactly, not inferred.
        assert!(
            validate_transition(EscrowStatus::Underpaid, EscrowStatus::FundsLocked).is_err()
        );
    }

    #[test]
    fn disputed_can_resume_to_release_approved() {
        validate_transition(EscrowStatus::Disputed, EscrowStatus::ReleaseApproved).unwrap();
    }

    #[test]
    fn payout_sent_can_only_reach_completed() {
        validate_transition(EscrowStatus::PayoutSent, EscrowStatus::Completed).unwrap();
        assert!(validate_transition(EscrowStatus::PayoutSent, EscrowStatus::PayoutQueued)
            .is_err());
    }
}
