//! Pure idempotency predicates over an escrow's hash fields. The
//! database's unique constraints on `(chain, deposit_tx_hash)` are the
//! second line of defense (`spec.md` §9) — these predicates are the
//! first, application-level check.

/// Minimal view of an escrow's hash-bearing fields needed to decide
/// idempotency, so callers in `trustora-db` don't need to depend back
/// on this crate's full escrow row type.
pub trait EscrowHashes {
    /// The deposit transaction hash recorded so far, if any.
    fn deposit_tx_hash(&self) -> Option<&str>;
    /// The payout transaction hash recorded so far, if any.
    fn payout_tx_hash(&self) -> Option<&str>;
}

/// True iff the escrow has no prior deposit hash, or the stored hash
/// equals `tx_hash` (a repeat observation of the same transaction).
pub fn can_record_deposit(escrow: &impl EscrowHashes, tx_hash: &str) -> bool {
    match escrow.deposit_tx_hash() {
        None => true,
        Some(existing) => existing == tx_hash,
    }
}

/// True iff no payout has been sent for this escrow yet.
pub fn can_send_payout(escrow: &impl EscrowHashes) -> bool {
    escrow.payout_tx_hash().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        deposit: Option<&'static str>,
        payout: Option<&'static str>,
    }

    impl EscrowHashes for Dummy {
        fn deposit_tx_hash(&self) -> Option<&str> {
            self.deposit
        }
        fn payout_tx_hash(&self) -> Option<&str> {
            self.payout
        }
    }

    #[test]
    fn deposit_idempotency() {
        let mut escrow = Dummy { deposit: None, payout: None };
        assert!(can_record_deposit(&escrow, "tx1"));
        escrow.deposit = Some("tx1");
        assert!(can_record_deposit(&escrow, "tx1"));
        assert!(!can_record_deposit(&escrow, "tx2"));
    }

    #[test]
    fn payout_idempotency() {
        let mut escrow = Dummy { deposit: None, payout: None };
        assert!(can_send_payout(&escrow));
        escrow.payout = Some("tx1");
        assert!(!can_send_payout(&escrow));
    }
}
