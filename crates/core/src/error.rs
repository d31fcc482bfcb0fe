use thiserror::Error;

/// Domain-level errors shared by every process that links against
/// [`crate`]. Transport-specific code (HTTP status codes, user-facing
/// bot copy) lives in the binaries and converts into/out of this enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A state transition was attempted that is not present in the
    /// allowed-transition table. This is a fatal/programmer error per
    /// the error taxonomy: it must never be silently swallowed.
    #[error("invalid transition {from:?} -> {to:?}")]
    InvalidTransition {
        /// The status the escrow was in.
        from: crate::state_machine::EscrowStatus,
        /// The status the caller attempted to move it to.
        to: crate::state_machine::EscrowStatus,
    },

    /// The request's `timestamp` field fell outside the allowed skew
    /// window.
    #[error("timestamp expired")]
    TimestampExpired,

    /// The request's `nonce` had already been consumed.
    #[error("replay detected")]
    ReplayDetected,

    /// The HMAC signature did not match.
    #[error("invalid signature")]
    InvalidSignature,

    /// A chain identifier outside {TRC20, BEP20} was supplied.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    /// An address did not match its chain's address format.
    #[error("invalid address for chain: {0}")]
    InvalidAddress(String),

    /// An amount string could not be parsed as a 6-decimal amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
