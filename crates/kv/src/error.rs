use thiserror::Error;

/// Errors surfaced by the key-value coordination layer.
#[derive(Error, Debug)]
pub enum KvError {
    /// The underlying Redis connection or command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A request's nonce had already been consumed (`spec.md` §4.7).
    #[error("replay detected")]
    ReplayDetected,

    /// A payout amount exceeded the hard ceiling — never auto-approved,
    /// never rate-limited into existence (`spec.md` §4.6).
    #[error("hard max payout exceeded")]
    HardMaxExceeded,

    /// A payout amount exceeded the auto-approve ceiling and needs
    /// admin sign-off.
    #[error("approval required")]
    ApprovalRequired,

    /// The rolling daily payout total would be exceeded.
    #[error("daily payout max exceeded")]
    DailyMaxExceeded,

    /// The rolling hourly payout count would be exceeded.
    #[error("hourly payout count exceeded")]
    HourlyCountExceeded,
}
