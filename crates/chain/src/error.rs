use thiserror::Error;

/// Errors from address validation and chain RPC calls.
#[derive(Error, Debug)]
pub enum ChainError {
    /// An address failed its chain's format check.
    #[error(transparent)]
    Core(#[from] trustora_core::CoreError),

    /// Every configured RPC endpoint failed for every retry attempt.
    #[error("rpc request failed against all {url_count} endpoint(s) after {attempts} attempt(s)")]
    RpcExhausted { url_count: usize, attempts: u32 },

    /// An RPC endpoint returned a response this client couldn't parse.
    #[error("rpc response decode error: {0}")]
    Decode(String),
}
