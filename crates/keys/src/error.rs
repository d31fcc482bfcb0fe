use thiserror::Error;

/// Errors from the encrypted key-file format and key pool lookups.
#[derive(Error, Debug)]
pub enum KeysError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("malformed key file: {0}")]
    Malformed(String),

    #[error(transparent)]
    Chain(#[from] trustora_chain::ChainError),

    #[error("no deposit address available for chain")]
    PoolExhausted,

    #[error("no signing key for address {0}")]
    NoKeyForAddress(String),
}
