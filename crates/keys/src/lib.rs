//! Encrypted key-file format and per-chain signing key pools used by
//! the signer binary and the keytool CLI.

pub mod error;
pub mod keyfile;
pub mod pool;

pub use error::KeysError;
pub use keyfile::{decrypt_key_list, encrypt_key_list, load_key_file};
pub use pool::GasFundedKeyPool;
