//! The at-rest format for a signer's private key list: argon2id
//! stretches an operator-supplied passphrase into a 256-bit key, which
//! encrypts a JSON array of hex-encoded private keys under
//! ChaCha20-Poly1305. Grounded on `ghettobox`'s `crypto.rs` — the same
//! argon2id-then-AEAD shape, re-keyed for a flat key list instead of a
//! secret-sharing realm.

use argon2::{Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::KeysError;

const ARGON2_M_COST: u32 = 16 * 1024;
const ARGON2_T_COST: u32 = 32;
const ARGON2_P_COST: u32 = 1;
const KDF_OUTPUT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;

/// The on-disk envelope: a random salt, a random AEAD nonce, and the
/// ciphertext, all hex-encoded so the file is safe to inspect/copy as
/// text.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFileEnvelope {
    salt_hex: String,
    nonce_hex: String,
    ciphertext_hex: String,
}

fn derive_key(passphrase: &[u8], salt: &[u8]) -> Result<[u8; KDF_OUTPUT_LEN], KeysError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KDF_OUTPUT_LEN))
        .map_err(|err| KeysError::KdfFailed(err.to_string()))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);
    let mut output = [0u8; KDF_OUTPUT_LEN];
    argon2
        .hash_password_into(passphrase, salt, &mut output)
        .map_err(|err| KeysError::KdfFailed(err.to_string()))?;
    Ok(output)
}

/// Encrypts `private_keys` (hex strings) under `passphrase`, returning
/// the bytes to write to a key file.
pub fn encrypt_key_list(
    private_keys: &[String],
    passphrase: &str,
) -> Result<Vec<u8>, KeysError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase.as_bytes(), &salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|err| KeysError::EncryptionFailed(err.to_string()))?;
    let plaintext = serde_json::to_vec(private_keys)
        .map_err(|err| KeysError::Malformed(err.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
        .map_err(|err| KeysError::EncryptionFailed(err.to_string()))?;

    let envelope = KeyFileEnvelope {
        salt_hex: hex::encode(salt),
        nonce_hex: hex::encode(nonce_bytes),
        ciphertext_hex: hex::encode(ciphertext),
    };
    serde_json::to_vec_pretty(&envelope).map_err(|err| KeysError::Malformed(err.to_string()))
}

/// Decrypts a key file's bytes back into its private key list.
pub fn decrypt_key_list(file_bytes: &[u8], passphrase: &str) -> Result<Vec<String>, KeysError> {
    let envelope: KeyFileEnvelope =
        serde_json::from_slice(file_bytes).map_err(|err| KeysError::Malformed(err.to_string()))?;
    let salt = hex::decode(&envelope.salt_hex)
        .map_err(|err| KeysError::Malformed(format!("salt: {err}")))?;
    let nonce_bytes = hex::decode(&envelope.nonce_hex)
        .map_err(|err| KeysError::Malformed(format!("nonce: {err}")))?;
    let ciphertext = hex::decode(&envelope.ciphertext_hex)
        .map_err(|err| KeysError::Malformed(format!("ciphertext: {err}")))?;

    let key = derive_key(passphrase.as_bytes(), &salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|err| KeysError::DecryptionFailed(err.to_string()))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|err| KeysError::DecryptionFailed(err.to_string()))?;

    serde_json::from_slice(&plaintext).map_err(|err| KeysError::Malformed(err.to_string()))
}

/// Reads and decrypts a key file from disk.
pub fn load_key_file(path: &std::path::Path, passphrase: &str) -> Result<Vec<String>, KeysError> {
    let bytes = std::fs::read(path)?;
    decrypt_key_list(&bytes, passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_key_list() {
        let keys = vec!["aa".repeat(32), "bb".repeat(32)];
        let encrypted = encrypt_key_list(&keys, "correct horse battery staple").unwrap();
        let decrypted = decrypt_key_list(&encrypted, "correct horse battery staple").unwrap();
        assert_eq!(keys, decrypted);
    }

    #[test]
    fn wrong_passphrase_fails_to_decrypt() {
        let keys = vec!["aa".repeat(32)];
        let encrypted = encrypt_key_list(&keys, "right-passphrase").unwrap();
        assert!(decrypt_key_list(&encrypted, "wrong-passphrase").is_err());
    }

    #[test]
    fn file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tron_keys.enc");
        let keys = vec!["cc".repeat(32)];
        std::fs::write(&path, encrypt_key_list(&keys, "pw").unwrap()).unwrap();
        assert_eq!(load_key_file(&path, "pw").unwrap(), keys);
    }
}
