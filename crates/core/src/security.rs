//! The authenticated request envelope shared by every Coordinator→Signer
//! call (`spec.md` §4.7): a `timestamp`, a client-random `nonce`, and an
//! HMAC-SHA256 `signature` over a fixed `|`-joined field ordering.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock skew between a request's `timestamp` and the
/// verifier's clock, in seconds. Exactly 60s is accepted; anything
/// beyond is rejected (`spec.md` §8 boundary case).
pub const TIMESTAMP_SKEW_SECONDS: i64 = 60;

/// Nonce replay TTL enforced by the key-value coordinator.
pub const NONCE_TTL_SECONDS: u64 = 120;

/// Number of random bytes used to generate a nonce: 18 bytes is 144
/// bits of entropy, comfortably over the "≥128 bits" requirement of
/// `spec.md` §4.7.
const NONCE_BYTES: usize = 18;

/// Signs `message` with `secret` using HMAC-SHA256, returning lowercase
/// hex, per `spec.md` §4.7.
pub fn sign_hmac(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies `signature` against `message` under `secret` using a
/// constant-time comparison, per `spec.md` §4.7.
pub fn verify_hmac(secret: &str, message: &str, signature: &str) -> bool {
    let expected = sign_hmac(secret, message);
    // `ct_eq` needs equal-length inputs; comparing the expected (fixed
    // 64-char hex digest) to an attacker-controlled string shorter or
    // longer than that must not short-circuit the length check in a
    // way that leaks how much of the prefix matched, so we first settle
    // length out-of-band and fall through to a constant-time body
    // comparison only when lengths already agree.
    if expected.len() != signature.len() {
        return false;
    }
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Generates a single-use, base64url-without-padding nonce.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Checks that `timestamp` (unix seconds) is within
/// [`TIMESTAMP_SKEW_SECONDS`] of `now`. Exactly at the boundary is
/// rejected per `spec.md` §8.
pub fn verify_timestamp(timestamp: i64, now: i64) -> Result<(), CoreError> {
    if (now - timestamp).abs() >= TIMESTAMP_SKEW_SECONDS {
        Err(CoreError::TimestampExpired)
    } else {
        Ok(())
    }
}

/// Builds the `/address` HMAC payload: `"address|{chain}|{timestamp}|{nonce}"`.
pub fn address_message(chain: &str, timestamp: i64, nonce: &str) -> String {
    format!("address|{chain}|{timestamp}|{nonce}")
}

/// Builds the `/payout` HMAC payload:
/// `"{escrow_id}|{chain}|{payout_address}|{amount}|{timestamp}|{nonce}"`.
pub fn payout_message(
    escrow_id: &str,
    chain: &str,
    payout_address: &str,
    amount: &str,
    timestamp: i64,
    nonce: &str,
) -> String {
    format!("{escrow_id}|{chain}|{payout_address}|{amount}|{timestamp}|{nonce}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_round_trips() {
        let secret = "super-secret";
        let message = "address|TRC20|1700000000|abc123";
        let signature = sign_hmac(secret, message);
        assert!(verify_hmac(secret, message, &signature));
    }

    #[test]
    fn hmac_rejects_tampered_message() {
        let secret = "super-secret";
        let signature = sign_hmac(secret, "message-a");
        assert!(!verify_hmac(secret, "message-b", &signature));
    }

    #[test]
    fn timestamp_within_skew_is_accepted() {
        verify_timestamp(1_000, 1_059).unwrap();
        verify_timestamp(1_000, 941).unwrap();
    }

    #[test]
    fn timestamp_exactly_at_boundary_is_rejected() {
        assert!(verify_timestamp(1_000, 1_060).is_err());
        assert!(verify_timestamp(1_000, 940).is_err());
    }

    #[test]
    fn nonce_has_enough_entropy_and_is_url_safe() {
        let nonce = generate_nonce();
        assert!(nonce.len() >= 20);
        assert!(!nonce.contains('='));
        assert!(!nonce.contains('+'));
        assert!(!nonce.contains('/'));
    }

    #[test]
    fn nonces_are_not_constant() {
        assert_ne!(generate_nonce(), generate_nonce());
    }
}
