//! Pure formatting helpers for the reviews-channel publisher. The
//! publisher itself (actually sending to a chat channel) is an
//! external collaborator per `spec.md` §1; this module only owns the
//! anonymization and templating logic, grounded in
//! `original_source/trustora/reviews.py`.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Derives a user's 16-character public hash: `U#` followed by the
/// first 4 uppercase hex characters of `sha256(id || ":" || salt)`
/// (`spec.md` §3).
pub fn user_public_hash(user_id: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(salt.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("U#{}", digest[..4].to_ascii_uppercase())
}

/// Masks a room code for public display: `TR-8F2K19` → `TR-****19`.
pub fn mask_room_code(room_code: &str) -> String {
    if room_code.len() < 4 {
        return room_code.to_owned();
    }
    match room_code.split_once('-') {
        Some((prefix, rest)) if rest.len() >= 2 => {
            format!("{prefix}-****{}", &rest[rest.len() - 2..])
        }
        _ => {
            let (head, tail) = room_code.split_at(2);
            format!("{head}-****{}", &tail[tail.len().saturating_sub(2)..])
        }
    }
}

/// Buckets an amount into one of five display bands.
pub fn amount_bucket(amount: Decimal) -> &'static str {
    if amount < Decimal::from(50) {
        "<50"
    } else if amount <= Decimal::from(100) {
        "50-100"
    } else if amount <= Decimal::from(250) {
        "100-250"
    } else if amount <= Decimal::from(500) {
        "250-500"
    } else {
        "500+"
    }
}

/// Builds the public review post text.
pub fn build_review_post(
    room_code: &str,
    chain: &str,
    amount: Decimal,
    reviewer_hash: &str,
    rating: u8,
    comment: &str,
) -> String {
    let masked_code = mask_room_code(room_code);
    let bucket = amount_bucket(amount);
    let stars = "\u{2b50}".repeat(rating as usize);
    format!(
        "\u{1f6e1} Trustora Verified Escrow \u{2705}\n\
         Deal: {masked_code} | Chain: {chain} | Size: {bucket}\n\
         Reviewer: {reviewer_hash}\n\
         Rating: {stars}\n\
         Comment: \"{comment}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mask_room_code_keeps_prefix_and_tail() {
        assert!(mask_room_code("TR-8F2K19").starts_with("TR-"));
        assert_eq!(mask_room_code("TR-8F2K19"), "TR-****19");
    }

    #[test]
    fn amount_bucket_matches_bands() {
        assert_eq!(amount_bucket(dec!(30)), "<50");
        assert_eq!(amount_bucket(dec!(100)), "50-100");
        assert_eq!(amount_bucket(dec!(120)), "100-250");
    }

    #[test]
    fn review_post_contains_masked_code_and_chain() {
        let post = build_review_post("TR-8F2K19", "TRC20", dec!(120), "U#A3F9", 5, "Fast");
        assert!(post.contains("TR-****"));
        assert!(post.contains("Chain: TRC20"));
    }

    #[test]
    fn public_hash_has_expected_shape() {
        let hash = user_public_hash("42", "pepper");
        assert!(hash.starts_with("U#"));
        assert_eq!(hash.len(), 6);
    }
}
