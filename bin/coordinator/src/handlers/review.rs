use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trustora_core::review::{build_review_post, user_public_hash};
use trustora_core::EscrowStatus;
use uuid::Uuid;

use crate::error::CoordinatorError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub reviewer_tg_id: i64,
    pub rating: i32,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review_id: i64,
    /// The formatted post text, ready for the reviews-channel
    /// publisher (an external collaborator per `spec.md` §1 — actually
    /// sending it is out of scope here).
    pub post_text: String,
}

const BAD_WORDS: [&str; 2] = ["spam", "scam"];

fn contains_profanity(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BAD_WORDS.iter().any(|word| lowered.contains(word))
}

fn contains_link(text: &str) -> bool {
    text.contains("http://") || text.contains("https://")
}

/// Records a post-completion review from one counterparty about the
/// other, matching `original_source`'s `handle_review_message`
/// moderation rules (no links, no profanity, rating 1-5, one review
/// per reviewer per escrow).
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Path(escrow_id): Path<Uuid>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<Json<ReviewResponse>, CoordinatorError> {
    if !(1..=5).contains(&req.rating) {
        return Err(CoordinatorError::BadRequest("rating must be 1-5".into()));
    }
    let comment = req.comment.trim();
    if comment.is_empty() {
        return Err(CoordinatorError::BadRequest("comment must not be empty".into()));
    }
    if contains_link(comment) {
        return Err(CoordinatorError::BadRequest("links are not allowed in reviews".into()));
    }
    if contains_profanity(comment) {
        return Err(CoordinatorError::BadRequest("comment contains disallowed language".into()));
    }

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
    let escrow = trustora_db::repo::escrow::get_escrow(&mut tx, escrow_id).await?;
    if escrow.status != EscrowStatus::Completed {
        return Err(CoordinatorError::BadRequest("reviews are only available after completion".into()));
    }
    if req.reviewer_tg_id != escrow.buyer_tg_id && req.reviewer_tg_id != escrow.seller_tg_id {
        return Err(CoordinatorError::Unauthorized("not a party to this escrow".into()));
    }
    let counterparty_tg_id = if req.reviewer_tg_id == escrow.buyer_tg_id {
        escrow.seller_tg_id
    } else {
        escrow.buyer_tg_id
    };

    let review = trustora_db::repo::review::insert_review(
        &mut tx,
        escrow_id,
        req.reviewer_tg_id,
        counterparty_tg_id,
        req.rating,
        comment,
    )
    .await
    .map_err(|err| {
        if err.is_unique_violation() {
            CoordinatorError::BadRequest("you already reviewed this escrow".into())
        } else {
            CoordinatorError::Db(err)
        }
    })?;
    tx.commit().await.map_err(trustora_db::DbError::from)?;

    let reviewer_hash = user_public_hash(&req.reviewer_tg_id.to_string(), &state.settings.public_hash_salt);
    let post_text = build_review_post(
        &escrow.room_code,
        &escrow.chain.to_string(),
        escrow.amount_expected,
        &reviewer_hash,
        req.rating as u8,
        comment,
    );

    Ok(Json(ReviewResponse { review_id: review.id, post_text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_known_bad_words_case_insensitively() {
        assert!(contains_profanity("this was a SCAM"));
        assert!(contains_profanity("spam much?"));
        assert!(!contains_profanity("great trade, fast and smooth"));
    }

    #[test]
    fn rejects_links() {
        assert!(contains_link("check http://example.com"));
        assert!(contains_link("https://example.com is great"));
        assert!(!contains_link("no links here"));
    }
}
