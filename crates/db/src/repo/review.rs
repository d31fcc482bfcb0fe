use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::Review;

/// Records one counterparty's review of the other after a completed
/// deal (`spec.md` §3 `reviews` table).
pub async fn insert_review(
    tx: &mut PgConnection,
    escrow_id: Uuid,
    reviewer_tg_id: i64,
    counterparty_tg_id: i64,
    rating: i32,
    comment: &str,
) -> Result<Review, DbError> {
    sqlx::query_as::<_, Review>(
        "INSERT INTO reviews \
         (escrow_id, reviewer_tg_id, counterparty_tg_id, rating, comment, created_at) \
         VALUES ($1, $2, $3, $4, $5, now()) RETURNING *",
    )
    .bind(escrow_id)
    .bind(reviewer_tg_id)
    .bind(counterparty_tg_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(tx)
    .await
    .map_err(DbError::Sql)
}

/// Records the message id of the post once it's been published to the
/// public reviews channel.
pub async fn set_posted_message_id(
    tx: &mut PgConnection,
    review_id: i64,
    message_id: i64,
) -> Result<(), DbError> {
    sqlx::query("UPDATE reviews SET posted_channel_msg_id = $1 WHERE id = $2")
        .bind(message_id)
        .bind(review_id)
        .execute(tx)
        .await?;
    Ok(())
}

/// True once both counterparties have left a review for this escrow.
pub async fn both_reviews_submitted(
    tx: &mut PgConnection,
    escrow_id: Uuid,
) -> Result<bool, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM reviews WHERE escrow_id = $1")
        .bind(escrow_id)
        .fetch_one(tx)
        .await?;
    Ok(count >= 2)
}
