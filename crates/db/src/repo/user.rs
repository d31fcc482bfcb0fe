use sqlx::PgConnection;

use crate::error::DbError;
use crate::models::User;

/// Loads a user by Telegram id, if registered.
pub async fn find_user(tx: &mut PgConnection, tg_id: i64) -> Result<Option<User>, DbError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE tg_id = $1")
        .bind(tg_id)
        .fetch_optional(tx)
        .await
        .map_err(DbError::Sql)
}

/// Registers a user on first contact, deriving their public hash from
/// `public_hash` computed by the caller (`trustora_core::review::user_public_hash`).
pub async fn upsert_user(
    tx: &mut PgConnection,
    tg_id: i64,
    username: Option<&str>,
    public_hash: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO users (tg_id, username, created_at, last_active_at, public_hash) \
         VALUES ($1, $2, now(), now(), $3) \
         ON CONFLICT (tg_id) DO UPDATE SET username = excluded.username, last_active_at = now()",
    )
    .bind(tg_id)
    .bind(username)
    .bind(public_hash)
    .execute(tx)
    .await?;
    Ok(())
}

/// Sets or clears a user's blocked flag, recording the reason in
/// `risk_reasons_json` for audit visibility.
pub async fn set_blocked(tx: &mut PgConnection, tg_id: i64, blocked: bool) -> Result<(), DbError> {
    sqlx::query("UPDATE users SET is_blocked = $1 WHERE tg_id = $2")
        .bind(blocked)
        .bind(tg_id)
        .execute(tx)
        .await?;
    Ok(())
}
