use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Message, MessageRole, MessageType};

/// Relays one chat message, rejected upstream (by the caller) when
/// `escrow.chat_frozen` is set (`spec.md` §4.1's chat freeze rule).
pub async fn insert_message(
    tx: &mut PgConnection,
    escrow_id: Uuid,
    sender_tg_id: i64,
    role: MessageRole,
    kind: MessageType,
    body_or_file_id: &str,
) -> Result<Message, DbError> {
    sqlx::query_as::<_, Message>(
        "INSERT INTO messages (escrow_id, sender_tg_id, role, type, body_or_file_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, now()) RETURNING *",
    )
    .bind(escrow_id)
    .bind(sender_tg_id)
    .bind(role)
    .bind(kind)
    .bind(body_or_file_id)
    .fetch_one(tx)
    .await
    .map_err(DbError::Sql)
}

/// Lists an escrow's chat history in chronological order.
pub async fn list_for_escrow(
    tx: &mut PgConnection,
    escrow_id: Uuid,
) -> Result<Vec<Message>, DbError> {
    sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE escrow_id = $1 ORDER BY created_at ASC",
    )
    .bind(escrow_id)
    .fetch_all(tx)
    .await
    .map_err(DbError::Sql)
}
