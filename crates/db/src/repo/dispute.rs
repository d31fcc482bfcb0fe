use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Dispute, DisputeStatus};

/// Opens a dispute on an escrow, leaving the escrow's own status
/// transition to the caller (`spec.md` §4.1: `FUNDS_LOCKED` or
/// `RELEASE_REQUESTED` -> `DISPUTED`).
pub async fn open_dispute(
    tx: &mut PgConnection,
    escrow_id: Uuid,
    opened_by_tg_id: i64,
    reason: &str,
) -> Result<Dispute, DbError> {
    sqlx::query_as::<_, Dispute>(
        "INSERT INTO disputes (escrow_id, opened_by_tg_id, reason, status, created_at) \
         VALUES ($1, $2, $3, 'OPEN', now()) RETURNING *",
    )
    .bind(escrow_id)
    .bind(opened_by_tg_id)
    .bind(reason)
    .fetch_one(tx)
    .await
    .map_err(DbError::Sql)
}

/// Marks a dispute resolved.
pub async fn resolve_dispute(tx: &mut PgConnection, dispute_id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE disputes SET status = $1, resolved_at = now() WHERE id = $2")
        .bind(DisputeStatus::Resolved)
        .bind(dispute_id)
        .execute(tx)
        .await?;
    Ok(())
}

/// Lists all disputes on an escrow, newest first.
pub async fn list_for_escrow(
    tx: &mut PgConnection,
    escrow_id: Uuid,
) -> Result<Vec<Dispute>, DbError> {
    sqlx::query_as::<_, Dispute>(
        "SELECT * FROM disputes WHERE escrow_id = $1 ORDER BY created_at DESC",
    )
    .bind(escrow_id)
    .fetch_all(tx)
    .await
    .map_err(DbError::Sql)
}
