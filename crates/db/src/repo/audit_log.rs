use serde_json::Value as Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;

/// Appends an audit trail entry for a privileged or state-changing
/// action (`spec.md` §4.6, admin actions; `original_source`'s
/// `AuditLog` model). `escrow_id`/`actor_tg_id` are nullable: system
/// actions and config edits may lack either.
pub async fn record(
    tx: &mut PgConnection,
    escrow_id: Option<Uuid>,
    actor_tg_id: Option<i64>,
    action: &str,
    metadata: Json,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO audit_log (escrow_id, actor_tg_id, action, metadata_json, created_at) \
         VALUES ($1, $2, $3, $4, now())",
    )
    .bind(escrow_id)
    .bind(actor_tg_id)
    .bind(action)
    .bind(metadata)
    .execute(tx)
    .await?;
    Ok(())
}
