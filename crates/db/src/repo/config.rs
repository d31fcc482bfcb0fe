use serde_json::{json, Value as Json};
use sqlx::PgConnection;

use crate::error::DbError;
use crate::models::Config;

/// The config row's defaults when none has ever been written, mirroring
/// `original_source`'s `DEFAULT_CONFIG`.
pub fn default_config() -> Json {
    json!({
        "fee_flat": 5.0,
        "fee_percent": 0.02,
        "fee_threshold": 100.0,
        "pause_payouts": false,
    })
}

/// Shallow-merges `updates` on top of `base`, matching
/// `original_source`'s `merge_config` (whole keys replaced, never
/// recursively merged).
pub fn merge_config(base: &Json, updates: &Json) -> Json {
    let mut merged = base.clone();
    if let (Some(merged_obj), Some(updates_obj)) = (merged.as_object_mut(), updates.as_object()) {
        for (key, value) in updates_obj {
            merged_obj.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Loads the single config row, inserting the default row on first use.
pub async fn get_config(tx: &mut PgConnection) -> Result<Config, DbError> {
    if let Some(config) = sqlx::query_as::<_, Config>("SELECT * FROM config WHERE id = 1")
        .fetch_optional(&mut *tx)
        .await?
    {
        return Ok(config);
    }
    sqlx::query_as::<_, Config>(
        "INSERT INTO config (id, json) VALUES (1, $1) \
         ON CONFLICT (id) DO UPDATE SET id = excluded.id RETURNING *",
    )
    .bind(default_config())
    .fetch_one(tx)
    .await
    .map_err(DbError::Sql)
}

/// Applies `updates` to the live config, recording both a
/// [`crate::models::ConfigHistoryEntry`] and an audit log entry in the
/// same transaction, mirroring `original_source`'s `update_config`.
pub async fn update_config(
    tx: &mut PgConnection,
    actor_tg_id: i64,
    updates: Json,
) -> Result<Config, DbError> {
    let current = get_config(tx).await?;
    let merged = merge_config(&current.json, &updates);

    let updated = sqlx::query_as::<_, Config>("UPDATE config SET json = $1 WHERE id = 1 RETURNING *")
        .bind(&merged)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO config_history (changed_by, old_json, new_json, created_at) \
         VALUES ($1, $2, $3, now())",
    )
    .bind(actor_tg_id)
    .bind(&current.json)
    .bind(&merged)
    .execute(&mut *tx)
    .await?;

    crate::repo::audit_log::record(
        tx,
        None,
        Some(actor_tg_id),
        "config.update",
        json!({ "updates": updates }),
    )
    .await?;

    Ok(updated)
}
