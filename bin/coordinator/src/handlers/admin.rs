use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use trustora_kv::gates::{confirm_admin_action, AdminAction};

use crate::error::CoordinatorError;
use crate::state::AppState;

fn require_admin(state: &AppState, tg_id: i64) -> Result<(), CoordinatorError> {
    if state.settings.is_admin(tg_id) {
        Ok(())
    } else {
        Err(CoordinatorError::Unauthorized("not an admin".into()))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeesRequest {
    pub admin_tg_id: i64,
    pub fee_flat: f64,
    pub fee_percent: f64,
    pub fee_threshold: f64,
}

/// Edits the live fee config, gated behind the `fee-edit` double-tap.
/// Does not retroactively change any escrow's already-snapshotted fee
/// (`spec.md` §4.2).
pub async fn update_fees(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateFeesRequest>,
) -> Result<Json<JsonValue>, CoordinatorError> {
    require_admin(&state, req.admin_tg_id)?;
    let mut redis = state.redis.clone();
    let scope = format!("{}:{}:{}", req.fee_flat, req.fee_percent, req.fee_threshold);
    if !confirm_admin_action(&mut redis, AdminAction::FeeEdit, req.admin_tg_id, &scope).await? {
        return Err(CoordinatorError::NotConfirmed);
    }

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
    let config = trustora_db::repo::config::update_config(
        &mut tx,
        req.admin_tg_id,
        serde_json::json!({
            "fee_flat": req.fee_flat,
            "fee_percent": req.fee_percent,
            "fee_threshold": req.fee_threshold,
        }),
    )
    .await?;
    tx.commit().await.map_err(trustora_db::DbError::from)?;
    Ok(Json(config.json))
}

#[derive(Debug, Deserialize)]
pub struct KillSwitchRequest {
    pub admin_tg_id: i64,
}

#[derive(Debug, Serialize)]
pub struct KillSwitchResponse {
    pub pause_payouts: bool,
}

/// Toggles the global payout kill switch the signer checks before
/// every `/payout` call (`spec.md` §4.6), gated behind the
/// `admin-kill` double-tap.
pub async fn toggle_kill_switch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<KillSwitchRequest>,
) -> Result<Json<KillSwitchResponse>, CoordinatorError> {
    require_admin(&state, req.admin_tg_id)?;
    let mut redis = state.redis.clone();
    if !confirm_admin_action(&mut redis, AdminAction::Kill, req.admin_tg_id, "global").await? {
        return Err(CoordinatorError::NotConfirmed);
    }

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
    let current = trustora_db::repo::config::get_config(&mut tx).await?;
    let currently_paused = current.json.get("pause_payouts").and_then(|v| v.as_bool()).unwrap_or(false);
    let config = trustora_db::repo::config::update_config(
        &mut tx,
        req.admin_tg_id,
        serde_json::json!({ "pause_payouts": !currently_paused }),
    )
    .await?;
    tx.commit().await.map_err(trustora_db::DbError::from)?;

    let pause_payouts = config.json.get("pause_payouts").and_then(|v| v.as_bool()).unwrap_or(false);
    tracing::warn!(pause_payouts, "kill switch toggled");
    Ok(Json(KillSwitchResponse { pause_payouts }))
}

#[derive(Debug, Deserialize)]
pub struct BlockUserRequest {
    pub admin_tg_id: i64,
    pub target_tg_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BlockUserResponse {
    pub is_blocked: bool,
}

/// Toggles a user's blocked flag, gated behind the `admin-block`
/// double-tap.
pub async fn toggle_block_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BlockUserRequest>,
) -> Result<Json<BlockUserResponse>, CoordinatorError> {
    require_admin(&state, req.admin_tg_id)?;
    let mut redis = state.redis.clone();
    let scope = req.target_tg_id.to_string();
    if !confirm_admin_action(&mut redis, AdminAction::Block, req.admin_tg_id, &scope).await? {
        return Err(CoordinatorError::NotConfirmed);
    }

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
    let user = trustora_db::repo::user::find_user(&mut tx, req.target_tg_id)
        .await?
        .ok_or_else(|| CoordinatorError::BadRequest("user not found".into()))?;
    let is_blocked = !user.is_blocked;
    trustora_db::repo::user::set_blocked(&mut tx, req.target_tg_id, is_blocked).await?;
    trustora_db::repo::audit_log::record(
        &mut tx,
        None,
        Some(req.admin_tg_id),
        "user.block_toggled",
        serde_json::json!({ "target_tg_id": req.target_tg_id, "is_blocked": is_blocked }),
    )
    .await?;
    tx.commit().await.map_err(trustora_db::DbError::from)?;

    Ok(Json(BlockUserResponse { is_blocked }))
}
