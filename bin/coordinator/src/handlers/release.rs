use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trustora_core::amount::format_amount;
use trustora_core::EscrowStatus;
use trustora_kv::gates::{confirm_admin_action, confirm_release, AdminAction};
use uuid::Uuid;

use crate::error::CoordinatorError;
use crate::signer_client;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReleaseRequest {
    pub requester_tg_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub status: String,
    pub seller_tx_hash: Option<String>,
    pub fee_tx_hash: Option<String>,
}

/// The buyer's "release funds" action, gated behind a double-tap
/// confirmation (`spec.md` §4.5/§6). Below the auto-payout ceiling the
/// payout is triggered immediately; above it the escrow waits in
/// `RELEASE_REQUESTED` for an admin approval.
pub async fn request_release(
    State(state): State<Arc<AppState>>,
    Path(escrow_id): Path<Uuid>,
    Json(req): Json<ReleaseRequest>,
) -> Result<Json<ReleaseResponse>, CoordinatorError> {
    let mut redis = state.redis.clone();
    if !confirm_release(&mut redis, req.requester_tg_id, escrow_id).await? {
        return Err(CoordinatorError::NotConfirmed);
    }

    let net_amount = {
        let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
        let mut escrow = trustora_db::repo::escrow::get_escrow_for_update(&mut tx, escrow_id).await?;
        if req.requester_tg_id != escrow.buyer_tg_id {
            return Err(CoordinatorError::Unauthorized("only the buyer can release".into()));
        }
        trustora_db::repo::escrow::transition_escrow(&mut tx, &mut escrow, EscrowStatus::ReleaseRequested)
            .await?;
        tx.commit().await.map_err(trustora_db::DbError::from)?;
        escrow.net_amount
    };

    if net_amount <= state.settings.auto_payout_max {
        let (seller_tx_hash, fee_tx_hash) = approve_and_send_payout(&state, escrow_id).await?;
        return Ok(Json(ReleaseResponse {
            status: "PAYOUT_SENT".into(),
            seller_tx_hash: Some(seller_tx_hash),
            fee_tx_hash,
        }));
    }

    Ok(Json(ReleaseResponse {
        status: "RELEASE_REQUESTED".into(),
        seller_tx_hash: None,
        fee_tx_hash: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdminApproveRequest {
    pub admin_tg_id: i64,
}

/// Admin approval of a `RELEASE_REQUESTED` escrow above the
/// auto-payout ceiling, gated behind the `admin-approve` double-tap.
pub async fn admin_approve_release(
    State(state): State<Arc<AppState>>,
    Path(escrow_id): Path<Uuid>,
    Json(req): Json<AdminApproveRequest>,
) -> Result<Json<ReleaseResponse>, CoordinatorError> {
    if !state.settings.is_admin(req.admin_tg_id) {
        return Err(CoordinatorError::Unauthorized("not an admin".into()));
    }
    let mut redis = state.redis.clone();
    if !confirm_admin_action(&mut redis, AdminAction::Approve, req.admin_tg_id, &escrow_id.to_string())
        .await?
    {
        return Err(CoordinatorError::NotConfirmed);
    }

    let (seller_tx_hash, fee_tx_hash) = approve_and_send_payout(&state, escrow_id).await?;
    Ok(Json(ReleaseResponse {
        status: "PAYOUT_SENT".into(),
        seller_tx_hash: Some(seller_tx_hash),
        fee_tx_hash,
    }))
}

/// Shared tail of both the auto and admin-approved release paths:
/// transitions the escrow to `RELEASE_APPROVED` under a row lock, then
/// (outside the lock, per `spec.md` §9) asks the signer to broadcast
/// the payout. Mirrors `original_source`'s `approve_and_send_payout`.
async fn approve_and_send_payout(
    state: &AppState,
    escrow_id: Uuid,
) -> Result<(String, Option<String>), CoordinatorError> {
    let escrow = {
        let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
        let mut escrow = trustora_db::repo::escrow::get_escrow_for_update(&mut tx, escrow_id).await?;
        if !trustora_core::idempotency::can_send_payout(&escrow) {
            return Err(CoordinatorError::BadRequest("payout already sent".into()));
        }
        trustora_db::repo::escrow::transition_escrow(&mut tx, &mut escrow, EscrowStatus::ReleaseApproved)
            .await?;
        tx.commit().await.map_err(trustora_db::DbError::from)?;
        escrow
    };

    let payout_address = escrow
        .payout_address
        .as_deref()
        .ok_or_else(|| CoordinatorError::BadRequest("escrow has no payout address".into()))?;
    let response = signer_client::request_payout(
        state,
        escrow_id,
        &escrow.chain.to_string(),
        payout_address,
        &format_amount(escrow.net_amount),
    )
    .await?;
    Ok((response.seller_tx_hash, response.fee_tx_hash))
}
