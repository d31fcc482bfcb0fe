use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trustora_core::EscrowStatus;
use uuid::Uuid;

use crate::error::CoordinatorError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenDisputeRequest {
    pub opened_by_tg_id: i64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct DisputeResponse {
    pub dispute_id: i64,
    pub status: String,
}

/// Opens a dispute, moving the escrow to `DISPUTED` unless it's
/// already cancelled or completed. Mirrors `original_source`'s
/// `open_dispute`.
pub async fn open_dispute(
    State(state): State<Arc<AppState>>,
    Path(escrow_id): Path<Uuid>,
    Json(req): Json<OpenDisputeRequest>,
) -> Result<Json<DisputeResponse>, CoordinatorError> {
    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
    let mut escrow = trustora_db::repo::escrow::get_escrow_for_update(&mut tx, escrow_id).await?;

    if matches!(escrow.status, EscrowStatus::Cancelled | EscrowStatus::Completed) {
        return Err(CoordinatorError::BadRequest(
            "cannot dispute a cancelled or completed escrow".into(),
        ));
    }
    if req.opened_by_tg_id != escrow.buyer_tg_id && req.opened_by_tg_id != escrow.seller_tg_id {
        return Err(CoordinatorError::Unauthorized("not a party to this escrow".into()));
    }

    trustora_db::repo::escrow::transition_escrow(&mut tx, &mut escrow, EscrowStatus::Disputed).await?;
    let dispute =
        trustora_db::repo::dispute::open_dispute(&mut tx, escrow_id, req.opened_by_tg_id, &req.reason)
            .await?;
    trustora_db::repo::audit_log::record(
        &mut tx,
        Some(escrow_id),
        Some(req.opened_by_tg_id),
        "dispute.opened",
        serde_json::json!({ "reason": req.reason }),
    )
    .await?;
    tx.commit().await.map_err(trustora_db::DbError::from)?;

    tracing::info!(%escrow_id, dispute_id = dispute.id, "dispute opened");
    Ok(Json(DisputeResponse { dispute_id: dispute.id, status: "DISPUTED".into() }))
}
