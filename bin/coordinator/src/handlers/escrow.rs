use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trustora_core::{
    amount::{format_amount, parse_amount},
    calculate_fee, calculate_net,
    chain::{Chain, Token},
    review::user_public_hash,
    FeeSnapshot,
};
use trustora_db::models::Escrow;
use uuid::Uuid;

use crate::error::CoordinatorError;
use crate::signer_client;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEscrowRequest {
    pub buyer_tg_id: i64,
    pub seller_tg_id: i64,
    pub amount: String,
    pub chain: Chain,
    pub payout_address: String,
}

#[derive(Debug, Serialize)]
pub struct EscrowSummary {
    pub id: Uuid,
    pub room_code: String,
    pub status: String,
    pub chain: Chain,
    pub amount_expected: String,
    pub fee_amount: String,
    pub net_amount: String,
    pub deposit_address: String,
}

impl From<&Escrow> for EscrowSummary {
    fn from(escrow: &Escrow) -> Self {
        Self {
            id: escrow.id,
            room_code: escrow.room_code.clone(),
            status: escrow.status.to_string(),
            chain: escrow.chain,
            amount_expected: format_amount(escrow.amount_expected),
            fee_amount: format_amount(escrow.fee_amount),
            net_amount: format_amount(escrow.net_amount),
            deposit_address: escrow.deposit_address.clone(),
        }
    }
}

/// Generates a room code of the shape `TR-XXXXXX`, where the suffix is
/// 6 uppercase hex characters, matching `original_source`'s
/// `generate_room_code` (`uuid.uuid4().hex[:6].upper()`).
fn generate_room_code() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_ascii_uppercase();
    format!("TR-{suffix}")
}

/// Creates a new escrow: derives the fee snapshot from the live
/// config, requests a deposit address from the signer, and inserts
/// the row in `AWAITING_DEPOSIT`. Mirrors `original_source`'s
/// `confirm_network` handler minus the chat-bot conversation state.
pub async fn create_escrow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEscrowRequest>,
) -> Result<Json<EscrowSummary>, CoordinatorError> {
    if !trustora_chain::validate_address(req.chain, &req.payout_address) {
        return Err(CoordinatorError::BadRequest("invalid payout address for chain".into()));
    }
    let amount_expected = parse_amount(&req.amount)
        .map_err(|err| CoordinatorError::BadRequest(err.to_string()))?;
    if amount_expected <= rust_decimal::Decimal::ZERO {
        return Err(CoordinatorError::BadRequest("amount must be positive".into()));
    }

    let mut conn = state.pool.acquire().await.map_err(trustora_db::DbError::from)?;
    let config = trustora_db::repo::config::get_config(&mut conn).await?;
    let snapshot: FeeSnapshot = serde_json::from_value(serde_json::json!({
        "flat": config.json.get("fee_flat").cloned().unwrap_or(serde_json::json!(5.0)),
        "percent": config.json.get("fee_percent").cloned().unwrap_or(serde_json::json!(0.02)),
        "threshold": config.json.get("fee_threshold").cloned().unwrap_or(serde_json::json!(100.0)),
    }))
    .unwrap_or_default();
    drop(conn);

    let fee_amount = calculate_fee(amount_expected, &snapshot);
    let net_amount = calculate_net(amount_expected, &snapshot);
    let deposit_address = signer_client::request_deposit_address(&state, &req.chain.to_string()).await?;

    let now = Utc::now();
    let escrow = Escrow {
        id: Uuid::new_v4(),
        room_code: generate_room_code(),
        buyer_tg_id: req.buyer_tg_id,
        seller_tg_id: req.seller_tg_id,
        chain: req.chain,
        token: Token::Usdt,
        amount_expected,
        amount_received: None,
        fee_snapshot_json: serde_json::to_value(snapshot).unwrap_or_default(),
        fee_amount,
        net_amount,
        deposit_address,
        deposit_tx_hash: None,
        deposit_confirmations: None,
        payout_address: Some(req.payout_address),
        payout_tx_hash: None,
        payout_confirmations: None,
        fee_tx_hash: None,
        status: trustora_core::EscrowStatus::AwaitingDeposit,
        chat_frozen: false,
        created_at: now,
        updated_at: now,
    };

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::from)?;
    trustora_db::repo::escrow::insert_escrow(&mut tx, &escrow).await?;
    trustora_db::repo::audit_log::record(
        &mut tx,
        Some(escrow.id),
        Some(req.buyer_tg_id),
        "escrow.created",
        serde_json::json!({ "room_code": escrow.room_code, "chain": escrow.chain }),
    )
    .await?;
    tx.commit().await.map_err(trustora_db::DbError::from)?;

    tracing::info!(escrow_id = %escrow.id, room_code = %escrow.room_code, "escrow created");
    Ok(Json(EscrowSummary::from(&escrow)))
}

/// Loads one escrow's public summary.
pub async fn get_escrow(
    State(state): State<Arc<AppState>>,
    Path(escrow_id): Path<Uuid>,
) -> Result<Json<EscrowSummary>, CoordinatorError> {
    let mut conn = state.pool.acquire().await.map_err(trustora_db::DbError::from)?;
    let escrow = trustora_db::repo::escrow::get_escrow(&mut conn, escrow_id).await?;
    Ok(Json(EscrowSummary::from(&escrow)))
}

/// Derives a requester's anonymized public hash, used when publishing
/// reviews (`spec.md` §3).
pub fn public_hash_for(state: &AppState, tg_id: i64) -> String {
    user_public_hash(&tg_id.to_string(), &state.settings.public_hash_salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_code_has_expected_shape() {
        let code = generate_room_code();
        assert!(code.starts_with("TR-"));
        let suffix = &code["TR-".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn room_codes_are_not_constant() {
        assert_ne!(generate_room_code(), generate_room_code());
    }
}
