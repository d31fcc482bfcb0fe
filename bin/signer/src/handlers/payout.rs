use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trustora_core::idempotency::can_send_payout;
use trustora_core::{amount, security, Chain, EscrowStatus};
use trustora_kv::limits::PayoutLimits;
use uuid::Uuid;

use crate::error::SignerError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PayoutRequest {
    pub escrow_id: Uuid,
    pub chain: String,
    pub payout_address: String,
    pub amount: String,
    pub timestamp: i64,
    pub nonce: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub seller_tx_hash: Option<String>,
    pub fee_tx_hash: Option<String>,
}

/// Broadcasts a payout to `payout_address`, moving the escrow
/// `RELEASE_APPROVED`/`PAYOUT_QUEUED` -> `PAYOUT_QUEUED` ->
/// `PAYOUT_SENT`. This handler never sets `COMPLETED` — only the
/// Coordinator, once it independently confirms the broadcast
/// transactions, does that.
pub async fn handle_payout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayoutRequest>,
) -> Result<Json<PayoutResponse>, SignerError> {
    let amount = amount::parse_amount(&req.amount).map_err(SignerError::Core)?;

    security::verify_timestamp(req.timestamp, Utc::now().timestamp())
        .map_err(|err| SignerError::Unauthorized(err.to_string()))?;

    let mut redis = state.redis.clone();
    trustora_kv::nonce::claim_nonce(&mut redis, &req.nonce).await?;

    let message = security::payout_message(
        &req.escrow_id.to_string(),
        &req.chain,
        &req.payout_address,
        &req.amount,
        req.timestamp,
        &req.nonce,
    );
    if !security::verify_hmac(&state.settings.signer_hmac_secret, &message, &req.signature) {
        return Err(SignerError::Unauthorized("bad signature".to_owned()));
    }

    let chain: Chain =
        req.chain.parse().map_err(|_| SignerError::BadRequest("unsupported chain".to_owned()))?;
    if !trustora_chain::validate_address(chain, &req.payout_address) {
        return Err(SignerError::BadRequest("invalid payout address".to_owned()));
    }

    check_kill_switch(&state).await?;

    let limits = PayoutLimits {
        auto_payout_max: state.settings.auto_payout_max,
        hard_max_payout: state.settings.hard_max_payout,
        daily_payout_max: state.settings.daily_payout_max,
        payouts_per_hour_max: state.settings.payouts_per_hour_max,
    };
    trustora_kv::limits::check_and_track_limits(&mut redis, amount, &limits, Utc::now()).await?;

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::Sql)?;
    let mut escrow = trustora_db::repo::escrow::get_escrow_for_update(&mut tx, req.escrow_id)
        .await
        .map_err(|err| match err {
            trustora_db::DbError::NotFound(msg) => SignerError::BadRequest(msg),
            other => SignerError::Db(other),
        })?;
    if !matches!(escrow.status, EscrowStatus::ReleaseApproved | EscrowStatus::PayoutQueued) {
        return Err(SignerError::Conflict("escrow not approved".to_owned()));
    }
    if !can_send_payout(&escrow) {
        tx.commit().await.map_err(trustora_db::DbError::Sql)?;
        return Ok(Json(PayoutResponse {
            seller_tx_hash: escrow.payout_tx_hash,
            fee_tx_hash: escrow.fee_tx_hash,
        }));
    }
    if amount::quantize(escrow.net_amount) != amount {
        return Err(SignerError::BadRequest("amount mismatch".to_owned()));
    }
    trustora_db::repo::escrow::transition_escrow(&mut tx, &mut escrow, EscrowStatus::PayoutQueued)
        .await?;
    tx.commit().await.map_err(trustora_db::DbError::Sql)?;

    let deposit_address = escrow.deposit_address.clone();
    let (backend, gas_funded_key_pool, fee_wallet): (
        &dyn trustora_chain::ChainBackend,
        &trustora_keys::GasFundedKeyPool,
        &str,
    ) = match chain {
        Chain::Trc20 => (&state.tron_backend, &state.tron_keys, &state.settings.fee_wallet_tron),
        Chain::Bep20 => (&state.bsc_backend, &state.bsc_keys, &state.settings.fee_wallet_bsc),
    };
    let private_key = gas_funded_key_pool.select_private_key(&deposit_address)?;
    let contract_address = match chain {
        Chain::Trc20 => &state.settings.tron_usdt_contract,
        Chain::Bep20 => &state.settings.bsc_usdt_contract,
    };

    let seller_tx_hash = backend
        .send_usdt(
            contract_address,
            &req.payout_address,
            amount::to_micro_units(escrow.net_amount),
            private_key,
        )
        .await?;
    let fee_tx_hash = if escrow.fee_amount > Decimal::ZERO {
        Some(
            backend
                .send_usdt(
                    contract_address,
                    fee_wallet,
                    amount::to_micro_units(escrow.fee_amount),
                    private_key,
                )
                .await?,
        )
    } else {
        None
    };

    let mut tx = state.pool.begin().await.map_err(trustora_db::DbError::Sql)?;
    let mut escrow =
        trustora_db::repo::escrow::get_escrow_for_update(&mut tx, req.escrow_id).await?;
    trustora_db::repo::escrow::record_payout(
        &mut tx,
        escrow.id,
        &req.payout_address,
        &seller_tx_hash,
        fee_tx_hash.as_deref(),
    )
    .await?;
    trustora_db::repo::escrow::transition_escrow(&mut tx, &mut escrow, EscrowStatus::PayoutSent)
        .await?;
    tx.commit().await.map_err(trustora_db::DbError::Sql)?;

    Ok(Json(PayoutResponse { seller_tx_hash: Some(seller_tx_hash), fee_tx_hash }))
}

async fn check_kill_switch(state: &AppState) -> Result<(), SignerError> {
    if state.settings.pause_payouts {
        return Err(SignerError::Paused);
    }
    let mut conn = state.pool.acquire().await.map_err(trustora_db::DbError::Sql)?;
    let config = trustora_db::repo::config::get_config(&mut conn).await?;
    if config.json.get("pause_payouts").and_then(serde_json::Value::as_bool).unwrap_or(false) {
        return Err(SignerError::Paused);
    }
    Ok(())
}
