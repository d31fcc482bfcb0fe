use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use trustora_core::{security, Chain};

use crate::error::SignerError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub chain: String,
    pub timestamp: i64,
    pub nonce: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub address: String,
}

/// Issues the next unused deposit address for `chain`. Gas funding is
/// explicitly NOT performed here (`spec.md` §4.3, tested by
/// `original_source/tests/test_gas_funding.py::test_address_endpoint_does_not_fund_gas`)
/// — it happens out-of-band from whatever operational process tops up
/// new addresses, never as a side effect of allocation. This handler
/// never reaches into the payout pipeline either: it makes no chain
/// calls at all.
pub async fn handle_address(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<AddressResponse>, SignerError> {
    security::verify_timestamp(req.timestamp, Utc::now().timestamp())
        .map_err(|err| SignerError::Unauthorized(err.to_string()))?;

    let mut redis = state.redis.clone();
    trustora_kv::nonce::claim_nonce(&mut redis, &req.nonce).await?;

    let message = security::address_message(&req.chain, req.timestamp, &req.nonce);
    if !security::verify_hmac(&state.settings.signer_hmac_secret, &message, &req.signature) {
        return Err(SignerError::Unauthorized("bad signature".to_owned()));
    }

    let chain: Chain =
        req.chain.parse().map_err(|_| SignerError::BadRequest("unsupported chain".to_owned()))?;

    let mut conn = state.pool.acquire().await.map_err(trustora_db::DbError::Sql)?;
    let used: HashSet<String> =
        trustora_db::repo::escrow::list_deposit_addresses(&mut conn, chain)
            .await?
            .into_iter()
            .collect();

    let address = match chain {
        Chain::Trc20 => {
            state.tron_keys.pick_unused_address(&used).ok_or(SignerError::NoAddressAvailable)?
        }
        Chain::Bep20 => {
            state.bsc_keys.pick_unused_address(&used).ok_or(SignerError::NoAddressAvailable)?
        }
    }
    .to_owned();

    Ok(Json(AddressResponse { address }))
}
