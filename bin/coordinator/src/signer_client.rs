//! Thin client for the Coordinator->Signer calls of `original_source`'s
//! `request_deposit_address`/`approve_and_send_payout`: build the HMAC
//! envelope, POST, and decode the response.

use chrono::Utc;
use serde::Deserialize;
use trustora_core::security::{address_message, generate_nonce, payout_message, sign_hmac};

use crate::error::CoordinatorError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressResponse {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct PayoutResponse {
    pub seller_tx_hash: String,
    pub fee_tx_hash: Option<String>,
}

/// Requests a fresh deposit address for `chain` from the signer.
pub async fn request_deposit_address(
    state: &AppState,
    chain: &str,
) -> Result<String, CoordinatorError> {
    let timestamp = Utc::now().timestamp();
    let nonce = generate_nonce();
    let signature =
        sign_hmac(&state.settings.signer_hmac_secret, &address_message(chain, timestamp, nonce.as_str()));

    let response = state
        .http
        .post(format!("{}/address", state.settings.signer_base_url))
        .json(&serde_json::json!({
            "chain": chain,
            "timestamp": timestamp,
            "nonce": nonce,
            "signature": signature,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(CoordinatorError::Signer(format!(
            "signer /address returned {}",
            response.status()
        )));
    }
    Ok(response.json::<AddressResponse>().await?.address)
}

/// Requests that the signer broadcast a payout for an already
/// `RELEASE_APPROVED` escrow.
pub async fn request_payout(
    state: &AppState,
    escrow_id: uuid::Uuid,
    chain: &str,
    payout_address: &str,
    amount: &str,
) -> Result<PayoutResponse, CoordinatorError> {
    let timestamp = Utc::now().timestamp();
    let nonce = generate_nonce();
    let escrow_id_str = escrow_id.to_string();
    let message =
        payout_message(&escrow_id_str, chain, payout_address, amount, timestamp, nonce.as_str());
    let signature = sign_hmac(&state.settings.signer_hmac_secret, &message);

    let response = state
        .http
        .post(format!("{}/payout", state.settings.signer_base_url))
        .json(&serde_json::json!({
            "escrow_id": escrow_id_str,
            "chain": chain,
            "payout_address": payout_address,
            "amount": amount,
            "timestamp": timestamp,
            "nonce": nonce,
            "signature": signature,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(CoordinatorError::Signer(format!(
            "signer /payout returned {}",
            response.status()
        )));
    }
    Ok(response.json::<PayoutResponse>().await?)
}
