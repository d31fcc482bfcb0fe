use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use rust_decimal::Decimal;
use serde_json::json;
use sha2::{Digest as Sha2Digest, Sha256};
use sha3::{Digest as Sha3Digest, Keccak256};

use crate::backend::{ChainBackend, TransferEvent};
use crate::error::ChainError;
use crate::rpc::RpcClient;

const TRON_ADDRESS_PREFIX: u8 = 0x41;

/// A Tron full-node/TronGrid backend, talking the documented HTTP API
/// (`/wallet/getnowblock`, `/v1/contracts/{address}/events`,
/// `/wallet/triggersmartcontract`, `/wallet/broadcasttransaction`),
/// the same surface `original_source`'s `tronpy`-based watcher and
/// signer drive.
#[derive(Debug, Clone)]
pub struct TronBackend {
    rpc: RpcClient,
}

impl TronBackend {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    fn sign_digest(private_key_hex: &str, digest: &[u8; 32]) -> Result<String, ChainError> {
        let key_bytes = hex::decode(private_key_hex)
            .map_err(|err| ChainError::Decode(format!("bad private key hex: {err}")))?;
        let signing_key = SigningKey::from_slice(&key_bytes)
            .map_err(|err| ChainError::Decode(format!("bad private key: {err}")))?;
        let (signature, recovery_id): (Signature, RecoveryId) =
            signing_key.sign_prehash(digest).map_err(|err| ChainError::Decode(err.to_string()))?;
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte());
        Ok(hex::encode(bytes))
    }
}

#[async_trait::async_trait]
impl ChainBackend for TronBackend {
    async fn latest_block(&self) -> Result<u64, ChainError> {
        let body = self.rpc.post(&json!({})).await?;
        body["block_header"]["raw_data"]["number"]
            .as_u64()
            .ok_or_else(|| ChainError::Decode("missing block number".to_owned()))
    }

    async fn transfer_events(
        &self,
        contract_address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        let body = self
            .rpc
            .post(&json!({
                "contract_address": contract_address,
                "event_name": "Transfer",
                "min_block_timestamp": from_block,
                "max_block_timestamp": to_block,
            }))
            .await?;
        let entries = body["data"].as_array().cloned().unwrap_or_default();
        let mut events = Vec::with_capacity(entries.len());
        for entry in entries {
            let to_address = entry["result"]["to"]
                .as_str()
                .ok_or_else(|| ChainError::Decode("missing transfer.to".to_owned()))?
                .to_owned();
            let amount_micro_units = entry["result"]["value"]
                .as_str()
                .and_then(|v| v.parse::<i64>().ok())
                .ok_or_else(|| ChainError::Decode("missing transfer.value".to_owned()))?;
            let tx_hash = entry["transaction_id"]
                .as_str()
                .ok_or_else(|| ChainError::Decode("missing transaction_id".to_owned()))?
                .to_owned();
            let block_number = entry["block_number"]
                .as_u64()
                .ok_or_else(|| ChainError::Decode("missing block_number".to_owned()))?;
            events.push(TransferEvent { tx_hash, to_address, amount_micro_units, block_number });
        }
        Ok(events)
    }

    fn derive_address(&self, private_key_hex: &str) -> Result<String, ChainError> {
        let key_bytes = hex::decode(private_key_hex)
            .map_err(|err| ChainError::Decode(format!("bad private key hex: {err}")))?;
        let signing_key = SigningKey::from_slice(&key_bytes)
            .map_err(|err| ChainError::Decode(format!("bad private key: {err}")))?;
        let verifying_key = signing_key.verifying_key();
        let uncompressed = verifying_key.to_encoded_point(false);
        let pubkey_bytes = &uncompressed.as_bytes()[1..];
        let hash = Keccak256::digest(pubkey_bytes);
        let mut payload = vec![TRON_ADDRESS_PREFIX];
        payload.extend_from_slice(&hash[12..]);
        let checksum = Sha256::digest(Sha256::digest(&payload));
        payload.extend_from_slice(&checksum[..4]);
        Ok(bs58::encode(payload).into_string())
    }

    async fn fund_gas(
        &self,
        to_address: &str,
        amount: Decimal,
        gas_private_key_hex: &str,
    ) -> Result<String, ChainError> {
        let sun = trustora_core::amount::to_micro_units(amount);
        let from_address = self.derive_address(gas_private_key_hex)?;
        let built = self
            .rpc
            .post(&json!({
                "owner_address": from_address,
                "to_address": to_address,
                "amount": sun,
            }))
            .await?;
        broadcast_signed(&self.rpc, &built, gas_private_key_hex).await
    }

    async fn send_usdt(
        &self,
        contract_address: &str,
        to_address: &str,
        amount_micro_units: i64,
        private_key_hex: &str,
    ) -> Result<String, ChainError> {
        let owner_address = self.derive_address(private_key_hex)?;
        let built = self
            .rpc
            .post(&json!({
                "owner_address": owner_address,
                "contract_address": contract_address,
                "function_selector": "transfer(address,uint256)",
                "parameter": format!("{to_address}{amount_micro_units:064x}"),
                "fee_limit": 10_000_000,
            }))
            .await?;
        broadcast_signed(&self.rpc, &built, private_key_hex).await
    }
}

/// Signs the `txID` TronGrid returned from a build call and
/// broadcasts it, the pattern `triggersmartcontract`/`createtransaction`
/// + `broadcasttransaction` calls for in Tron's HTTP API.
async fn broadcast_signed(
    rpc: &RpcClient,
    built: &serde_json::Value,
    private_key_hex: &str,
) -> Result<String, ChainError> {
    let tx_id_hex = built["txID"]
        .as_str()
        .ok_or_else(|| ChainError::Decode("missing txID".to_owned()))?;
    let digest: [u8; 32] = hex::decode(tx_id_hex)
        .map_err(|err| ChainError::Decode(format!("bad txID hex: {err}")))?
        .try_into()
        .map_err(|_| ChainError::Decode("txID not 32 bytes".to_owned()))?;
    let signature = TronBackend::sign_digest(private_key_hex, &digest)?;

    let mut signed = built.clone();
    signed["signature"] = json!([signature]);

    let result = rpc.post(&signed).await?;
    if result["result"].as_bool() == Some(false) {
        return Err(ChainError::Decode(format!("broadcast rejected: {result}")));
    }
    Ok(tx_id_hex.to_owned())
}
