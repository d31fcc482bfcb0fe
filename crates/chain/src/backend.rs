use rust_decimal::Decimal;

use crate::error::ChainError;

/// One observed `Transfer(address,address,uint256)` log matching a
/// deposit address the watcher is tracking (`spec.md` §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub tx_hash: String,
    pub to_address: String,
    pub amount_micro_units: i64,
    pub block_number: u64,
}

/// The operations the Watcher and Signer need from a chain, behind one
/// trait so both processes stay chain-agnostic in their core logic and
/// only the backend differs between Tron and BSC.
#[async_trait::async_trait]
pub trait ChainBackend: Send + Sync {
    /// The confirmed tip block height.
    async fn latest_block(&self) -> Result<u64, ChainError>;

    /// USDT `Transfer` events emitted by `contract_address` in
    /// `[from_block, to_block]`.
    async fn transfer_events(
        &self,
        contract_address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError>;

    /// Derives the public address for a raw private key, hex-encoded
    /// without a `0x`/leading-character prefix beyond what the chain
    /// itself requires.
    fn derive_address(&self, private_key_hex: &str) -> Result<String, ChainError>;

    /// Sends `amount` of the native gas asset to `to_address`, used to
    /// top up a deposit address before it can pay its own payout gas
    /// (TRC20 bandwidth/energy, BEP20 gas).
    async fn fund_gas(
        &self,
        to_address: &str,
        amount: Decimal,
        gas_private_key_hex: &str,
    ) -> Result<String, ChainError>;

    /// Broadcasts a USDT transfer of `amount_micro_units` from the key
    /// behind `private_key_hex` to `to_address`, returning the
    /// broadcast transaction hash.
    async fn send_usdt(
        &self,
        contract_address: &str,
        to_address: &str,
        amount_micro_units: i64,
        private_key_hex: &str,
    ) -> Result<String, ChainError>;
}
