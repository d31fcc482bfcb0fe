use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::eth::{Filter, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolEvent;
use alloy::transports::http::{Client, Http};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::backend::{ChainBackend, TransferEvent};
use crate::error::ChainError;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

/// A BNB Smart Chain backend built on `alloy`, driving the same
/// USDT-BEP20 surface `original_source`'s `web3.py`-based signer used
/// (ERC20 `transfer`, native `eth_sendRawTransaction` for gas top-ups).
#[derive(Debug, Clone)]
pub struct BscBackend {
    rpc_url: String,
}

impl BscBackend {
    pub fn new(rpc_url: String) -> Self {
        Self { rpc_url }
    }

    fn provider(&self) -> Result<impl Provider<Http<Client>>, ChainError> {
        self.rpc_url
            .parse()
            .map(|url| ProviderBuilder::new().on_http(url))
            .map_err(|err| ChainError::Decode(format!("bad rpc url: {err}")))
    }

    fn signer(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
        PrivateKeySigner::from_str(private_key_hex)
            .map_err(|err| ChainError::Decode(format!("bad private key: {err}")))
    }
}

#[async_trait::async_trait]
impl ChainBackend for BscBackend {
    async fn latest_block(&self) -> Result<u64, ChainError> {
        let provider = self.provider()?;
        provider
            .get_block_number()
            .await
            .map_err(|err| ChainError::Decode(err.to_string()))
    }

    async fn transfer_events(
        &self,
        contract_address: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        let provider = self.provider()?;
        let contract: Address = contract_address
            .parse()
            .map_err(|err| ChainError::Decode(format!("bad contract address: {err}")))?;
        let filter = Filter::new()
            .address(contract)
            .event_signature(IERC20::Transfer::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(to_block);
        let logs = provider
            .get_logs(&filter)
            .await
            .map_err(|err| ChainError::Decode(err.to_string()))?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            let decoded = log
                .log_decode::<IERC20::Transfer>()
                .map_err(|err| ChainError::Decode(err.to_string()))?;
            let block_number = log.block_number.unwrap_or_default();
            let tx_hash = log.transaction_hash.map(|h| format!("{h:#x}")).unwrap_or_default();
            events.push(TransferEvent {
                tx_hash,
                to_address: format!("{:#x}", decoded.inner.data.to),
                amount_micro_units: decoded.inner.data.value.to::<u128>() as i64,
                block_number,
            });
        }
        Ok(events)
    }

    fn derive_address(&self, private_key_hex: &str) -> Result<String, ChainError> {
        Ok(format!("{:#x}", Self::signer(private_key_hex)?.address()))
    }

    async fn fund_gas(
        &self,
        to_address: &str,
        amount: Decimal,
        gas_private_key_hex: &str,
    ) -> Result<String, ChainError> {
        let signer = Self::signer(gas_private_key_hex)?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().map_err(|err| ChainError::Decode(format!("{err}")))?);
        let to: Address = to_address
            .parse()
            .map_err(|err| ChainError::Decode(format!("bad address: {err}")))?;
        let wei = alloy::primitives::utils::parse_ether(&amount.to_string())
            .map_err(|err| ChainError::Decode(err.to_string()))?;
        let tx = TransactionRequest::default().with_to(to).with_value(wei);
        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|err| ChainError::Decode(err.to_string()))?;
        Ok(format!("{:#x}", *pending.tx_hash()))
    }

    async fn send_usdt(
        &self,
        contract_address: &str,
        to_address: &str,
        amount_micro_units: i64,
        private_key_hex: &str,
    ) -> Result<String, ChainError> {
        let signer = Self::signer(private_key_hex)?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().map_err(|err| ChainError::Decode(format!("{err}")))?);
        let contract: Address = contract_address
            .parse()
            .map_err(|err| ChainError::Decode(format!("bad contract address: {err}")))?;
        let to: Address = to_address
            .parse()
            .map_err(|err| ChainError::Decode(format!("bad address: {err}")))?;
        let token = IERC20::new(contract, &provider);
        let pending = token
            .transfer(to, U256::from(amount_micro_units))
            .send()
            .await
            .map_err(|err| ChainError::Decode(err.to_string()))?;
        Ok(format!("{:#x}", *pending.tx_hash()))
    }
}
