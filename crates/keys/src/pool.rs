use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use trustora_chain::ChainBackend;

use crate::error::KeysError;

/// A per-chain deposit-address pool backed by a fixed list of private
/// keys. `build_address_key_map`/`select_private_key` mirror
/// `original_source`'s `signer_keys.py`; the addition here is tracking
/// which addresses have already had their one-time gas top-up sent, so
/// the signer never re-funds an address on every `/address` call.
#[derive(Debug)]
pub struct GasFundedKeyPool {
    address_to_key: HashMap<String, String>,
    gas_funded: Mutex<HashSet<String>>,
}

impl GasFundedKeyPool {
    /// Builds the pool by deriving each key's address through `backend`.
    pub fn build(
        private_keys: &[String],
        backend: &dyn ChainBackend,
    ) -> Result<Self, KeysError> {
        let mut address_to_key = HashMap::with_capacity(private_keys.len());
        for key in private_keys {
            let address = backend.derive_address(key)?;
            address_to_key.insert(address, key.clone());
        }
        Ok(Self { address_to_key, gas_funded: Mutex::new(HashSet::new()) })
    }

    /// Picks the first address in `used_addresses`' complement,
    /// matching `original_source`'s `pick_address` linear scan.
    pub fn pick_unused_address(&self, used_addresses: &HashSet<String>) -> Option<&str> {
        self.address_to_key
            .keys()
            .find(|address| !used_addresses.contains(address.as_str()))
            .map(String::as_str)
    }

    /// Looks up the private key controlling `address`.
    pub fn select_private_key(&self, address: &str) -> Result<&str, KeysError> {
        self.address_to_key
            .get(address)
            .map(String::as_str)
            .ok_or_else(|| KeysError::NoKeyForAddress(address.to_owned()))
    }

    /// True if `address` has already received its one-time gas
    /// top-up. Recording happens via [`Self::mark_gas_funded`] right
    /// after a successful top-up broadcast, under the same
    /// process-local lock — a crash between broadcast and marking
    /// results in at most one redundant top-up, never a missed one.
    pub fn is_gas_funded(&self, address: &str) -> bool {
        self.gas_funded.lock().expect("gas_funded lock poisoned").contains(address)
    }

    /// Records that `address` has received its gas top-up.
    pub fn mark_gas_funded(&self, address: &str) {
        self.gas_funded.lock().expect("gas_funded lock poisoned").insert(address.to_owned());
    }

    pub fn address_count(&self) -> usize {
        self.address_to_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBackend;

    #[async_trait::async_trait]
    impl ChainBackend for StubBackend {
        async fn latest_block(&self) -> Result<u64, trustora_chain::ChainError> {
            unimplemented!()
        }
        async fn transfer_events(
            &self,
            _: &str,
            _: u64,
            _: u64,
        ) -> Result<Vec<trustora_chain::TransferEvent>, trustora_chain::ChainError> {
            unimplemented!()
        }
        fn derive_address(&self, private_key_hex: &str) -> Result<String, trustora_chain::ChainError> {
            Ok(format!("ADDR-{private_key_hex}"))
        }
        async fn fund_gas(
            &self,
            _: &str,
            _: rust_decimal::Decimal,
            _: &str,
        ) -> Result<String, trustora_chain::ChainError> {
            unimplemented!()
        }
        async fn send_usdt(
            &self,
            _: &str,
            _: &str,
            _: i64,
            _: &str,
        ) -> Result<String, trustora_chain::ChainError> {
            unimplemented!()
        }
    }

    #[test]
    fn picks_first_unused_address() {
        let pool =
            GasFundedKeyPool::build(&["k1".to_owned(), "k2".to_owned()], &StubBackend).unwrap();
        let used: HashSet<String> = ["ADDR-k1".to_owned()].into_iter().collect();
        assert_eq!(pool.pick_unused_address(&used), Some("ADDR-k2"));
    }

    #[test]
    fn gas_funded_flag_round_trips() {
        let pool = GasFundedKeyPool::build(&["k1".to_owned()], &StubBackend).unwrap();
        assert!(!pool.is_gas_funded("ADDR-k1"));
        pool.mark_gas_funded("ADDR-k1");
        assert!(pool.is_gas_funded("ADDR-k1"));
    }

    #[test]
    fn select_private_key_rejects_unknown_address() {
        let pool = GasFundedKeyPool::build(&["k1".to_owned()], &StubBackend).unwrap();
        assert!(pool.select_private_key("nope").is_err());
    }
}
