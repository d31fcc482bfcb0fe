use trustora_chain::{BscBackend, RpcClient, TronBackend};
use trustora_keys::GasFundedKeyPool;

use crate::settings::SignerSettings;

/// Everything a handler needs, built once at startup and shared behind
/// an `Arc`. `redis` and `pool` are cheap to clone (connection-manager
/// and pool handles), so handlers clone them out of the `Arc` rather
/// than taking a lock.
pub struct AppState {
    pub settings: SignerSettings,
    pub pool: trustora_db::PgPool,
    pub redis: redis::aio::ConnectionManager,
    pub tron_backend: TronBackend,
    pub bsc_backend: BscBackend,
    pub tron_keys: GasFundedKeyPool,
    pub bsc_keys: GasFundedKeyPool,
}

impl AppState {
    pub async fn build(settings: SignerSettings) -> anyhow::Result<Self> {
        let pool = trustora_db::connect(&settings.database_url).await?;
        let redis = trustora_kv::connect(&settings.redis_url).await?;

        let tron_backend =
            TronBackend::new(RpcClient::new(split_urls(&settings.tron_rpc_urls)));
        let bsc_backend = BscBackend::new(settings.bsc_rpc_urls.split(',').next()
            .unwrap_or(&settings.bsc_rpc_urls).to_owned());

        let tron_keys_raw = trustora_keys::load_key_file(
            std::path::Path::new(&settings.tron_keys_file),
            &settings.key_encryption_key,
        )?;
        let bsc_keys_raw = trustora_keys::load_key_file(
            std::path::Path::new(&settings.bsc_keys_file),
            &settings.key_encryption_key,
        )?;
        let tron_keys = GasFundedKeyPool::build(&tron_keys_raw, &tron_backend)?;
        let bsc_keys = GasFundedKeyPool::build(&bsc_keys_raw, &bsc_backend)?;

        Ok(Self { settings, pool, redis, tron_backend, bsc_backend, tron_keys, bsc_keys })
    }
}

fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()
}
