use clap::{Parser, ValueEnum};
use config::{Config, Environment};
use serde::Deserialize;
use trustora_core::Chain;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChainArg {
    Trc20,
    Bep20,
}

impl From<ChainArg> for Chain {
    fn from(value: ChainArg) -> Self {
        match value {
            ChainArg::Trc20 => Chain::Trc20,
            ChainArg::Bep20 => Chain::Bep20,
        }
    }
}

/// Which chain this instance of the watcher scans — one process per
/// chain, matching `original_source`'s separate `watcher_tron`/
/// `watcher_bsc` services.
#[derive(Parser, Debug)]
#[command(name = "trustora-watcher")]
#[command(about = "Scans a chain for confirmed deposits into open escrows")]
pub struct Args {
    #[arg(long, value_enum)]
    pub chain: ChainArg,
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
}

/// The superset of both chains' settings; only the fields for the
/// selected [`ChainArg`] are read at runtime, mirroring
/// `original_source`'s two separate `WatcherSettings` classes folded
/// into one environment namespace.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherSettings {
    pub database_url: String,
    pub redis_url: String,

    pub tron_rpc_urls: Option<String>,
    pub tron_usdt_contract: Option<String>,
    #[serde(default = "default_tron_confirmations")]
    pub tron_confirmations_required: u64,
    #[serde(default = "default_scan_interval")]
    pub tron_scan_interval: u64,

    pub bsc_rpc_urls: Option<String>,
    pub bsc_usdt_contract: Option<String>,
    #[serde(default = "default_bsc_confirmations")]
    pub bsc_confirmations_required: u64,
    #[serde(default = "default_scan_interval")]
    pub bsc_scan_interval: u64,

    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tron_confirmations() -> u64 {
    20
}
fn default_bsc_confirmations() -> u64 {
    12
}
fn default_scan_interval() -> u64 {
    30
}
fn default_bind() -> String {
    "0.0.0.0".to_owned()
}
fn default_port() -> u16 {
    8090
}

/// The chain-specific view of [`WatcherSettings`] the scan loop needs.
pub struct ChainSettings {
    pub rpc_urls: String,
    pub usdt_contract: String,
    pub confirmations_required: u64,
    pub scan_interval_seconds: u64,
}

impl WatcherSettings {
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut settings: Self =
            Config::builder().add_source(Environment::default()).build()?.try_deserialize()?;
        if let Some(bind) = &args.bind {
            settings.bind = bind.clone();
        }
        if let Some(port) = args.port {
            settings.port = port;
        }
        Ok(settings)
    }

    pub fn for_chain(&self, chain: Chain) -> anyhow::Result<ChainSettings> {
        Ok(match chain {
            Chain::Trc20 => ChainSettings {
                rpc_urls: self
                    .tron_rpc_urls
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("TRON_RPC_URLS not set"))?,
                usdt_contract: self
                    .tron_usdt_contract
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("TRON_USDT_CONTRACT not set"))?,
                confirmations_required: self.tron_confirmations_required,
                scan_interval_seconds: self.tron_scan_interval,
            },
            Chain::Bep20 => ChainSettings {
                rpc_urls: self
                    .bsc_rpc_urls
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("BSC_RPC_URLS not set"))?,
                usdt_contract: self
                    .bsc_usdt_contract
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("BSC_USDT_CONTRACT not set"))?,
                confirmations_required: self.bsc_confirmations_required,
                scan_interval_seconds: self.bsc_scan_interval,
            },
        })
    }
}
