use clap::Parser;
use config::{Config, Environment};
use serde::Deserialize;

/// Command-line overrides for [`SignerSettings`]. Every field also has
/// an environment-variable source (`SCREAMING_SNAKE_CASE`), matching
/// `original_source`'s pydantic settings.
#[derive(Parser, Debug, Default)]
#[command(name = "trustora-signer")]
#[command(about = "Holds payout keys and executes /address and /payout")]
pub struct Args {
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignerSettings {
    pub database_url: String,
    pub redis_url: String,
    pub key_encryption_key: String,
    pub signer_hmac_secret: String,
    #[serde(default)]
    pub pause_payouts: bool,

    pub tron_rpc_urls: String,
    pub bsc_rpc_urls: String,

    pub tron_usdt_contract: String,
    pub bsc_usdt_contract: String,

    pub fee_wallet_tron: String,
    pub fee_wallet_bsc: String,

    #[serde(default = "default_tron_key_file")]
    pub tron_keys_file: String,
    #[serde(default = "default_bsc_key_file")]
    pub bsc_keys_file: String,

    #[serde(default = "default_auto_payout_max")]
    pub auto_payout_max: rust_decimal::Decimal,
    #[serde(default = "default_hard_max_payout")]
    pub hard_max_payout: rust_decimal::Decimal,
    #[serde(default = "default_daily_payout_max")]
    pub daily_payout_max: rust_decimal::Decimal,
    #[serde(default = "default_payouts_per_hour_max")]
    pub payouts_per_hour_max: i64,

    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_tron_key_file() -> String {
    "./secrets/tron_keys.enc".to_owned()
}
fn default_bsc_key_file() -> String {
    "./secrets/bsc_keys.enc".to_owned()
}
fn default_auto_payout_max() -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(200, 0)
}
fn default_hard_max_payout() -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(1000, 0)
}
fn default_daily_payout_max() -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(1000, 0)
}
fn default_payouts_per_hour_max() -> i64 {
    10
}
fn default_bind() -> String {
    "0.0.0.0".to_owned()
}
fn default_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9080
}

impl SignerSettings {
    /// Loads settings from environment variables, then applies CLI
    /// overrides for the process-level bind address and ports.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut settings: Self = Config::builder()
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;
        if let Some(bind) = &args.bind {
            settings.bind = bind.clone();
        }
        if let Some(port) = args.port {
            settings.port = port;
        }
        if let Some(metrics_port) = args.metrics_port {
            settings.metrics_port = metrics_port;
        }
        Ok(settings)
    }
}
