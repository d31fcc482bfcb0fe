use clap::Parser;
use config::{Config, Environment};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Coordinator operational overrides. Everything else comes from the
/// environment, matching `original_source/trustora/config.py`.
#[derive(Parser, Debug)]
#[command(name = "trustora-coordinator")]
#[command(about = "Escrow lifecycle service: creation, release, disputes, reviews, admin config")]
pub struct Args {
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorSettings {
    pub database_url: String,
    pub redis_url: String,

    pub signer_base_url: String,
    pub signer_hmac_secret: String,
    pub public_hash_salt: String,

    /// Net amounts at or below this release without admin approval,
    /// mirroring `original_source/app/main.py`'s `request_release`.
    #[serde(default = "default_auto_payout_max")]
    pub auto_payout_max: Decimal,

    /// Comma-separated Telegram ids allowed to perform admin actions.
    #[serde(default)]
    pub admin_ids: String,

    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_auto_payout_max() -> Decimal {
    Decimal::new(200, 0)
}
fn default_bind() -> String {
    "0.0.0.0".to_owned()
}
fn default_port() -> u16 {
    8070
}

impl CoordinatorSettings {
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

    /// Parses [`Self::admin_ids`] into individual Telegram ids.
    pub fn admin_id_set(&self) -> std::collections::HashSet<i64> {
        self.admin_ids.split(',').filter_map(|s| s.trim().parse().ok()).collect()
    }

    pub fn is_admin(&self, tg_id: i64) -> bool {
        self.admin_id_set().contains(&tg_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_admins(admin_ids: &str) -> CoordinatorSettings {
        CoordinatorSettings {
            database_url: String::new(),
            redis_url: String::new(),
            signer_base_url: String::new(),
            signer_hmac_secret: String::new(),
            public_hash_salt: String::new(),
            auto_payout_max: default_auto_payout_max(),
            admin_ids: admin_ids.to_owned(),
            bind: default_bind(),
            port: default_port(),
        }
    }

    #[test]
    fn admin_id_set_parses_comma_separated_ids() {
        let settings = settings_with_admins("123, 456,789");
        assert_eq!(settings.admin_id_set(), [123, 456, 789].into_iter().collect());
    }

    #[test]
    fn admin_id_set_ignores_unparseable_entries() {
        let settings = settings_with_admins("123,not-a-number,456");
        assert_eq!(settings.admin_id_set(), [123, 456].into_iter().collect());
    }

    #[test]
    fn is_admin_checks_membership() {
        let settings = settings_with_admins("123,456");
        assert!(settings.is_admin(123));
        assert!(!settings.is_admin(999));
    }

    #[test]
    fn empty_admin_ids_admits_nobody() {
        let settings = settings_with_admins("");
        assert!(!settings.is_admin(123));
    }
}
