use crate::settings::CoordinatorSettings;

#[derive(Clone)]
pub struct AppState {
    pub settings: CoordinatorSettings,
    pub pool: trustora_db::PgPool,
    pub redis: redis::aio::ConnectionManager,
    pub http: reqwest::Client,
}

impl AppState {
    pub async fn build(settings: CoordinatorSettings) -> anyhow::Result<Self> {
        let pool = trustora_db::connect(&settings.database_url).await?;
        let redis = trustora_kv::connect(&settings.redis_url).await?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { settings, pool, redis, http })
    }
}
