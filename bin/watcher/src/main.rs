mod scan;
mod settings;

use std::time::Duration;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use trustora_chain::{BscBackend, ChainBackend, RpcClient, TronBackend};
use trustora_core::Chain;

use settings::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustora_watcher=info".into()),
        )
        .init();

    let args = Args::parse();
    let chain: Chain = args.chain.into();
    let watcher_settings = settings::WatcherSettings::load(&args)?;
    let chain_settings = watcher_settings.for_chain(chain)?;

    let metrics_addr: std::net::SocketAddr =
        format!("{}:{}", watcher_settings.bind, watcher_settings.port + 1000).parse()?;
    PrometheusBuilder::new().with_http_listener(metrics_addr).install()?;

    let pool = trustora_db::connect(&watcher_settings.database_url).await?;
    let mut redis = trustora_kv::connect(&watcher_settings.redis_url).await?;

    let rpc_urls: Vec<String> =
        chain_settings.rpc_urls.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect();
    let backend: Box<dyn ChainBackend> = match chain {
        Chain::Trc20 => Box::new(TronBackend::new(RpcClient::new(rpc_urls))),
        Chain::Bep20 => Box::new(BscBackend::new(
            rpc_urls.into_iter().next().ok_or_else(|| anyhow::anyhow!("no rpc urls configured"))?,
        )),
    };

    let app = Router::new().route("/healthz", get(|| async { "ok" }));
    let http_addr = format!("{}:{}", watcher_settings.bind, watcher_settings.port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    tracing::info!(%chain, "trustora-watcher scan loop starting");
    loop {
        if let Err(err) =
            scan::scan_once(chain, &chain_settings, &pool, &mut redis, backend.as_ref()).await
        {
            tracing::error!(%err, "scan error");
        }
        tokio::time::sleep(Duration::from_secs(chain_settings.scan_interval_seconds)).await;
    }
}
