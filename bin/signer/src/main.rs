mod error;
mod handlers;
mod settings;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use settings::Args;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustora_signer=info".into()),
        )
        .init();

    let args = Args::parse();
    let signer_settings = settings::SignerSettings::load(&args)?;

    let metrics_addr: std::net::SocketAddr =
        format!("{}:{}", signer_settings.bind, signer_settings.metrics_port).parse()?;
    PrometheusBuilder::new().with_http_listener(metrics_addr).install()?;

    let bind = signer_settings.bind.clone();
    let port = signer_settings.port;
    let state = Arc::new(AppState::build(signer_settings).await?);

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/address", post(handlers::address::handle_address))
        .route("/payout", post(handlers::payout::handle_payout))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("trustora-signer listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
