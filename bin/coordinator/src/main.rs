mod error;
mod handlers;
mod settings;
mod signer_client;
mod state;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use settings::Args;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustora_coordinator=info".into()),
        )
        .init();

    let args = Args::parse();
    let settings = settings::CoordinatorSettings::load(&args)?;

    let metrics_addr: std::net::SocketAddr =
        format!("{}:{}", settings.bind, settings.port + 1000).parse()?;
    PrometheusBuilder::new().with_http_listener(metrics_addr).install()?;

    let bind = settings.bind.clone();
    let port = settings.port;
    let state = Arc::new(AppState::build(settings).await?);

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/escrows", post(handlers::escrow::create_escrow))
        .route("/escrows/:id", get(handlers::escrow::get_escrow))
        .route("/escrows/:id/release", post(handlers::release::request_release))
        .route("/escrows/:id/dispute", post(handlers::dispute::open_dispute))
        .route("/escrows/:id/reviews", post(handlers::review::submit_review))
        .route("/admin/escrows/:id/approve", post(handlers::release::admin_approve_release))
        .route("/admin/fees", post(handlers::admin::update_fees))
        .route("/admin/kill-switch", post(handlers::admin::toggle_kill_switch))
        .route("/admin/users/block", post(handlers::admin::toggle_block_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    tracing::info!(%bind, %port, "trustora-coordinator listening");
    axum::serve(listener, app).await?;
    Ok(())
}
