use std::sync::Arc;

use dealgate_api::app::{build_app, services::build_services};
use dealgate_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dealgate_observability::init();

    let config = ApiConfig::from_env();
    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
