use anyhow::Context;

use scriptaudit_api::{app, config::ServerConfig};
use scriptaudit_infra::ProviderConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scriptaudit_observability::init();

    let server = ServerConfig::from_env().context("invalid server configuration")?;
    let provider = ProviderConfig::from_env().context("invalid provider configuration")?;

    let services = app::services::AppServices::from_config(&provider);
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
