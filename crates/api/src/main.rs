use std::sync::Arc;

use anyhow::Context;

use shopfront_api::app::{build_app, services::build_services};
use shopfront_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();
    shopfront_observability::init();

    let settings = Settings::from_env()?;
    let services = Arc::new(build_services(&settings).await?);
    let app = build_app(services, &settings.static_dir);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
