use sockstock_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sockstock_observability::init();

    let config = AppConfig::from_env()?;
    let services = sockstock_api::app::services::build_services(&config).await?;
    let app = sockstock_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
