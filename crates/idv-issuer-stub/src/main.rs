use idv_issuer_stub::{AppState, IssuerConfig, build_router, fixtures};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; only report real failures.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,idv_issuer_stub=debug")),
        )
        .init();

    let mut config = IssuerConfig::from_env()?;
    if config.clients.is_empty() {
        tracing::info!("No client registry configured, using the built-in demo client");
        config.clients = fixtures::demo_registry();
    }

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, name = %config.name, "Starting credential issuer stub");

    let state = AppState::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
