pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::{build_app_state, AppState},
};
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG`.
///
/// Returns an error if another subscriber was installed first.
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Binds the listener described by `config`.
pub async fn bind(config: &AppConfig) -> anyhow::Result<TcpListener> {
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "bound server listener");
    Ok(listener)
}

/// Serves the router on `listener` with an already built state.
pub async fn serve(listener: TcpListener, app_state: AppState) -> anyhow::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(app_state)).await?;
    Ok(())
}

/// Builds the scanner state from `config` and serves it on `listener`.
pub async fn run(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");
    serve(listener, build_app_state(config)?).await
}

/// Binary entry point: `.env`, tracing, `config.yml`, then [`run`].
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = get_config(None)?;
    let listener = bind(&config).await?;
    run(listener, config).await
}
