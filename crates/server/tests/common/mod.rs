//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port, backed by a
//! `MockFetcher` so no request leaves the machine.

#![allow(unused)]

use anyhow::Result;
use formscout_server::{config::AppConfig, state::build_app_state_with_fetcher};
use formscout_test_utils::MockFetcher;
use reqwest::Client;
use std::sync::{Arc, Once};
use tokio::task::JoinHandle;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub fetcher: MockFetcher,
    _server_handle: JoinHandle<()>,
}

impl TestApp {
    /// Spawns the server with default settings.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::default(), MockFetcher::new()).await
    }

    /// Spawns the server with the given configuration and fetcher.
    pub async fn spawn_with(mut config: AppConfig, fetcher: MockFetcher) -> Result<Self> {
        setup_tracing();

        config.bind_host = "127.0.0.1".to_string();
        config.port = 0;
        let listener = formscout_server::bind(&config).await?;
        let app_state = build_app_state_with_fetcher(config, Arc::new(fetcher.clone()))?;
        let address = format!("http://{}", listener.local_addr()?);

        let server_handle = tokio::spawn(async move {
            let _ = formscout_server::serve(listener, app_state).await;
        });

        Ok(Self {
            address,
            client: Client::new(),
            fetcher,
            _server_handle: server_handle,
        })
    }
}
