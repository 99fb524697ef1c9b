//! # Application State

use crate::config::AppConfig;
use formscout::{HtmlFetcher, SurveyScanner};
use formscout_web::ProxyGateway;
use std::sync::Arc;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The scanner serving every extraction.
    pub scanner: Arc<SurveyScanner>,
}

/// Builds the shared application state, fetching through the configured proxies.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let gateway = ProxyGateway::new(config.gateway.clone())?;
    build_app_state_with_fetcher(config, Arc::new(gateway))
}

/// Builds the shared application state around an arbitrary fetcher.
pub fn build_app_state_with_fetcher(
    config: AppConfig,
    fetcher: Arc<dyn HtmlFetcher>,
) -> anyhow::Result<AppState> {
    let scanner = SurveyScanner::builder()
        .fetcher(fetcher)
        .config(config.scanner.clone())
        .build()?;

    Ok(AppState {
        config: Arc::new(config),
        scanner: Arc::new(scanner),
    })
}
