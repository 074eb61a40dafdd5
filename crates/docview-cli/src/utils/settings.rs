//! Resolve the effective configuration from flags, environment and files.

use anyhow::{Context, Result};
use docview_core::{ApiClient, Config};
use tracing::debug;

use crate::cli::Cli;

/// Load the config file named by `--config`/`DOCVIEW_CONFIG` or the platform
/// default, then apply `--api-url`/`DOCVIEW_API_URL`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load()?,
    };

    if let Some(url) = cli.api_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        debug!("using backend {url}");
        config.api.base_url = url.to_string();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Build an API client from the effective configuration.
pub fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(&config.api)
        .with_context(|| format!("cannot use backend at {}", config.api.base_url))
}
