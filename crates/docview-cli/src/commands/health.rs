//! Backend health check
//!
//! Exits with status 1 when the backend reports itself unhealthy.

use anyhow::Result;
use colored::Colorize;
use docview_core::Config;

use crate::output::{OutputFormat, print_json};
use crate::utils::settings::api_client;

pub async fn execute(config: &Config, format: OutputFormat) -> Result<()> {
    let health = api_client(config)?.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Text => {
            let status = if health.is_healthy() {
                health.status.green()
            } else {
                health.status.red()
            };
            match &health.elasticsearch {
                Some(engine) => println!("Backend: {status} (search engine {engine})"),
                None => println!("Backend: {status}"),
            }
        },
    }

    if !health.is_healthy() {
        std::process::exit(1);
    }
    Ok(())
}
