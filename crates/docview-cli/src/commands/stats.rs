//! Backend index statistics

use anyhow::Result;
use docview_core::Config;

use crate::output::{OutputFormat, print_json};
use crate::utils::settings::api_client;

pub async fn execute(config: &Config, format: OutputFormat) -> Result<()> {
    let stats = api_client(config)?.stats().await?;
    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text => println!("Indexed documents: {}", stats.count),
    }
    Ok(())
}
