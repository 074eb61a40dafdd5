//! Search the backend
//!
//! One-shot mode sends a single query. Interactive mode treats every stdin
//! line as the latest value of a search box: input is debounced, superseded
//! requests are cancelled, and each state change is printed. A line reading
//! `:retry` retries a failed search.

use anyhow::{Result, bail};
use colored::Colorize;
use docview_core::{ApiClient, Config, QueryController, SearchResult, SearchState, SearchStatus};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::plural;
use crate::cli::SearchArgs;
use crate::output::{OutputFormat, format_result, print_json};
use crate::utils::settings::api_client;

const RETRY_COMMAND: &str = ":retry";

pub async fn execute(args: &SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = api_client(config)?;
    if args.interactive {
        return interactive(client, config, args.limit, format).await;
    }

    let joined = args.query.join(" ");
    let query = joined.trim();
    if query.is_empty() {
        bail!("a search query is required (or use --interactive)");
    }

    let response = client.search(query).await?;
    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Text => print_results(query, &response.results, response.total, args.limit),
    }
    Ok(())
}

async fn interactive(
    client: ApiClient,
    config: &Config,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let controller = QueryController::spawn(Arc::new(client), config.search.debounce());
    let mut updates = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_shown: Option<SearchState> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == RETRY_COMMAND => controller.retry(),
                Some(line) => controller.set_query(line),
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                show_state(&state, &mut last_shown, limit, format)?;
            },
        }
    }

    debug!("stdin closed; waiting for the last search");
    let state = controller.settled().await;
    show_state(&state, &mut last_shown, limit, format)?;
    controller.shutdown().await;
    Ok(())
}

fn show_state(
    state: &SearchState,
    last_shown: &mut Option<SearchState>,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    if last_shown.as_ref() == Some(state) {
        return Ok(());
    }
    *last_shown = Some(state.clone());

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }

    match state.status {
        SearchStatus::Idle => {},
        SearchStatus::Loading => {
            eprintln!("{}", format!("Searching for '{}'...", state.query).dimmed());
        },
        SearchStatus::Success => print_results(&state.query, &state.results, state.total, limit),
        SearchStatus::Empty => println!("No results for '{}'", state.query),
        SearchStatus::Error => {
            let message = state.error.as_deref().unwrap_or("unknown error");
            println!(
                "{} Search failed: {message}. Type {RETRY_COMMAND} to try again.",
                "✗".red()
            );
        },
    }
    Ok(())
}

fn print_results(query: &str, results: &[SearchResult], total: u64, limit: usize) {
    if results.is_empty() {
        println!("No results for '{query}'");
        return;
    }

    let total = usize::try_from(total).unwrap_or(usize::MAX);
    println!(
        "{} for '{}'\n",
        plural(total, "result", "results").bold(),
        query
    );
    for (index, result) in results.iter().take(limit).enumerate() {
        println!("{}", format_result(index + 1, result, query));
    }
    if results.len() > limit {
        println!(
            "{}",
            format!("... {} more not shown (use --limit)", results.len() - limit).dimmed()
        );
    }
}
