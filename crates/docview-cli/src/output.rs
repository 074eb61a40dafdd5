//! Output formatting shared by all commands.
//!
//! Text output is for people: colors, highlights and aligned lists. JSON output
//! is a single pretty-printed value on stdout so it can be piped into `jq`.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use docview_core::{HighlightSpan, SearchResult, TocEntry, highlight_terms};
use serde::Serialize;

/// Output format for command results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Join highlight spans, painting the matching ones.
pub fn paint_spans(spans: &[HighlightSpan]) -> String {
    spans
        .iter()
        .map(|span| {
            if span.is_match {
                span.value.black().on_yellow().to_string()
            } else {
                span.value.clone()
            }
        })
        .collect()
}

/// Table of contents indented by depth.
pub fn format_toc(toc: &[TocEntry]) -> String {
    let mut out = String::new();
    for entry in toc {
        let indent = "  ".repeat(usize::from(entry.depth.saturating_sub(1)));
        out.push_str(&format!("{indent}- {} {}\n", entry.text, format!("#{}", entry.id).dimmed()));
    }
    out
}

/// One search result as a short block of text.
pub fn format_result(rank: usize, result: &SearchResult, query: &str) -> String {
    let title = highlight_terms(&result.title(), query)
        .map_or_else(|_| result.title(), |spans| paint_spans(&spans));

    let mut out = format!(
        "{rank}. {} {}\n   score {:.2} · {:.1} KB\n",
        title.bold(),
        format!("({})", result.filename).dimmed(),
        result.score,
        result.size_kb(),
    );

    let snippet = result.highlight_segments();
    let body = if snippet.is_empty() {
        result.preview(200)
    } else {
        paint_spans(&snippet)
    };
    for line in body.lines().filter(|l| !l.trim().is_empty()).take(3) {
        out.push_str("   ");
        out.push_str(line.trim());
        out.push('\n');
    }
    out
}
