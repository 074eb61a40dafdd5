//! Wire types for the search backend.

use crate::highlight::HighlightSpan;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default number of characters shown in a result preview.
pub const PREVIEW_CHARS: usize = 500;

#[allow(clippy::expect_used)]
static SERVER_HIGHLIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span class=['"]highlight['"]>(.*?)</span>"#).expect("valid highlight regex")
});

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text.
    pub query: String,
}

/// Response of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching documents on the server.
    pub total: u64,
    /// Results in server rank order.
    pub results: Vec<SearchResult>,
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document filename, usable with `/api/document/{filename}`.
    pub filename: String,
    /// Full markdown content.
    pub content: String,
    /// Server relevance score.
    pub score: f64,
    /// Server-side highlight fragments, joined with ` ... `.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

/// Response of `GET /stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of indexed documents.
    pub count: u64,
}

/// Response of `GET /api/document/{filename}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document filename.
    pub filename: String,
    /// Markdown content.
    pub content: String,
    /// Display title computed by the server.
    #[serde(default)]
    pub title: Option<String>,
    /// First prose line, truncated by the server.
    #[serde(default)]
    pub description: Option<String>,
    /// Last modification timestamp as reported by the server.
    #[serde(default)]
    pub last_modified: Option<String>,
    /// Size of the source file in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Extra metadata.
    #[serde(default)]
    pub metadata: Option<DocumentMetadata>,
}

/// Optional document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// Search engine connectivity.
    #[serde(default)]
    pub elasticsearch: Option<String>,
}

impl HealthStatus {
    /// Whether the backend reported itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

impl Document {
    /// Best available display title: metadata, then server title, then one
    /// derived from the filename.
    pub fn display_title(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(|m| m.title.clone())
            .or_else(|| self.title.clone())
            .unwrap_or_else(|| title_from_filename(&self.filename))
    }
}

impl SearchResult {
    /// Title derived from the filename: `getting-started.md` → `Getting Started`.
    pub fn title(&self) -> String {
        title_from_filename(&self.filename)
    }

    /// First `limit` characters of the content followed by `...`.
    pub fn preview(&self, limit: usize) -> String {
        let mut out: String = self.content.chars().take(limit).collect();
        out.push_str("...");
        out
    }

    /// Content size in KiB.
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> f64 {
        self.content.len() as f64 / 1024.0
    }

    /// Split the server's highlight fragment into plain and matching pieces.
    pub fn highlight_segments(&self) -> Vec<HighlightSpan> {
        self.highlight
            .as_deref()
            .map(parse_server_highlight)
            .unwrap_or_default()
    }
}

/// Convert a filename into a title: drop `.md`, turn `-` and `_` into spaces,
/// capitalize each word.
pub fn title_from_filename(filename: &str) -> String {
    let stem = filename.replacen(".md", "", 1).replace(['-', '_'], " ");
    stem.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `<span class='highlight'>..</span>` markup into spans.
pub fn parse_server_highlight(fragment: &str) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in SERVER_HIGHLIGHT.captures_iter(fragment) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(HighlightSpan {
                is_match: false,
                value: fragment[last..whole.start()].to_string(),
            });
        }
        spans.push(HighlightSpan {
            is_match: true,
            value: inner.as_str().to_string(),
        });
        last = whole.end();
    }
    if last < fragment.len() {
        spans.push(HighlightSpan {
            is_match: false,
            value: fragment[last..].to_string(),
        });
    }
    spans
}
