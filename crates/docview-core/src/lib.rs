//! # docview-core
//!
//! Core functionality for docview - a reader for markdown documents served by
//! a full-text search backend.
//!
//! ## Architecture
//!
//! - **Document model**: [`DocumentNode`] trees with a mutable pre-order
//!   [`walk`](walk::walk) that can splice replacement nodes in place
//! - **Markdown**: tree-sitter based conversion of markdown into document trees
//! - **Table of contents**: h1–h4 extraction with deterministic slug ids
//! - **Highlighting**: case-insensitive marking of a search term that never
//!   changes the text of the document
//! - **Scroll spy**: active-section tracking against a top-of-viewport window
//! - **Query controller**: debounced search that only ever shows the result
//!   of the latest query
//! - **API client**: typed access to `/search`, `/stats`, `/health` and
//!   `/api/document/{filename}`
//!
//! ## Quick Start
//!
//! ```rust
//! use docview_core::{DocumentPipeline, RenderContext};
//!
//! let mut pipeline = DocumentPipeline::new()?;
//! let doc = pipeline.prepare("# Getting Started\n\nRead the docs.", "docs")?;
//!
//! assert_eq!(doc.toc[0].id, "getting-started");
//! assert_eq!(doc.matches, 1);
//! let html = doc.to_html(&RenderContext::default());
//! assert!(html.contains(r#"<span class="highlight">docs</span>"#));
//! # Ok::<(), docview_core::Error>(())
//! ```

/// HTTP client for the search backend
pub mod client;
/// Configuration loading and validation
pub mod config;
/// Error types and result aliases
pub mod error;
/// Search term highlighting
pub mod highlight;
/// Tree-sitter based markdown conversion
pub mod markdown;
/// Document tree model
pub mod node;
/// Fetch, parse, annotate and highlight a document
pub mod pipeline;
/// Debounced search controller
pub mod query;
/// HTML output
pub mod render;
/// Active-section tracking
pub mod scroll_spy;
/// Heading identifiers
pub mod slug;
/// Table of contents extraction
pub mod toc;
/// Wire types shared with the backend
pub mod types;
/// Tree traversal
pub mod walk;

pub use client::ApiClient;
pub use config::{ApiConfig, Config, ScrollSpyConfig, SearchConfig};
pub use error::{Error, Result};
pub use highlight::{HighlightSpan, Highlighter, highlight, highlight_segments, highlight_terms};
pub use markdown::MarkdownParser;
pub use node::{DocumentNode, Element, Text};
pub use pipeline::{DocumentPipeline, DocumentView, RenderedDocument};
pub use query::{QueryController, SearchBackend, SearchMachine, SearchState, SearchStatus};
pub use render::{RenderContext, Theme, render_html};
pub use scroll_spy::{IntersectionEntry, ObservedElement, Rect, ScrollSpy, Viewport};
pub use slug::slug;
pub use toc::{TocEntry, assign_heading_ids, extract_toc, extract_toc_deferred};
pub use types::{
    Document, DocumentMetadata, HealthStatus, SearchRequest, SearchResponse, SearchResult, Stats,
};
