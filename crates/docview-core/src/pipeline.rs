//! Document view pipeline: markdown in, highlighted tree and TOC out.
//!
//! The TOC is taken from the tree before highlighting so heading text and ids
//! never depend on the search term. Rendering happens after highlighting, so
//! the highlighter only ever sees plain text leaves.
//!
//! [`DocumentPipeline::load`] receives its TOC through
//! [`extract_toc_deferred`], so the list arrives on a later tick, after the
//! highlight pass over the tree has finished. [`DocumentPipeline::prepare`] is
//! the synchronous form for callers outside a runtime.

use crate::client::ApiClient;
use crate::highlight::Highlighter;
use crate::markdown::MarkdownParser;
use crate::node::DocumentNode;
use crate::render::{RenderContext, render_html};
use crate::toc::{TocEntry, assign_heading_ids, extract_toc, extract_toc_deferred};
use crate::types::Document;
use crate::{Error, Result};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A prepared document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    /// Tree with heading ids and highlight elements applied.
    pub tree: DocumentNode,
    /// Table of contents in document order.
    pub toc: Vec<TocEntry>,
    /// Number of highlighted matches.
    pub matches: usize,
}

impl RenderedDocument {
    /// Render the prepared tree as HTML.
    pub fn to_html(&self, ctx: &RenderContext) -> String {
        render_html(&self.tree, ctx)
    }
}

/// Outcome of loading a document for display.
#[derive(Debug)]
pub enum DocumentView {
    /// The document was fetched and prepared.
    Ready {
        /// Server response.
        document: Document,
        /// Prepared tree and TOC.
        rendered: RenderedDocument,
    },
    /// The server has no document with that filename.
    NotFound(String),
    /// The fetch or the preparation failed.
    Failed(Error),
}

/// Reusable document preparation.
pub struct DocumentPipeline {
    parser: MarkdownParser,
}

impl DocumentPipeline {
    /// Create a pipeline.
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: MarkdownParser::new()?,
        })
    }

    /// Parse `markdown`, assign heading ids, extract the TOC and highlight
    /// `term`. A blank term skips highlighting.
    pub fn prepare(&mut self, markdown: &str, term: &str) -> Result<RenderedDocument> {
        let highlighter = Highlighter::new(term)?;
        let mut tree = self.annotated_tree(markdown)?;

        let toc = extract_toc(&tree);
        let matches = highlighter.apply(&mut tree);
        debug!(
            headings = toc.len(),
            matches, "prepared document ({} bytes)",
            markdown.len()
        );

        Ok(RenderedDocument { tree, toc, matches })
    }

    /// Like [`prepare`](Self::prepare), with the TOC delivered after the
    /// highlight pass instead of computed inline.
    async fn prepare_deferred(&mut self, markdown: &str, term: &str) -> Result<RenderedDocument> {
        let highlighter = Highlighter::new(term)?;
        let mut tree = self.annotated_tree(markdown)?;

        let (toc_tx, toc_rx) = oneshot::channel();
        let _delivery = extract_toc_deferred(&tree, move |toc| {
            // The receiver only goes away if this future was dropped.
            let _ = toc_tx.send(toc);
        });
        let matches = highlighter.apply(&mut tree);
        let toc = toc_rx.await.map_err(|_| Error::Cancelled)?;
        debug!(headings = toc.len(), matches, "prepared document with deferred toc");

        Ok(RenderedDocument { tree, toc, matches })
    }

    fn annotated_tree(&mut self, markdown: &str) -> Result<DocumentNode> {
        let mut tree = self.parser.parse(markdown)?;
        assign_heading_ids(&mut tree);
        Ok(tree)
    }

    /// Fetch `filename` and prepare it for display.
    pub async fn load(&mut self, client: &ApiClient, filename: &str, term: &str) -> DocumentView {
        let document = match client.document(filename).await {
            Ok(doc) => doc,
            Err(Error::DocumentNotFound(name)) => return DocumentView::NotFound(name),
            Err(e) => {
                warn!("failed to load {filename}: {e}");
                return DocumentView::Failed(e);
            },
        };

        match self.prepare_deferred(&document.content, term).await {
            Ok(rendered) => DocumentView::Ready { document, rendered },
            Err(e) => DocumentView::Failed(e),
        }
    }
}
