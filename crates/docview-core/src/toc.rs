//! Table of contents extraction.
//!
//! The TOC is recomputed from scratch for every document; there is no
//! incremental patching. Entries keep document order and are never regrouped
//! by depth.

use crate::node::DocumentNode;
use crate::slug::slug;
use crate::walk::{Step, for_each_descendant, walk};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;

/// Deepest heading level that appears in the TOC.
pub const MAX_TOC_DEPTH: u8 = 4;

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Identifier derived from `text` with [`slug`].
    pub id: String,
    /// Trimmed heading text with inline formatting flattened.
    pub text: String,
    /// Heading level, 1 to [`MAX_TOC_DEPTH`].
    pub depth: u8,
}

/// Collect h1–h4 headings in document order.
///
/// Headings whose text is empty after trimming are skipped. Ids are not
/// deduplicated.
pub fn extract_toc(tree: &DocumentNode) -> Vec<TocEntry> {
    let mut toc = Vec::new();

    for_each_descendant(tree, |node, _, _| {
        let Some(el) = node.as_element() else {
            return;
        };
        let Some(depth) = el.heading_level().filter(|d| *d <= MAX_TOC_DEPTH) else {
            return;
        };

        let raw = el.text_content();
        let text = raw.trim();
        if text.is_empty() {
            return;
        }

        toc.push(TocEntry {
            id: slug(text),
            text: text.to_string(),
            depth,
        });
    });

    debug!("extracted {} toc entries", toc.len());
    toc
}

/// Hand a finished TOC to `on_extracted` on a later scheduler tick.
///
/// The callback never runs inside the caller's current transform pass, and it
/// always receives the complete list. Must be called from within a tokio
/// runtime.
pub fn deliver_deferred<F>(toc: Vec<TocEntry>, on_extracted: F) -> JoinHandle<()>
where
    F: FnOnce(Vec<TocEntry>) + Send + 'static,
{
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        on_extracted(toc);
    })
}

/// Extract the TOC of `tree` and deliver it through [`deliver_deferred`].
pub fn extract_toc_deferred<F>(tree: &DocumentNode, on_extracted: F) -> JoinHandle<()>
where
    F: FnOnce(Vec<TocEntry>) + Send + 'static,
{
    deliver_deferred(extract_toc(tree), on_extracted)
}

/// Set `id` on every h1–h4 element so rendered headings match the TOC.
///
/// Uses the same text and slug rules as [`extract_toc`]; headings with empty
/// text are left alone. Returns the number of headings annotated.
pub fn assign_heading_ids(tree: &mut DocumentNode) -> usize {
    let mut assigned = 0;

    walk(tree, |cursor| {
        if let Some(el) = cursor.node_mut().as_element_mut() {
            if el.heading_level().is_some_and(|d| d <= MAX_TOC_DEPTH) {
                let raw = el.text_content();
                let text = raw.trim();
                if !text.is_empty() {
                    el.attributes.insert("id".to_string(), slug(text));
                    assigned += 1;
                }
            }
        }
        Step::Continue
    });

    assigned
}
