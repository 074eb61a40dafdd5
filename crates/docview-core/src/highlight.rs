//! Search term highlighting.
//!
//! Text leaves containing the term are split into plain text and highlight
//! elements. Only structure is added: concatenating the text of the output
//! always reproduces the input byte for byte, including the original case of
//! every match.
//!
//! The term is free text from the user, so it is escaped before it becomes a
//! pattern. `c++` matches the literal string `c++`.

use crate::node::DocumentNode;
use crate::walk::{Step, walk};
use crate::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Tag of the element wrapping a match.
pub const HIGHLIGHT_TAG: &str = "span";
/// Class marking an element as a search match. Matches the server's own
/// highlight fragments.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// A piece of a text leaf, either matching the term or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    /// Whether this piece matched the term.
    pub is_match: bool,
    /// The original text of the piece.
    pub value: String,
}

impl HighlightSpan {
    fn plain(value: &str) -> Self {
        Self {
            is_match: false,
            value: value.to_string(),
        }
    }

    fn matched(value: &str) -> Self {
        Self {
            is_match: true,
            value: value.to_string(),
        }
    }
}

/// Compiled, case-insensitive matcher for one search term.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Compile a matcher for `term`, matched literally including any
    /// surrounding whitespace. Blank terms produce an inactive highlighter
    /// that leaves everything untouched.
    pub fn new(term: &str) -> Result<Self> {
        if term.trim().is_empty() {
            return Ok(Self { pattern: None });
        }
        Ok(Self {
            pattern: Some(build_pattern(&regex::escape(term))?),
        })
    }

    /// Compile a matcher for every whitespace-separated word of `query`.
    ///
    /// Longer words are tried first so `doc docs` marks `docs` whole.
    pub fn for_terms(query: &str) -> Result<Self> {
        let mut terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return Ok(Self { pattern: None });
        }
        terms.sort_by(|a, b| b.len().cmp(&a.len()));
        terms.dedup();

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            pattern: Some(build_pattern(&alternation)?),
        })
    }

    /// Whether a non-blank term was supplied.
    pub const fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Split `text` into alternating plain and matching pieces.
    ///
    /// Text without matches comes back as a single plain piece; empty text
    /// comes back as no pieces.
    pub fn segments(&self, text: &str) -> Vec<HighlightSpan> {
        let Some(pattern) = &self.pattern else {
            return whole(text);
        };

        let mut spans = Vec::new();
        let mut last = 0;
        for m in pattern.find_iter(text) {
            if m.start() > last {
                spans.push(HighlightSpan::plain(&text[last..m.start()]));
            }
            spans.push(HighlightSpan::matched(m.as_str()));
            last = m.end();
        }
        if last < text.len() {
            spans.push(HighlightSpan::plain(&text[last..]));
        }
        spans
    }

    /// Rewrite every matching text leaf of `tree` in place and return the
    /// number of matches marked.
    pub fn apply(&self, tree: &mut DocumentNode) -> usize {
        let Some(pattern) = &self.pattern else {
            return 0;
        };

        let mut marked = 0;
        walk(tree, |cursor| {
            if is_highlight(cursor.node()) {
                return Step::Skip(1);
            }
            let DocumentNode::Text(text) = cursor.node() else {
                return Step::Continue;
            };
            if !pattern.is_match(&text.value) {
                return Step::Continue;
            }

            let spans = self.segments(&text.value);
            let replacement: Vec<DocumentNode> = spans
                .into_iter()
                .map(|span| {
                    if span.is_match {
                        marked += 1;
                        highlight_element(span.value)
                    } else {
                        DocumentNode::text(span.value)
                    }
                })
                .collect();

            cursor.replace_with(replacement)
        });

        marked
    }
}

fn build_pattern(source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Parse(format!("Invalid search term: {e}")))
}

fn whole(text: &str) -> Vec<HighlightSpan> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![HighlightSpan::plain(text)]
    }
}

/// Build the element that wraps one match.
pub fn highlight_element(value: impl Into<String>) -> DocumentNode {
    DocumentNode::element(HIGHLIGHT_TAG, vec![DocumentNode::text(value)])
        .with_attr("class", HIGHLIGHT_CLASS)
}

/// Whether `node` is an element produced by the highlighter.
pub fn is_highlight(node: &DocumentNode) -> bool {
    node.as_element()
        .is_some_and(|el| el.tag == HIGHLIGHT_TAG && el.attr("class") == Some(HIGHLIGHT_CLASS))
}

/// Return a copy of `tree` with every occurrence of `term` marked.
///
/// A blank term returns an unchanged copy.
pub fn highlight(tree: &DocumentNode, term: &str) -> Result<DocumentNode> {
    let highlighter = Highlighter::new(term)?;
    let mut out = tree.clone();
    highlighter.apply(&mut out);
    Ok(out)
}

/// Split one string on a single term.
pub fn highlight_segments(text: &str, term: &str) -> Result<Vec<HighlightSpan>> {
    Ok(Highlighter::new(term)?.segments(text))
}

/// Split one string on every word of a multi-word query. Used for result
/// titles, which are plain text rather than a document tree.
pub fn highlight_terms(text: &str, query: &str) -> Result<Vec<HighlightSpan>> {
    Ok(Highlighter::for_terms(query)?.segments(text))
}
