//! Markdown to [`DocumentNode`] conversion.
//!
//! Block structure comes from the tree-sitter markdown grammar and inline
//! content (emphasis, code spans, links) from its companion inline grammar.
//! The output uses HTML tag names so the renderer and the highlighter never
//! need to know where a tree came from.

use crate::node::DocumentNode;
use crate::{Error, Result};
use tree_sitter::{Node, Parser};
use tracing::debug;

/// Reusable parser pair for block and inline markdown.
pub struct MarkdownParser {
    block: Parser,
    inline: Parser,
}

impl MarkdownParser {
    /// Create a parser.
    pub fn new() -> Result<Self> {
        let mut block = Parser::new();
        block
            .set_language(&tree_sitter_md::LANGUAGE.into())
            .map_err(|e| Error::Parse(format!("Failed to set language: {e}")))?;

        let mut inline = Parser::new();
        inline
            .set_language(&tree_sitter_md::INLINE_LANGUAGE.into())
            .map_err(|e| Error::Parse(format!("Failed to set inline language: {e}")))?;

        Ok(Self { block, inline })
    }

    /// Parse `source` into a tree rooted at a `root` element.
    pub fn parse(&mut self, source: &str) -> Result<DocumentNode> {
        let tree = self
            .block
            .parse(source, None)
            .ok_or_else(|| Error::Parse("Failed to parse markdown".into()))?;

        let root = tree.root_node();
        if root.has_error() {
            debug!("markdown parse tree contains errors; converting what parsed");
        }

        let mut children = Vec::new();
        self.block_node(root, source, &mut children);
        Ok(DocumentNode::root(children))
    }

    fn block_node(&mut self, node: Node<'_>, src: &str, out: &mut Vec<DocumentNode>) {
        match node.kind() {
            "atx_heading" => {
                let level = atx_level(node);
                let content = node
                    .child_by_field_name("heading_content")
                    .map_or_else(String::new, |c| inline_source(c, src));
                out.push(DocumentNode::element(
                    format!("h{level}"),
                    self.inlines(&content),
                ));
            },
            "setext_heading" => {
                let level = if has_child(node, "setext_h2_underline") { 2 } else { 1 };
                let content = node
                    .child_by_field_name("heading_content")
                    .map_or_else(String::new, |p| paragraph_source(p, src));
                out.push(DocumentNode::element(
                    format!("h{level}"),
                    self.inlines(&content),
                ));
            },
            "paragraph" => {
                let content = paragraph_source(node, src);
                out.push(DocumentNode::element("p", self.inlines(&content)));
            },
            "fenced_code_block" => out.push(fenced_code(node, src)),
            "indented_code_block" => {
                let body = src[node.byte_range()]
                    .lines()
                    .map(strip_indent)
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push(code_block(body.trim_end_matches('\n'), None));
            },
            "block_quote" => {
                let children = self.block_children(node, src);
                out.push(DocumentNode::element("blockquote", children));
            },
            "list" => out.push(self.list(node, src)),
            "list_item" => {
                let children = self.block_children(node, src);
                out.push(DocumentNode::element("li", children));
            },
            "thematic_break" => out.push(DocumentNode::element("hr", Vec::new())),
            "pipe_table" => out.push(self.table(node, src)),
            "html_block" => {
                let raw = src[node.byte_range()].trim_end();
                out.push(
                    DocumentNode::element("div", vec![DocumentNode::text(raw)])
                        .with_attr("class", "html-block"),
                );
            },
            kind if is_syntax(kind) => {},
            _ => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.block_node(child, src, out);
                }
            },
        }
    }

    fn block_children(&mut self, node: Node<'_>, src: &str) -> Vec<DocumentNode> {
        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.block_node(child, src, &mut children);
        }
        children
    }

    fn list(&mut self, node: Node<'_>, src: &str) -> DocumentNode {
        let first_marker = node
            .named_child(0)
            .and_then(|item| item.named_child(0))
            .filter(|m| m.kind().starts_with("list_marker"));
        let ordered = first_marker.is_some_and(|m| {
            matches!(m.kind(), "list_marker_dot" | "list_marker_parenthesis")
        });

        let items = self.block_children(node, src);
        if !ordered {
            return DocumentNode::element("ul", items);
        }

        let list = DocumentNode::element("ol", items);
        let start = first_marker
            .map(|m| src[m.byte_range()].trim().trim_end_matches(['.', ')']))
            .and_then(|n| n.parse::<u64>().ok())
            .filter(|n| *n != 1);
        match start {
            Some(n) => list.with_attr("start", n.to_string()),
            None => list,
        }
    }

    fn table(&mut self, node: Node<'_>, src: &str) -> DocumentNode {
        let mut head = Vec::new();
        let mut body = Vec::new();

        let mut cursor = node.walk();
        for row in node.named_children(&mut cursor) {
            match row.kind() {
                "pipe_table_header" => head.push(self.table_row(row, src, "th")),
                "pipe_table_row" => body.push(self.table_row(row, src, "td")),
                _ => {},
            }
        }

        let mut sections = vec![DocumentNode::element("thead", head)];
        if !body.is_empty() {
            sections.push(DocumentNode::element("tbody", body));
        }
        DocumentNode::element("table", sections)
    }

    fn table_row(&mut self, row: Node<'_>, src: &str, cell_tag: &str) -> DocumentNode {
        let mut cells = Vec::new();
        let mut cursor = row.walk();
        for cell in row.named_children(&mut cursor) {
            if cell.kind() == "pipe_table_cell" {
                let content = src[cell.byte_range()].trim();
                cells.push(DocumentNode::element(cell_tag, self.inlines(content)));
            }
        }
        DocumentNode::element("tr", cells)
    }

    /// Parse inline markdown into text, `em`, `strong`, `code`, `a`, `img`
    /// and `br` nodes. Falls back to a single text leaf.
    fn inlines(&mut self, text: &str) -> Vec<DocumentNode> {
        if text.is_empty() {
            return Vec::new();
        }
        let Some(tree) = self.inline.parse(text, None) else {
            return vec![DocumentNode::text(text)];
        };
        let mut out = Vec::new();
        inline_children(tree.root_node(), text, &mut out);
        out
    }
}

fn inline_children(node: Node<'_>, src: &str, out: &mut Vec<DocumentNode>) {
    let mut pos = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        push_text(out, &src[pos..child.start_byte()]);
        pos = child.end_byte();

        match child.kind() {
            "emphasis_delimiter" | "code_span_delimiter" => {},
            "emphasis" => out.push(inline_element("em", child, src)),
            "strong_emphasis" => out.push(inline_element("strong", child, src)),
            "strikethrough" => out.push(inline_element("del", child, src)),
            "code_span" => out.push(inline_element("code", child, src)),
            "inline_link" | "full_reference_link" | "collapsed_reference_link"
            | "shortcut_link" => out.push(link(child, src)),
            "image" => {
                let alt = named_child_text(child, "image_description", src).unwrap_or("");
                let mut img = DocumentNode::element("img", Vec::new()).with_attr("alt", alt);
                if let Some(dest) = named_child_text(child, "link_destination", src) {
                    img = img.with_attr("src", dest);
                }
                out.push(img);
            },
            "hard_line_break" => out.push(DocumentNode::element("br", Vec::new())),
            "backslash_escape" => push_text(out, src[child.byte_range()].trim_start_matches('\\')),
            _ => push_text(out, &src[child.byte_range()]),
        }
    }
    push_text(out, &src[pos..node.end_byte()]);
}

fn inline_element(tag: &str, node: Node<'_>, src: &str) -> DocumentNode {
    let mut children = Vec::new();
    inline_children(node, src, &mut children);
    DocumentNode::element(tag, children)
}

fn link(node: Node<'_>, src: &str) -> DocumentNode {
    let mut children = Vec::new();
    let mut cursor = node.walk();
    let text = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "link_text");
    match text {
        Some(t) => inline_children(t, src, &mut children),
        None => push_text(&mut children, &src[node.byte_range()]),
    }

    let anchor = DocumentNode::element("a", children);
    match named_child_text(node, "link_destination", src) {
        Some(href) => anchor.with_attr("href", href),
        None => anchor,
    }
}

fn push_text(out: &mut Vec<DocumentNode>, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Some(DocumentNode::Text(last)) = out.last_mut() {
        last.value.push_str(value);
    } else {
        out.push(DocumentNode::text(value));
    }
}

fn fenced_code(node: Node<'_>, src: &str) -> DocumentNode {
    let language = named_child_text(node, "info_string", src)
        .and_then(|info| info.split_whitespace().next())
        .map(ToString::to_string);

    let mut cursor = node.walk();
    let body = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "code_fence_content")
        .map_or_else(String::new, |c| without_continuations(c, src));

    code_block(body.trim_end_matches('\n'), language.as_deref())
}

fn code_block(body: &str, language: Option<&str>) -> DocumentNode {
    let mut code = DocumentNode::element("code", vec![DocumentNode::text(body)]);
    if let Some(lang) = language {
        code = code.with_attr("class", format!("language-{lang}"));
    }
    DocumentNode::element("pre", vec![code])
}

fn atx_level(node: Node<'_>) -> u8 {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find_map(|c| match c.kind() {
            "atx_h1_marker" => Some(1),
            "atx_h2_marker" => Some(2),
            "atx_h3_marker" => Some(3),
            "atx_h4_marker" => Some(4),
            "atx_h5_marker" => Some(5),
            "atx_h6_marker" => Some(6),
            _ => None,
        })
        .unwrap_or(1)
}

fn has_child(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == kind)
}

fn named_child_text<'s>(node: Node<'_>, kind: &str, src: &'s str) -> Option<&'s str> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|c| c.kind() == kind)
        .map(|c| &src[c.byte_range()])
}

/// Structural tokens that carry no content of their own.
fn is_syntax(kind: &str) -> bool {
    kind.ends_with("_marker")
        || kind.ends_with("_delimiter")
        || matches!(
            kind,
            "block_continuation" | "link_reference_definition" | "setext_h1_underline"
                | "setext_h2_underline"
        )
}

/// Source text of a paragraph's inline content, one trimmed line per source
/// line.
fn paragraph_source(paragraph: Node<'_>, src: &str) -> String {
    let mut cursor = paragraph.walk();
    let inline = paragraph
        .named_children(&mut cursor)
        .find(|c| c.kind() == "inline");
    inline.map_or_else(
        || src[paragraph.byte_range()].trim().to_string(),
        |i| inline_source(i, src),
    )
}

fn inline_source(node: Node<'_>, src: &str) -> String {
    without_continuations(node, src)
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Text of `node` with nested block continuations (`> ` prefixes, list
/// indentation) cut out.
fn without_continuations(node: Node<'_>, src: &str) -> String {
    let mut out = String::new();
    let mut pos = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "block_continuation" {
            out.push_str(&src[pos..child.start_byte()]);
            pos = child.end_byte();
        }
    }
    out.push_str(&src[pos..node.end_byte()]);
    out
}

fn strip_indent(line: &str) -> &str {
    let spaces = line.bytes().take(4).take_while(|b| *b == b' ').count();
    line.strip_prefix('\t').unwrap_or(&line[spaces..])
}

/// Parse `source` with a fresh parser.
pub fn parse(source: &str) -> Result<DocumentNode> {
    MarkdownParser::new()?.parse(source)
}
