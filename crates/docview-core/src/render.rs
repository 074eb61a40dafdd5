//! HTML rendering of document trees.

use crate::node::{DocumentNode, Element, ROOT_TAG};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Color scheme the document is rendered for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl Theme {
    /// The other theme.
    pub const fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Attribute value used on the document container.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// Rendering options passed explicitly to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// Active theme.
    pub theme: Theme,
}

/// Render `tree` as an HTML fragment.
///
/// The root becomes `<div class="markdown-content" data-theme="…">`. Text and
/// attribute values are escaped; tag names are emitted as stored.
pub fn render_html(tree: &DocumentNode, ctx: &RenderContext) -> String {
    let mut out = String::new();
    render_node(tree, ctx, &mut out);
    out
}

fn render_node(node: &DocumentNode, ctx: &RenderContext, out: &mut String) {
    match node {
        DocumentNode::Text(text) => out.push_str(&encode_text(&text.value)),
        DocumentNode::Element(el) if el.tag == ROOT_TAG => {
            let _ = write!(
                out,
                r#"<div class="markdown-content" data-theme="{}">"#,
                ctx.theme.as_str()
            );
            render_children(el, ctx, out);
            out.push_str("</div>");
        },
        DocumentNode::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attributes {
                let _ = write!(out, r#" {name}="{}""#, encode_double_quoted_attribute(value));
            }
            if VOID_TAGS.contains(&el.tag.as_str()) {
                out.push_str(" />");
                return;
            }
            out.push('>');
            render_children(el, ctx, out);
            let _ = write!(out, "</{}>", el.tag);
        },
    }
}

fn render_children(el: &Element, ctx: &RenderContext, out: &mut String) {
    for child in &el.children {
        render_node(child, ctx, out);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::highlight::highlight;

    #[test]
    fn renders_root_with_theme() {
        let tree = DocumentNode::root(vec![DocumentNode::element(
            "p",
            vec![DocumentNode::text("hi")],
        )]);
        let dark = RenderContext { theme: Theme::Dark };

        assert_eq!(
            render_html(&tree, &dark),
            r#"<div class="markdown-content" data-theme="dark"><p>hi</p></div>"#
        );
        assert!(render_html(&tree, &RenderContext::default()).contains(r#"data-theme="light""#));
    }

    #[test]
    fn escapes_text_and_attributes() {
        let tree = DocumentNode::element(
            "a",
            vec![DocumentNode::text("<script>&")],
        )
        .with_attr("href", r#"x" onclick="y"#);

        let html = render_html(&tree, &RenderContext::default());
        assert!(html.contains("&lt;script&gt;&amp;"));
        assert!(!html.contains(r#"" onclick=""#));
    }

    #[test]
    fn void_elements_self_close() {
        let tree = DocumentNode::element("hr", Vec::new());
        assert_eq!(render_html(&tree, &RenderContext::default()), "<hr />");
    }

    #[test]
    fn highlights_render_as_spans() {
        let tree = DocumentNode::root(vec![DocumentNode::element(
            "p",
            vec![DocumentNode::text("read the docs")],
        )]);
        let html = render_html(&highlight(&tree, "DOCS").unwrap(), &RenderContext::default());
        assert!(html.contains(r#"<span class="highlight">docs</span>"#));
    }

    #[test]
    fn theme_toggles_and_parses() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
