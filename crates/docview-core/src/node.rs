//! Text/element document tree.
//!
//! The tree is produced outside this crate (see [`crate::markdown`] for the
//! tree-sitter bridge) and then handed to one transform at a time. Transforms
//! either mutate it in place through [`crate::walk::walk`] or return a new tree.
//!
//! The serde representation follows hast, so JSON emitted by other tooling can
//! be read directly:
//!
//! ```json
//! {"type":"element","tagName":"p","properties":{},"children":[{"type":"text","value":"hi"}]}
//! ```
//!
//! hast `root` nodes read as an element tagged `root`. Property values may be
//! strings, numbers, booleans or lists; lists (such as `className`) are joined
//! with spaces and `className`/`htmlFor` are stored as `class`/`for`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tag used for the synthetic root element of a parsed document.
pub const ROOT_TAG: &str = "root";

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentNode {
    /// A text leaf.
    Text(Text),
    /// An element with a tag, attributes and ordered children.
    #[serde(alias = "root")]
    Element(Element),
}

/// Text leaf payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    /// Raw text value.
    pub value: String,
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name, e.g. `h2` or `span`.
    #[serde(rename = "tagName", default = "root_tag")]
    pub tag: String,
    /// String attributes (`id`, `class`, ...).
    #[serde(
        default,
        rename = "properties",
        deserialize_with = "deserialize_properties"
    )]
    pub attributes: BTreeMap<String, String>,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Build a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Text {
            value: value.into(),
        })
    }

    /// Build an element without attributes.
    pub fn element(tag: impl Into<String>, children: Vec<Self>) -> Self {
        Self::Element(Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children,
        })
    }

    /// Build an empty root element.
    pub fn root(children: Vec<Self>) -> Self {
        Self::element(ROOT_TAG, children)
    }

    /// Set an attribute. Text leaves are returned unchanged.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element(el) = &mut self {
            el.attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Borrow the element payload, if this is an element.
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Mutably borrow the element payload, if this is an element.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Borrow the text value, if this is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.value),
            Self::Element(_) => None,
        }
    }

    /// Concatenation of every text leaf under this node, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text_content(&mut out);
        out
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(&t.value),
            Self::Element(el) => {
                for child in &el.children {
                    child.push_text_content(out);
                }
            },
        }
    }
}

impl Element {
    /// Heading level for `h1`..`h6`, `None` for any other tag.
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text_content(&mut out);
        }
        out
    }
}

fn root_tag() -> String {
    ROOT_TAG.to_string()
}

fn deserialize_properties<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| {
            let name = match name.as_str() {
                "className" => "class".to_string(),
                "htmlFor" => "for".to_string(),
                _ => name,
            };
            property_string(value).map(|v| (name, v))
        })
        .collect())
}

/// `false`, `null` and nested objects mean "attribute absent".
fn property_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some(String::new()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(property_string)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::Bool(false) | Value::Null | Value::Object(_) => None,
    }
}
