//! Command implementations for the docview CLI
//!
//! Local commands (`toc`, `highlight`, `render`, `spy`) read markdown from a
//! file or stdin. Remote commands (`search`, `get`, `stats`, `health`) talk to
//! the search backend.

mod get;
mod health;
mod highlight;
mod render;
mod search;
mod spy;
mod stats;
mod toc;

pub use get::execute as get_document;
pub use health::execute as check_health;
pub use highlight::execute as highlight_file;
pub use render::execute as render_file;
pub use search::execute as search;
pub use spy::execute as spy_file;
pub use stats::execute as show_stats;
pub use toc::execute as show_toc;

use anyhow::{Context, Result};
use docview_core::{DocumentNode, markdown};
use std::io::Read;
use std::path::Path;

/// Read markdown from `path`, or from stdin when `path` is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading markdown from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Parse `source` as markdown, or as a serialized document tree when `tree` is set.
pub fn parse_source(source: &str, tree: bool) -> Result<DocumentNode> {
    if tree {
        return serde_json::from_str(source).context("parsing document tree JSON");
    }
    Ok(markdown::parse(source)?)
}

/// `1 match`, `3 matches`.
pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
