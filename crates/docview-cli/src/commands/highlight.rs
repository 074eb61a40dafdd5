//! Highlight a term in a local markdown file

use anyhow::Result;
use colored::Colorize;
use docview_core::{Highlighter, walk};
use serde_json::json;
use std::path::Path;

use super::{parse_source, plural, read_source};
use crate::output::{OutputFormat, paint_spans, print_json};

pub fn execute(file: &Path, term: &str, tree_input: bool, format: OutputFormat) -> Result<()> {
    let source = read_source(file)?;
    let highlighter = Highlighter::new(term)?;
    let original = parse_source(&source, tree_input)?;
    let mut tree = original.clone();
    let matches = highlighter.apply(&mut tree);

    if format == OutputFormat::Json {
        return print_json(&json!({
            "term": term,
            "matches": matches,
            "tree": tree,
        }));
    }

    if tree_input {
        // No source lines to number; show each matching text leaf instead.
        walk::for_each_descendant(&original, |node, _, _| {
            if let Some(text) = node.as_text() {
                let spans = highlighter.segments(text);
                if spans.iter().any(|s| s.is_match) {
                    println!("  {}", paint_spans(&spans));
                }
            }
        });
    } else {
        for (number, line) in source.lines().enumerate() {
            let spans = highlighter.segments(line);
            if spans.iter().any(|s| s.is_match) {
                println!("{:>5}  {}", (number + 1).to_string().dimmed(), paint_spans(&spans));
            }
        }
    }
    println!("{} for '{}'", plural(matches, "match", "matches"), term);
    Ok(())
}
