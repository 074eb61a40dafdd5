//! Render a local markdown file as HTML

use anyhow::Result;
use docview_core::{DocumentPipeline, RenderContext};
use serde_json::json;

use super::read_source;
use crate::cli::RenderArgs;
use crate::output::{OutputFormat, print_json};

pub fn execute(args: &RenderArgs, format: OutputFormat) -> Result<()> {
    let source = read_source(&args.file)?;
    let mut pipeline = DocumentPipeline::new()?;
    let doc = pipeline.prepare(&source, &args.highlight)?;
    let html = doc.to_html(&RenderContext { theme: args.theme });

    match format {
        OutputFormat::Json => print_json(&json!({
            "theme": args.theme,
            "toc": doc.toc,
            "matches": doc.matches,
            "html": html,
        })),
        OutputFormat::Text => {
            println!("{html}");
            Ok(())
        },
    }
}
