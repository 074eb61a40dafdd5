//! Fetch one document from the backend
//!
//! A missing document prints a message on stderr and exits with status 2.

use anyhow::Result;
use colored::Colorize;
use docview_core::{
    Config, Document, DocumentPipeline, DocumentView, Highlighter, RenderContext,
    RenderedDocument,
};
use serde_json::json;

use super::plural;
use crate::cli::GetArgs;
use crate::output::{OutputFormat, format_toc, paint_spans, print_json};
use crate::utils::settings::api_client;

pub async fn execute(args: &GetArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = api_client(config)?;
    let mut pipeline = DocumentPipeline::new()?;

    let (document, rendered) = match pipeline.load(&client, &args.filename, &args.highlight).await
    {
        DocumentView::Ready { document, rendered } => (document, rendered),
        DocumentView::NotFound(name) => {
            eprintln!("{} Document not found: {name}", "✗".red());
            std::process::exit(2);
        },
        DocumentView::Failed(e) => return Err(e.into()),
    };

    let html = args
        .html
        .then(|| rendered.to_html(&RenderContext { theme: args.theme }));

    match format {
        OutputFormat::Json => print_json(&json!({
            "document": document,
            "title": document.display_title(),
            "toc": rendered.toc,
            "matches": rendered.matches,
            "html": html,
        })),
        OutputFormat::Text => {
            print_header(&document, &rendered);
            match html {
                Some(html) => println!("{html}"),
                None => print_body(&document.content, &args.highlight)?,
            }
            Ok(())
        },
    }
}

fn print_header(document: &Document, rendered: &RenderedDocument) {
    println!("{}", document.display_title().bold());

    let mut meta = vec![document.filename.clone()];
    let size = document
        .file_size
        .or_else(|| document.metadata.as_ref().and_then(|m| m.size));
    if let Some(bytes) = size {
        meta.push(format!("{bytes} bytes"));
    }
    if let Some(modified) = &document.last_modified {
        meta.push(format!("modified {modified}"));
    }
    if rendered.matches > 0 {
        meta.push(plural(rendered.matches, "match", "matches"));
    }
    println!("{}", meta.join(" · ").dimmed());

    if let Some(description) = &document.description {
        println!("{description}");
    }

    if !rendered.toc.is_empty() {
        println!("\n{}", "Contents".bold());
        print!("{}", format_toc(&rendered.toc));
    }
    println!();
}

fn print_body(content: &str, term: &str) -> Result<()> {
    let highlighter = Highlighter::new(term)?;
    println!("{}", paint_spans(&highlighter.segments(content)));
    Ok(())
}
