//! Table of contents for a local markdown file

use anyhow::Result;
use docview_core::extract_toc;
use std::path::Path;

use super::{parse_source, read_source};
use crate::output::{OutputFormat, format_toc, print_json};

pub fn execute(file: &Path, tree: bool, format: OutputFormat) -> Result<()> {
    let source = read_source(file)?;
    let toc = extract_toc(&parse_source(&source, tree)?);

    match format {
        OutputFormat::Json => print_json(&toc)?,
        OutputFormat::Text => {
            if toc.is_empty() {
                println!("No headings found");
            } else {
                print!("{}", format_toc(&toc));
            }
        },
    }
    Ok(())
}
