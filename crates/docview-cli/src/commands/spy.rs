//! Scroll spy simulation for a local markdown file
//!
//! Top-level blocks are laid out at fixed heights: 40px per heading and 24px
//! per line of text for everything else. The spy is then scrolled through the
//! given offsets and the active section is reported after each one.

use anyhow::{Result, bail};
use colored::Colorize;
use docview_core::{
    Config, DocumentNode, DocumentPipeline, ObservedElement, Rect, ScrollSpy, Viewport,
};
use serde::Serialize;

use super::read_source;
use crate::cli::SpyArgs;
use crate::output::{OutputFormat, print_json};

const HEADING_HEIGHT: f64 = 40.0;
const LINE_HEIGHT: f64 = 24.0;

#[derive(Debug, Serialize)]
struct Section {
    id: String,
    top: f64,
}

#[derive(Debug, Serialize)]
struct Frame {
    scroll_top: f64,
    active: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpyReport {
    height: f64,
    viewport: f64,
    sections: Vec<Section>,
    frames: Vec<Frame>,
}

pub fn execute(args: &SpyArgs, config: &Config, format: OutputFormat) -> Result<()> {
    if args.viewport <= 0.0 {
        bail!("--viewport must be positive");
    }

    let source = read_source(&args.file)?;
    let mut pipeline = DocumentPipeline::new()?;
    let doc = pipeline.prepare(&source, "")?;
    let (elements, height) = layout(&doc.tree);

    let sections = elements
        .iter()
        .map(|e| Section {
            id: e.id.clone(),
            top: e.rect.top,
        })
        .collect();

    let mut spy = ScrollSpy::new(&config.scroll_spy);
    spy.scroll_to(Viewport::new(0.0, args.viewport));
    spy.observe(elements);

    let offsets = if args.offsets.is_empty() {
        default_offsets(height, args.viewport * config.scroll_spy.window_ratio)
    } else {
        args.offsets.clone()
    };

    let mut frames = Vec::with_capacity(offsets.len() + 1);
    for offset in offsets {
        spy.scroll_to(Viewport::new(offset, args.viewport));
        frames.push(Frame {
            scroll_top: offset,
            active: spy.active_id().map(str::to_string),
        });
    }

    if let Some(id) = &args.goto {
        let Some(top) = spy.navigate_to(id) else {
            bail!("no section with id '{id}'");
        };
        frames.push(Frame {
            scroll_top: top,
            active: spy.active_id().map(str::to_string),
        });
    }

    let report = SpyReport {
        height,
        viewport: args.viewport,
        sections,
        frames,
    };
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Observed headings and the total document height.
#[allow(clippy::cast_precision_loss)]
fn layout(tree: &DocumentNode) -> (Vec<ObservedElement>, f64) {
    let mut elements = Vec::new();
    let mut y = 0.0;
    let Some(root) = tree.as_element() else {
        return (elements, y);
    };

    for block in &root.children {
        let height = match block.as_element() {
            Some(el) if el.heading_level().is_some() => {
                if let Some(id) = el.attr("id") {
                    elements.push(ObservedElement::new(id, Rect::new(y, HEADING_HEIGHT)));
                }
                HEADING_HEIGHT
            },
            _ => LINE_HEIGHT * block.text_content().lines().count().max(1) as f64,
        };
        y += height;
    }
    (elements, y)
}

fn default_offsets(height: f64, step: f64) -> Vec<f64> {
    let step = step.max(1.0);
    (0_u32..)
        .map(|i| f64::from(i) * step)
        .take_while(|offset| *offset < height)
        .collect()
}

fn print_report(report: &SpyReport) {
    if report.sections.is_empty() {
        println!("No sections to track");
        return;
    }
    for frame in &report.frames {
        let active = frame.active.as_deref().unwrap_or("-");
        println!("{:>8.0}px  {}", frame.scroll_top, active.bold());
    }
}
