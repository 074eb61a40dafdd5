//! # CLI Structure and Argument Parsing
//!
//! `docview` reads markdown documents either from disk or from the search
//! backend, and exposes each stage of the document pipeline as a subcommand:
//!
//! ```bash
//! # Local files
//! docview toc guide.md
//! docview highlight guide.md install
//! docview render guide.md --highlight install --theme dark
//! docview spy guide.md --at 0 --at 600
//!
//! # Backend
//! docview search "getting started"
//! docview search --interactive
//! docview get getting-started.md --highlight install
//! docview stats
//! docview health
//! ```
//!
//! Every command accepts `--format json` for scripting. The backend location
//! comes from `--api-url`, `DOCVIEW_API_URL`, or the config file.

use clap::{Args, Parser, Subcommand};
use docview_core::Theme;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `docview` command
#[derive(Parser, Clone, Debug)]
#[command(name = "docview")]
#[command(version)]
#[command(about = "docview - read, search and navigate markdown documentation", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Base URL of the search backend
    #[arg(long, global = true, env = "DOCVIEW_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Path to a config file
    #[arg(long, global = true, env = "DOCVIEW_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print the table of contents of a markdown file
    Toc {
        /// Markdown file, or `-` for stdin
        file: PathBuf,
        /// Treat the input as a JSON document tree instead of markdown
        #[arg(long)]
        tree: bool,
    },

    /// Mark every occurrence of a term in a markdown file
    Highlight {
        /// Markdown file, or `-` for stdin
        file: PathBuf,
        /// Term to highlight (case-insensitive, matched literally)
        term: String,
        /// Treat the input as a JSON document tree instead of markdown
        #[arg(long)]
        tree: bool,
    },

    /// Render a markdown file as HTML
    Render(RenderArgs),

    /// Search the backend
    Search(SearchArgs),

    /// Fetch and display one document from the backend
    Get(GetArgs),

    /// Show how many documents the backend has indexed
    Stats,

    /// Check backend health
    Health,

    /// Simulate scrolling through a document and report the active section
    Spy(SpyArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Highlight this term in the output
    #[arg(long, value_name = "TERM", default_value = "")]
    pub highlight: String,

    /// Color theme for the document container
    #[arg(long, default_value = "light")]
    pub theme: Theme,
}

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Search query
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Maximum number of results to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Read queries from stdin line by line, searching as you type
    #[arg(short = 'i', long)]
    pub interactive: bool,
}

#[derive(Args, Clone, Debug)]
pub struct GetArgs {
    /// Document filename as returned by search
    pub filename: String,

    /// Highlight this term in the document
    #[arg(long, value_name = "TERM", default_value = "")]
    pub highlight: String,

    /// Print the document as HTML instead of markdown
    #[arg(long)]
    pub html: bool,

    /// Color theme used with `--html`
    #[arg(long, default_value = "light")]
    pub theme: Theme,
}

#[derive(Args, Clone, Debug)]
pub struct SpyArgs {
    /// Markdown file, or `-` for stdin
    pub file: PathBuf,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    pub viewport: f64,

    /// Scroll offsets to visit, in order (default: step through the document)
    #[arg(long = "at", value_name = "OFFSET")]
    pub offsets: Vec<f64>,

    /// Jump to this section id after scrolling
    #[arg(long, value_name = "ID")]
    pub goto: Option<String>,
}
