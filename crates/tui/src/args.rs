//! CLI argument definitions

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "tracelane",
    about = "Browse Chrome trace files as a zoomable per-thread timeline",
    after_help = "\
EXAMPLES:
    tracelane trace.json                         Open in the terminal
    tracelane trace.json --svg out.svg           Export a fitted frame as SVG
    RUST_LOG=debug tracelane trace.json          Log load details to stderr

KEYS:
    ←/→ pan   +/- zoom   ↑/↓ scroll tracks   0 fit   click select   Esc deselect   q quit
    wheel pans, ctrl+wheel zooms at the pointer, shift+wheel scrolls tracks"
)]
pub struct Args {
    /// Chrome trace JSON file (array form or `{"traceEvents": [...]}`)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Layout and interaction settings as JSON
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write one fitted frame as SVG instead of opening the terminal UI
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// SVG width in pixels
    #[arg(long, default_value = "1600", requires = "svg")]
    pub width: f64,

    /// SVG height in pixels (defaults to the height of every track)
    #[arg(long, requires = "svg")]
    pub height: Option<f64>,

    /// Use the light palette for SVG output
    #[arg(long, requires = "svg")]
    pub light: bool,
}
