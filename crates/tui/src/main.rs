mod args;
mod renderer;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tracelane_core::svg::render_svg;
use tracelane_core::{TimelineConfig, TimelineState};

use crate::args::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TimelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TimelineConfig::default(),
    };

    let data = std::fs::read(&args.trace)
        .with_context(|| format!("failed to read {}", args.trace.display()))?;
    let name = display_name(&args.trace);

    match &args.svg {
        Some(out) => {
            let mut state = TimelineState::new(config);
            state
                .load_trace(&data, name.clone())
                .with_context(|| format!("failed to load {name}"))?;
            export_svg(&mut state, &args, out)
        }
        None => {
            let mut state = TimelineState::new(renderer::terminal_config(config));
            state
                .load_trace(&data, name.clone())
                .with_context(|| format!("failed to load {name}"))?;
            renderer::run(&mut state)
        }
    }
}

fn export_svg(state: &mut TimelineState, args: &Args, out: &Path) -> Result<()> {
    let height = args.height.unwrap_or_else(|| {
        state
            .config()
            .layout
            .content_height(state.trace().tracks().len())
    });
    state.resize(args.width, height);

    let svg = render_svg(&state.render(), state.surface(), !args.light);
    std::fs::write(out, svg).with_context(|| format!("failed to write {}", out.display()))?;
    info!("wrote {}", out.display());
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
