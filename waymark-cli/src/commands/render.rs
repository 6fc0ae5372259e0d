//! Render command - render a single tile to a PNG file.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use super::common::TileSelector;
use crate::error::CliError;
use crate::runner::{save_png, CliRunner, GlobalOptions};

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub tile: TileSelector,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Run the render command.
pub fn run(args: RenderArgs, options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("render");

    let address = args.tile.resolve(runner.config().viewport.default_zoom)?;
    let source = runner.open_source()?;

    println!("Rendering tile {}", address);
    let start = std::time::Instant::now();
    let raster = source.render(&address.path)?;
    info!(tile = %address, elapsed_ms = start.elapsed().as_millis() as u64, "tile rendered");

    save_png(&raster, &args.output)
}
