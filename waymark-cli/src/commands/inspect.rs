//! Inspect command - print a summary of a tile's command stream.

use std::collections::BTreeMap;

use clap::Args;

use waymark::codec::{DecodedTile, Layer};

use super::common::TileSelector;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the inspect command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub tile: TileSelector,

    /// List every decoded command
    #[arg(long)]
    pub commands: bool,
}

/// Run the inspect command.
pub fn run(args: InspectArgs, options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("inspect");

    let address = args.tile.resolve(runner.config().viewport.default_zoom)?;
    let source = runner.open_source()?;
    let tile = source.decode(&address.path)?;

    print!("{}", summary(&address.path, &tile));

    if args.commands {
        println!();
        for (i, entry) in tile.commands.iter().enumerate() {
            let bounds = entry.command.bounds();
            println!(
                "{:>5}  {:<9}  {:<12}  ({}, {})..({}, {})",
                i,
                entry.layer.as_str(),
                entry.command.kind(),
                bounds.min_x,
                bounds.min_y,
                bounds.max_x,
                bounds.max_y
            );
        }
    }
    Ok(())
}

/// Human-readable tile summary.
fn summary(path: &str, tile: &DecodedTile) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tile {}\n", path));
    out.push_str(&format!("  Declared commands: {}\n", tile.declared));
    out.push_str(&format!("  Drawable shapes:   {}\n", tile.commands.len()));
    out.push_str(&format!("  Skipped:           {}\n", tile.skipped));
    out.push_str(&format!("  Seam-suppressed:   {}\n", tile.suppressed));
    if tile.truncated {
        out.push_str("  Stream truncated\n");
    }

    let mut layers: BTreeMap<Layer, usize> = BTreeMap::new();
    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    for entry in &tile.commands {
        *layers.entry(entry.layer).or_default() += 1;
        *kinds.entry(entry.command.kind()).or_default() += 1;
    }

    out.push_str("\n  By layer:\n");
    for (layer, count) in &layers {
        out.push_str(&format!("    {:<10} {}\n", layer.as_str(), count));
    }
    out.push_str("\n  By shape:\n");
    for (kind, count) in &kinds {
        out.push_str(&format!("    {:<12} {}\n", kind, count));
    }
    out
}
