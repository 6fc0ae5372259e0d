//! Waymark CLI - Command-line interface
//!
//! Renders map tiles, composes the device viewport into PNG files and
//! replays GPS fixes against a route.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::inspect::InspectArgs;
use commands::navigate::NavigateArgs;
use commands::render::RenderArgs;
use commands::view::ViewArgs;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "waymark")]
#[command(version, about = "Vector map tiles and route following for handheld GPS devices")]
struct Cli {
    /// Configuration file (default: <config dir>/waymark/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Map directory, overriding [map] root
    #[arg(long, global = true)]
    map: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one tile to a PNG file
    Render(RenderArgs),

    /// Summarize the commands in one tile
    Inspect(InspectArgs),

    /// Compose the viewport around a position and save the screen
    View(ViewArgs),

    /// Replay GPS fixes against a route and print guidance
    Navigate(NavigateArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        map: cli.map,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(args, &options),
        Commands::Inspect(args) => commands::inspect::run(args, &options),
        Commands::View(args) => commands::view::run(args, &options),
        Commands::Navigate(args) => commands::navigate::run(args, &options),
        Commands::Config { command } => commands::config::run(command, &options),
    };

    if let Err(e) = result {
        e.exit();
    }
}
