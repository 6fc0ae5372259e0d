//! View command - compose the viewport around a position and save the
//! screen image.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use tracing::{debug, info};

use waymark::cache::Preloader;
use waymark::codec::Color332;
use waymark::coord::{format_latitude, format_longitude};
use waymark::nav::Track;
use waymark::viewport::{DisplayMode, FrameBuffer, ViewportController};

use super::common::{parse_lat_lon, read_track};
use crate::error::CliError;
use crate::runner::{save_png, CliRunner, GlobalOptions};

/// Display mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Direction of travel points up
    HeadingUp,
    /// North points up
    NorthUp,
}

impl From<ModeArg> for DisplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::HeadingUp => DisplayMode::HeadingUp,
            ModeArg::NorthUp => DisplayMode::NorthUp,
        }
    }
}

/// Arguments for the view command.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Latitude of the live position
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the live position
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Zoom level (default: [viewport] zoom)
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Course over ground in degrees
    #[arg(long, default_value = "0")]
    pub heading: f64,

    /// Display mode (default: [viewport] mode)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Destination marker as lat,lon
    #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
    pub waypoint: Option<(f64, f64)>,

    /// Route to draw, as a CSV file of lat,lon lines
    #[arg(long)]
    pub track: Option<PathBuf>,

    /// Screen width in pixels
    #[arg(long, default_value = "240")]
    pub width: u32,

    /// Screen height in pixels
    #[arg(long, default_value = "320")]
    pub height: u32,

    /// Save the whole 3x3 canvas instead of the screen
    #[arg(long)]
    pub canvas: bool,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Run the view command.
pub fn run(args: ViewArgs, options: &GlobalOptions) -> Result<(), CliError> {
    if args.width == 0 || args.height == 0 {
        return Err(CliError::InvalidInput("screen size must be non-zero".to_string()));
    }

    let runner = CliRunner::new(options)?;
    runner.log_startup("view");
    let config = runner.config();

    let source = runner.open_source()?;
    let cache = Arc::new(config.cache.build());
    let mut viewport_config = config.viewport.clone();
    if let Some(mode) = args.mode {
        viewport_config.mode = mode.into();
    }
    let zoom = viewport_config.clamp_zoom(args.zoom.unwrap_or(viewport_config.default_zoom));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .build()
        .map_err(CliError::Runtime)?;

    let mut viewport =
        ViewportController::new(Arc::clone(&source), Arc::clone(&cache), viewport_config);
    if config.cache.preload && cache.is_enabled() {
        let preloader = Preloader::spawn_on(
            runtime.handle(),
            source,
            Arc::clone(&cache),
            config.cache.queue_depth,
        );
        viewport = viewport.with_preloader(preloader);
    }

    if let Some(path) = &args.track {
        let points = read_track(path)?;
        println!("Loaded track with {} points", points.len());
        viewport.set_route(Some(Arc::new(Track::new(points))));
    }
    viewport.set_waypoint(args.waypoint);
    viewport.set_position(args.lat, args.lon);

    if !viewport.generate(zoom) {
        return Err(CliError::InvalidInput(format!(
            "position {}, {} cannot be shown",
            args.lat, args.lon
        )));
    }

    // Let the preloader finish, then pick up any deferred tiles.
    if let Some(preloader) = viewport.take_preloader() {
        let stats = preloader.stats();
        runtime.block_on(preloader.shutdown());
        debug!(?stats, "preloader finished");
        viewport.generate(zoom);
    }

    let center = viewport.center().map(|c| c.path.clone()).unwrap_or_default();
    info!(tile = %center, zoom, scale = viewport.scale_label(), "viewport composed");
    println!(
        "Position {} {}",
        format_latitude(args.lat),
        format_longitude(args.lon)
    );
    println!("Centered on tile {} (scale {})", center, viewport.scale_label());
    let stats = cache.stats();
    println!(
        "Cache: {} of {} tiles, {} hits, {} misses",
        cache.len(),
        cache.capacity(),
        stats.hits,
        stats.misses
    );

    if args.canvas {
        return save_png(viewport.canvas(), &args.output);
    }

    let mut surface = FrameBuffer::new(args.width, args.height, Color332::BLACK);
    viewport.display(&mut surface, args.heading);
    save_png(surface.raster(), &args.output)
}
