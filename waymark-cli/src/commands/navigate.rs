//! Navigate command - replay GPS fixes against a route and print guidance.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use waymark::nav::geo::bearing;
use waymark::nav::{update, NavEvent, NavFix, NavState, Route, TrackPoint};

use super::common::{read_fixes, read_track};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the navigate command.
#[derive(Debug, Args)]
pub struct NavigateArgs {
    /// Route as a CSV file of lat,lon lines
    #[arg(long)]
    pub track: PathBuf,

    /// Fixes as a CSV file of lat,lon[,heading[,speed_kmh]] lines
    /// (default: drive the route itself)
    #[arg(long)]
    pub fixes: Option<PathBuf>,

    /// Speed in km/h for simulated fixes
    #[arg(long, default_value = "30")]
    pub speed: f64,

    /// Only list the detected turns
    #[arg(long)]
    pub turns_only: bool,
}

/// Run the navigate command.
pub fn run(args: NavigateArgs, options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("navigate");
    let config = runner.config();

    let points = read_track(&args.track)?;
    if points.len() < 2 {
        return Err(CliError::InvalidInput(format!(
            "track '{}' needs at least two points",
            args.track.display()
        )));
    }
    let route = Route::from_points(points, &config.turns);
    let track = route.track();
    println!(
        "Route: {} points, {:.0} m, {} turns",
        track.len(),
        track.total_distance(),
        route.turns().len()
    );
    for (i, turn) in route.turns().iter().enumerate() {
        println!(
            "  turn {:>3}: point {:>5}  {:>+7.1}°  at {:>7.0} m",
            i, turn.track_index, turn.angle, turn.cumulative_distance
        );
    }
    if args.turns_only {
        return Ok(());
    }

    let fixes = match &args.fixes {
        Some(path) => read_fixes(path)?,
        None => simulated_fixes(track.points(), args.speed),
    };
    info!(fixes = fixes.len(), "replaying fixes");
    println!();

    let mut state = NavState::new();
    let mut off_track = 0usize;
    for (i, fix) in fixes.iter().enumerate() {
        let event = update(
            fix,
            &route,
            &mut state,
            &config.navigation.thresholds,
            &config.navigation.matcher,
        );
        if matches!(event, NavEvent::OffTrack { .. }) {
            off_track += 1;
        }
        println!("{:>5} [{:>5}] {}", i, state.last_track_index, describe(&event));
    }

    println!();
    println!("Replayed {} fixes, {} off-track", fixes.len(), off_track);
    Ok(())
}

/// Fixes at every route point, heading along the route.
fn simulated_fixes(points: &[TrackPoint], speed_kmh: f64) -> Vec<NavFix> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let heading = match (points.get(i + 1), i.checked_sub(1)) {
                (Some(next), _) => bearing(p.lat, p.lon, next.lat, next.lon),
                (None, Some(j)) => bearing(points[j].lat, points[j].lon, p.lat, p.lon),
                (None, None) => 0.0,
            };
            NavFix {
                heading,
                speed_kmh,
                ..NavFix::new(p.lat, p.lon)
            }
        })
        .collect()
}

/// One-line description of a matcher event.
fn describe(event: &NavEvent) -> String {
    match event {
        NavEvent::Inactive => "inactive".to_string(),
        NavEvent::OffTrack { distance_m } => format!("off track by {:.0} m", distance_m),
        NavEvent::Finish { remaining_m } => format!("finish, {:.0} m to go", remaining_m),
        NavEvent::Guidance {
            icon,
            distance_m,
            turn_index,
            stage,
            ..
        } => format!(
            "{} in {:.0} m (turn {}, {})",
            icon,
            distance_m,
            turn_index,
            stage.as_str()
        ),
    }
}
