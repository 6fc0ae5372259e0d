//! The 3×3 tile canvas and its life cycle.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::{Preloader, TileCache};
use crate::codec::{Color332, Point};
use crate::coord::{
    global_pixel, global_pixel_to_lat_lon, scale_label, TileAddress, TileBounds, TILE_SIZE,
};
use crate::nav::Track;
use crate::render::stroke::{draw_circle, draw_line};
use crate::render::{no_data_raster, Painter, Raster};
use crate::source::TileSource;

use super::{DisplayMode, DisplaySurface, ViewportConfig, ViewportState};

/// Tiles along each canvas axis.
pub const CANVAS_TILES: u32 = 3;

/// Canvas edge length in pixels.
pub const CANVAS_SIZE: u32 = CANVAS_TILES * TILE_SIZE;

const SLOTS: usize = (CANVAS_TILES * CANVAS_TILES) as usize;
const CENTER_SLOT: usize = SLOTS / 2;
const TILE: f64 = TILE_SIZE as f64;
const HALF_TILE: f64 = TILE / 2.0;
const WAYPOINT_RADIUS: i16 = 5;

// Segments are clamped to this range before rasterizing.
const ROUTE_CLAMP: i32 = 4 * CANVAS_SIZE as i32;

/// Manual pan state. Offsets are the view center's displacement from the
/// reference tile's center, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Pan {
    active: bool,
    offset_x: f64,
    offset_y: f64,
    velocity_x: f64,
    velocity_y: f64,
}

/// Composes map tiles around the current position and puts them on screen.
///
/// Driven from a single loop: [`set_position`](Self::set_position) with each
/// fix, [`generate`](Self::generate) to bring the canvas up to date, then
/// [`display`](Self::display).
pub struct ViewportController {
    config: ViewportConfig,
    source: Arc<TileSource>,
    cache: Arc<TileCache>,
    preloader: Option<Preloader>,
    // Composed tiles without overlays.
    base: Raster,
    canvas: Raster,
    state: ViewportState,
    zoom: u8,
    composed_zoom: Option<u8>,
    center: Option<TileAddress>,
    bounds: Option<TileBounds>,
    pending: [bool; SLOTS],
    // Whether the last preload request was queued.
    requested: bool,
    position: Option<(f64, f64)>,
    waypoint: Option<(f64, f64)>,
    route: Option<Arc<Track>>,
    pan: Pan,
}

impl ViewportController {
    pub fn new(source: Arc<TileSource>, cache: Arc<TileCache>, config: ViewportConfig) -> Self {
        let zoom = config.clamp_zoom(config.default_zoom);
        let canvas = Raster::new(CANVAS_SIZE, CANVAS_SIZE, config.background);
        Self {
            config,
            source,
            cache,
            preloader: None,
            base: canvas.clone(),
            canvas,
            state: ViewportState::Idle,
            zoom,
            composed_zoom: None,
            center: None,
            bounds: None,
            pending: [false; SLOTS],
            requested: false,
            position: None,
            waypoint: None,
            route: None,
            pan: Pan::default(),
        }
    }

    /// Attaches a background preloader for neighbour tiles.
    pub fn with_preloader(mut self, preloader: Preloader) -> Self {
        self.preloader = Some(preloader);
        self
    }

    /// Detaches the preloader, e.g. to shut it down.
    pub fn take_preloader(&mut self) -> Option<Preloader> {
        self.preloader.take()
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn canvas(&self) -> &Raster {
        &self.canvas
    }

    /// The reference tile at the canvas center.
    pub fn center(&self) -> Option<&TileAddress> {
        self.center.as_ref()
    }

    /// Geographic union of the nine canvas tiles.
    pub fn bounds(&self) -> Option<TileBounds> {
        self.bounds
    }

    pub fn is_panning(&self) -> bool {
        self.pan.active
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }

    /// Scale bar label for the current zoom.
    pub fn scale_label(&self) -> &'static str {
        scale_label(self.zoom)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inputs
    // ─────────────────────────────────────────────────────────────────────

    /// Records a live fix. The canvas follows it on the next
    /// [`generate`](Self::generate) unless the user is panning.
    pub fn set_position(&mut self, lat: f64, lon: f64) {
        self.position = Some((lat, lon));
    }

    /// Ends manual panning and follows the live position again.
    pub fn recenter(&mut self) -> bool {
        self.pan = Pan::default();
        self.state = ViewportState::Idle;
        self.generate(self.zoom)
    }

    pub fn zoom_in(&mut self) -> u8 {
        let zoom = self.config.clamp_zoom(self.zoom.saturating_add(1));
        self.generate(zoom);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> u8 {
        let zoom = self.config.clamp_zoom(self.zoom.saturating_sub(1));
        self.generate(zoom);
        self.zoom
    }

    /// Sets or clears the destination marker. Only the overlays are redrawn.
    pub fn set_waypoint(&mut self, waypoint: Option<(f64, f64)>) {
        self.waypoint = waypoint;
        if self.center.is_some() {
            self.paint_overlays();
        }
    }

    /// Sets or clears the route drawn over the map.
    pub fn set_route(&mut self, route: Option<Arc<Track>>) {
        self.route = route;
        if self.center.is_some() {
            self.paint_overlays();
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Composition
    // ─────────────────────────────────────────────────────────────────────

    /// Brings the canvas up to date for `zoom`. Returns whether it changed.
    ///
    /// A zoom change invalidates the canvas and the tile cache. A new
    /// reference tile recomposes all nine slots; otherwise only slots still
    /// showing a placeholder are retried from the cache.
    pub fn generate(&mut self, zoom: u8) -> bool {
        let zoom = self.config.clamp_zoom(zoom);
        if self.state == ViewportState::ZoomChanged {
            self.state = ViewportState::Idle;
        }

        let zoom_changed = self.composed_zoom.is_some_and(|z| z != zoom);
        if self.composed_zoom != Some(zoom) {
            self.cache.set_zoom(zoom);
        }
        if zoom_changed {
            debug!(from = ?self.composed_zoom, to = zoom, "viewport zoom changed");
            self.state = ViewportState::ZoomChanged;
        }

        let Some(reference) = self.reference_tile(zoom, zoom_changed) else {
            return false;
        };
        self.zoom = zoom;

        let moved = self
            .center
            .as_ref()
            .map_or(true, |current| !current.same_tile(&reference));
        if zoom_changed || moved {
            self.compose(reference);
            self.composed_zoom = Some(zoom);
            return true;
        }
        self.retry_pending()
    }

    /// Tile the canvas should be built around.
    fn reference_tile(&mut self, zoom: u8, zoom_changed: bool) -> Option<TileAddress> {
        if self.pan.active {
            let current = self.center.as_ref()?;
            if !zoom_changed {
                return Some(current.clone());
            }
            // Keep the view center fixed across the zoom change.
            let gx = current.tile_x as f64 * TILE + HALF_TILE + self.pan.offset_x;
            let gy = current.tile_y as f64 * TILE + HALF_TILE + self.pan.offset_y;
            let (lat, lon) = global_pixel_to_lat_lon(gx, gy, current.zoom);
            let address = TileAddress::new(lat, lon, zoom).ok()?;
            let (px, py) = global_pixel(lat, lon, zoom);
            self.pan.offset_x = (px % TILE_SIZE as u64) as f64 - HALF_TILE;
            self.pan.offset_y = (py % TILE_SIZE as u64) as f64 - HALF_TILE;
            return Some(address);
        }
        let (lat, lon) = self.position?;
        match TileAddress::new(lat, lon, zoom) {
            Ok(address) => Some(address),
            Err(err) => {
                warn!(lat, lon, error = %err, "position cannot be mapped");
                None
            }
        }
    }

    fn compose(&mut self, center: TileAddress) {
        self.pending = [false; SLOTS];
        for row in 0..CANVAS_TILES as i32 {
            for col in 0..CANVAS_TILES as i32 {
                self.fill_slot(&center, col, row);
            }
        }
        self.bounds = union_bounds(&center);
        self.request_preload(&center);
        debug!(tile = %center, "composed viewport");
        self.center = Some(center);
        self.paint_overlays();
    }

    /// Fills one canvas slot (column, row in `0..3`) for the canvas around `center`.
    fn fill_slot(&mut self, center: &TileAddress, col: i32, row: i32) {
        let slot = (row * CANVAS_TILES as i32 + col) as usize;
        let (x, y) = (col * TILE_SIZE as i32, row * TILE_SIZE as i32);
        self.pending[slot] = false;

        let Ok(address) = center.neighbor(col - 1, row - 1) else {
            self.base.blit(&no_data_raster(), x, y);
            return;
        };
        if let Some(raster) = self.cache.get(&address.path) {
            self.base.blit(&raster, x, y);
            return;
        }

        if !self.decodes_inline() {
            trace!(path = %address.path, "deferring tile to preloader");
            self.base.blit(&no_data_raster(), x, y);
            self.pending[slot] = true;
            return;
        }

        match self.source.render(&address.path) {
            Ok(raster) => {
                let raster = Arc::new(raster);
                self.base.blit(&raster, x, y);
                self.cache.put(&address.path, raster);
            }
            Err(err) if err.is_absent() => {
                debug!(path = %address.path, "no map data for tile");
                self.base.blit(&no_data_raster(), x, y);
            }
            Err(err) => {
                warn!(path = %address.path, error = %err, "tile render failed");
                self.base.blit(&no_data_raster(), x, y);
            }
        }
    }

    /// Whether cache misses are rendered on the calling thread. Without a
    /// preloader, or with the cache disabled, nothing else would fill them.
    fn decodes_inline(&self) -> bool {
        self.config.foreground_decode || self.preloader.is_none() || !self.cache.is_enabled()
    }

    /// Asks the preloader for the tiles around `center`, the center itself
    /// included while its slot is pending.
    fn request_preload(&mut self, center: &TileAddress) {
        let Some(preloader) = &self.preloader else {
            return;
        };
        self.requested = if self.pending[CENTER_SLOT] {
            preloader.request_tile_and_neighbors(center)
        } else {
            preloader.request_neighbors(center)
        };
    }

    fn retry_pending(&mut self) -> bool {
        let Some(center) = self.center.clone() else {
            return false;
        };
        let mut filled = false;
        for slot in 0..SLOTS {
            if !self.pending[slot] {
                continue;
            }
            let (col, row) = ((slot % 3) as i32, (slot / 3) as i32);
            let Ok(address) = center.neighbor(col - 1, row - 1) else {
                self.pending[slot] = false;
                continue;
            };
            if let Some(raster) = self.cache.get(&address.path) {
                self.base
                    .blit(&raster, col * TILE_SIZE as i32, row * TILE_SIZE as i32);
                self.pending[slot] = false;
                filled = true;
            }
        }
        if !self.requested && self.pending.contains(&true) {
            self.request_preload(&center);
        }
        if filled {
            self.paint_overlays();
        }
        filled
    }

    // ─────────────────────────────────────────────────────────────────────
    // Panning
    // ─────────────────────────────────────────────────────────────────────

    /// Moves the view by (`dx`, `dy`) pixels and starts inertia.
    ///
    /// Returns `false` when there is no canvas to pan yet.
    pub fn scroll(&mut self, dx: f64, dy: f64) -> bool {
        if self.center.is_none() {
            return false;
        }
        self.pan.active = true;
        self.pan.velocity_x = dx;
        self.pan.velocity_y = dy;
        self.state = ViewportState::Scrolling;
        self.apply_offset(dx, dy);
        true
    }

    /// Continues scroll inertia. Returns whether the view moved.
    pub fn tick(&mut self) -> bool {
        if !self.pan.active {
            return false;
        }
        let vx = self.pan.velocity_x * self.config.inertia_decay;
        let vy = self.pan.velocity_y * self.config.inertia_decay;
        if vx.hypot(vy) < self.config.min_velocity {
            self.pan.velocity_x = 0.0;
            self.pan.velocity_y = 0.0;
            if self.state == ViewportState::Scrolling {
                self.state = ViewportState::Idle;
            }
            return false;
        }
        self.pan.velocity_x = vx;
        self.pan.velocity_y = vy;
        self.apply_offset(vx, vy);
        true
    }

    fn apply_offset(&mut self, dx: f64, dy: f64) {
        self.pan.offset_x += dx;
        self.pan.offset_y += dy;

        while self.pan.offset_x > HALF_TILE {
            if !self.shift_reference(1, 0) {
                self.pan.offset_x = HALF_TILE;
                self.pan.velocity_x = 0.0;
                break;
            }
            self.pan.offset_x -= TILE;
        }
        while self.pan.offset_x < -HALF_TILE {
            if !self.shift_reference(-1, 0) {
                self.pan.offset_x = -HALF_TILE;
                self.pan.velocity_x = 0.0;
                break;
            }
            self.pan.offset_x += TILE;
        }
        while self.pan.offset_y > HALF_TILE {
            if !self.shift_reference(0, 1) {
                self.pan.offset_y = HALF_TILE;
                self.pan.velocity_y = 0.0;
                break;
            }
            self.pan.offset_y -= TILE;
        }
        while self.pan.offset_y < -HALF_TILE {
            if !self.shift_reference(0, -1) {
                self.pan.offset_y = -HALF_TILE;
                self.pan.velocity_y = 0.0;
                break;
            }
            self.pan.offset_y += TILE;
        }
    }

    /// Moves the reference tile by one and fills the exposed strip.
    fn shift_reference(&mut self, dx: i32, dy: i32) -> bool {
        let Some(next) = self.center.as_ref().and_then(|c| c.neighbor(dx, dy).ok()) else {
            return false;
        };
        let ts = TILE_SIZE as i32;
        self.base.shift(-dx * ts, -dy * ts, self.config.background);

        let n = CANVAS_TILES as i32;
        let previous = self.pending;
        let mut exposed = Vec::with_capacity(CANVAS_TILES as usize);
        for row in 0..n {
            for col in 0..n {
                let (sc, sr) = (col + dx, row + dy);
                let slot = (row * n + col) as usize;
                if (0..n).contains(&sc) && (0..n).contains(&sr) {
                    self.pending[slot] = previous[(sr * n + sc) as usize];
                } else {
                    exposed.push((col, row));
                }
            }
        }
        for (col, row) in exposed {
            self.fill_slot(&next, col, row);
        }

        self.bounds = union_bounds(&next);
        self.request_preload(&next);
        trace!(tile = %next, "viewport shifted");
        self.center = Some(next);
        self.paint_overlays();
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Overlays
    // ─────────────────────────────────────────────────────────────────────

    /// Canvas pixel of a geographic point at the current zoom.
    pub fn canvas_pixel(&self, lat: f64, lon: f64) -> Option<(i32, i32)> {
        let center = self.center.as_ref()?;
        let (gx, gy) = global_pixel(lat, lon, center.zoom);
        let ox = (center.tile_x as i64 - 1) * TILE_SIZE as i64;
        let oy = (center.tile_y as i64 - 1) * TILE_SIZE as i64;
        Some(((gx as i64 - ox) as i32, (gy as i64 - oy) as i32))
    }

    /// Canvas pixel of the live position.
    pub fn position_pixel(&self) -> Option<(i32, i32)> {
        let (lat, lon) = self.position?;
        self.canvas_pixel(lat, lon)
    }

    /// Canvas pixel of the destination marker, if it lies on the canvas tiles.
    pub fn waypoint_pixel(&self) -> Option<(i32, i32)> {
        let (lat, lon) = self.waypoint?;
        if !self.bounds?.contains(lat, lon) {
            return None;
        }
        self.canvas_pixel(lat, lon)
    }

    /// Draws a track as a polyline over the canvas. The base tiles are left
    /// alone, so the next overlay repaint keeps only the route from
    /// [`set_route`](Self::set_route).
    pub fn draw_route(&mut self, track: &Track) {
        let pixels: Vec<(i32, i32)> = track
            .points()
            .iter()
            .filter_map(|p| self.canvas_pixel(p.lat, p.lon))
            .collect();
        let limit = CANVAS_SIZE as i32;
        let (color, width) = (self.config.route_color, self.config.route_width);
        let mut painter = Painter::new(&mut self.canvas);
        for pair in pixels.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let off_canvas = (a.0 < 0 && b.0 < 0)
                || (a.1 < 0 && b.1 < 0)
                || (a.0 >= limit && b.0 >= limit)
                || (a.1 >= limit && b.1 >= limit);
            if off_canvas {
                continue;
            }
            draw_line(&mut painter, clamp_point(a), clamp_point(b), color, width);
        }
    }

    /// Redraws the canvas from the base tiles, then the route and marker.
    fn paint_overlays(&mut self) {
        self.canvas.blit(&self.base, 0, 0);
        if let Some(track) = self.route.clone() {
            self.draw_route(&track);
        }
        if let Some((x, y)) = self.waypoint_pixel() {
            let mut painter = Painter::new(&mut self.canvas);
            draw_circle(
                &mut painter,
                clamp_point((x, y)),
                WAYPOINT_RADIUS,
                Some(Color332::RED),
                Color332::BLACK,
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────

    /// Rotates the canvas onto `surface`.
    ///
    /// Heading-up rotates around the live position so the direction of
    /// travel points up. North-up, and any manual pan, pivots on the view
    /// center without rotation.
    pub fn display<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S, heading: f64) {
        let heading_up = self.config.mode == DisplayMode::HeadingUp && !self.pan.active;
        let view_center = (
            CANVAS_SIZE as f64 / 2.0 + self.pan.offset_x,
            CANVAS_SIZE as f64 / 2.0 + self.pan.offset_y,
        );
        let (pivot, angle) = if heading_up {
            let pivot = self
                .position_pixel()
                .map_or(view_center, |(x, y)| (x as f64 + 0.5, y as f64 + 0.5));
            (pivot, -heading)
        } else {
            (view_center, 0.0)
        };

        let rotating = angle.rem_euclid(360.0) != 0.0;
        match self.state {
            ViewportState::Idle if rotating => self.state = ViewportState::Rotating,
            ViewportState::Rotating if !rotating => self.state = ViewportState::Idle,
            _ => {}
        }
        surface.blit_rotated(&self.canvas, pivot, angle, self.config.transparent);
    }
}

impl std::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("state", &self.state)
            .field("zoom", &self.zoom)
            .field("center", &self.center.as_ref().map(|c| c.path.as_str()))
            .field("panning", &self.pan.active)
            .finish_non_exhaustive()
    }
}

fn union_bounds(center: &TileAddress) -> Option<TileBounds> {
    let n = CANVAS_TILES as i32;
    (0..n * n)
        .filter_map(|i| center.neighbor(i % n - 1, i / n - 1).ok())
        .map(|address| address.bounds())
        .reduce(|acc, b| acc.union(&b))
}

fn clamp_point((x, y): (i32, i32)) -> Point {
    Point::new(
        x.clamp(-ROUTE_CLAMP, ROUTE_CLAMP) as i16,
        y.clamp(-ROUTE_CLAMP, ROUTE_CLAMP) as i16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{TileDecoder, TileWriter, LOGICAL_PER_PIXEL as PX};
    use crate::nav::TrackPoint;
    use crate::render::Renderer;
    use crate::storage::MemoryTileStore;
    use crate::viewport::FrameBuffer;

    const ZOOM: u8 = 12;
    const LAT: f64 = 41.3874;
    const LON: f64 = 2.1686;

    fn solid_tile(color: Color332) -> Vec<u8> {
        TileWriter::new()
            .set_color(color)
            .rectangle(0, 0, 256 * PX, 256 * PX)
            .finish()
    }

    /// Store holding every tile within `radius` of the tile under LAT/LON,
    /// each painted GREEN except the center which is RED.
    fn store_around(radius: i32) -> (Arc<MemoryTileStore>, TileAddress) {
        let store = Arc::new(MemoryTileStore::new());
        let center = TileAddress::new(LAT, LON, ZOOM).unwrap();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let color = if dx == 0 && dy == 0 {
                    Color332::RED
                } else {
                    Color332::GREEN
                };
                let tile = center.neighbor(dx, dy).unwrap();
                store.insert(tile.path, solid_tile(color));
            }
        }
        (store, center)
    }

    fn controller(store: Arc<MemoryTileStore>, capacity: usize) -> ViewportController {
        let source = Arc::new(TileSource::new(store, TileDecoder::new(), Renderer::default()));
        ViewportController::new(
            source,
            Arc::new(TileCache::new(capacity)),
            ViewportConfig {
                default_zoom: ZOOM,
                ..Default::default()
            },
        )
    }

    fn slot_color(viewport: &ViewportController, col: i32, row: i32) -> Option<Color332> {
        viewport.canvas().get(col * 256 + 128, row * 256 + 128)
    }

    #[test]
    fn test_generate_without_position_does_nothing() {
        let (store, _) = store_around(1);
        let mut viewport = controller(store, 16);
        assert!(!viewport.generate(ZOOM));
        assert!(viewport.center().is_none());
    }

    #[test]
    fn test_generate_composes_nine_tiles() {
        let (store, center) = store_around(1);
        let mut viewport = controller(Arc::clone(&store), 16);
        viewport.set_position(LAT, LON);

        assert!(viewport.generate(ZOOM));
        assert!(viewport.center().unwrap().same_tile(&center));
        assert_eq!(slot_color(&viewport, 1, 1), Some(Color332::RED));
        assert_eq!(slot_color(&viewport, 0, 0), Some(Color332::GREEN));
        assert_eq!(slot_color(&viewport, 2, 2), Some(Color332::GREEN));
        assert_eq!(store.read_count(), 9);

        // Same tile again: nothing to do.
        assert!(!viewport.generate(ZOOM));
        assert_eq!(store.read_count(), 9);
    }

    #[test]
    fn test_missing_neighbor_shows_placeholder() {
        let (store, center) = store_around(1);
        store.remove(&center.neighbor(1, 0).unwrap().path);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);

        let placeholder = no_data_raster();
        assert_eq!(
            slot_color(&viewport, 2, 1),
            placeholder.get(128, 128),
        );
        assert_eq!(slot_color(&viewport, 1, 1), Some(Color332::RED));
    }

    #[test]
    fn test_bounds_cover_all_nine_tiles() {
        let (store, center) = store_around(1);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);

        let bounds = viewport.bounds().unwrap();
        let nw = center.neighbor(-1, -1).unwrap().bounds();
        let se = center.neighbor(1, 1).unwrap().bounds();
        assert_eq!(bounds.lat_max, nw.lat_max);
        assert_eq!(bounds.lon_min, nw.lon_min);
        assert_eq!(bounds.lat_min, se.lat_min);
        assert_eq!(bounds.lon_max, se.lon_max);
    }

    #[test]
    fn test_zoom_change_invalidates_cache() {
        let (store, _) = store_around(1);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);
        let generation = viewport.cache.generation();
        assert!(viewport.cache.len() > 0);

        assert!(viewport.generate(ZOOM + 1));
        assert_eq!(viewport.state(), ViewportState::ZoomChanged);
        assert!(viewport.cache.generation() > generation);
        assert_eq!(viewport.zoom(), ZOOM + 1);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (store, _) = store_around(1);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(30);
        assert_eq!(viewport.zoom(), viewport.config().max_zoom);
    }

    #[test]
    fn test_scroll_past_half_tile_fills_only_the_strip() {
        let (store, center) = store_around(2);
        let mut viewport = controller(Arc::clone(&store), 32);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);
        let reads = store.read_count();

        // Under half a tile: no shift.
        viewport.scroll(100.0, 0.0);
        assert!(viewport.center().unwrap().same_tile(&center));
        assert_eq!(store.read_count(), reads);

        viewport.scroll(60.0, 0.0);
        let east = center.neighbor(1, 0).unwrap();
        assert!(viewport.center().unwrap().same_tile(&east));
        assert_eq!(store.read_count(), reads + 3);
        // The old center moved one slot west.
        assert_eq!(slot_color(&viewport, 0, 1), Some(Color332::RED));
        assert_eq!(viewport.state(), ViewportState::Scrolling);
    }

    #[test]
    fn test_position_does_not_recenter_while_panning() {
        let (store, center) = store_around(2);
        let mut viewport = controller(store, 32);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);
        viewport.scroll(0.0, 200.0);
        let south = center.neighbor(0, 1).unwrap();
        assert!(viewport.center().unwrap().same_tile(&south));

        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);
        assert!(viewport.center().unwrap().same_tile(&south));

        viewport.recenter();
        assert!(!viewport.is_panning());
        assert!(viewport.center().unwrap().same_tile(&center));
    }

    #[test]
    fn test_inertia_decays_to_idle() {
        let (store, _) = store_around(2);
        let mut viewport = controller(store, 32);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);
        viewport.scroll(4.0, 0.0);

        let mut ticks = 0;
        while viewport.tick() {
            ticks += 1;
            assert!(ticks < 100, "inertia never settled");
        }
        assert!(ticks > 0);
        assert_eq!(viewport.state(), ViewportState::Idle);
    }

    #[tokio::test]
    async fn test_deferred_decode_waits_for_preloader() {
        let (store, center) = store_around(1);
        let source = Arc::new(TileSource::new(
            Arc::clone(&store) as Arc<dyn crate::storage::TileStore>,
            TileDecoder::new(),
            Renderer::default(),
        ));
        let cache = Arc::new(TileCache::new(16));
        let preloader = Preloader::spawn(Arc::clone(&source), Arc::clone(&cache), 4);
        let mut viewport = ViewportController::new(
            source,
            Arc::clone(&cache),
            ViewportConfig {
                default_zoom: ZOOM,
                ..Default::default()
            },
        )
        .with_preloader(preloader);
        viewport.set_position(LAT, LON);

        // The worker has not run yet: every slot, the center included, is a
        // placeholder and nothing was read on this thread.
        assert!(viewport.generate(ZOOM));
        let placeholder = no_data_raster().get(128, 128);
        assert_eq!(slot_color(&viewport, 1, 1), placeholder);
        assert_eq!(slot_color(&viewport, 2, 1), placeholder);
        assert_eq!(store.read_count(), 0);

        viewport.take_preloader().unwrap().shutdown().await;
        assert!(viewport.generate(ZOOM));
        assert_eq!(slot_color(&viewport, 1, 1), Some(Color332::RED));
        assert_eq!(slot_color(&viewport, 2, 1), Some(Color332::GREEN));
        assert_eq!(store.read_count(), 9);
    }

    #[test]
    fn test_deferred_decode_without_preloader_renders_inline() {
        let (store, _) = store_around(1);
        let mut viewport = controller(Arc::clone(&store), 16);
        assert!(!viewport.config().foreground_decode);
        viewport.set_position(LAT, LON);

        viewport.generate(ZOOM);
        assert_eq!(slot_color(&viewport, 1, 1), Some(Color332::RED));
        assert_eq!(store.read_count(), 9);
    }

    #[test]
    fn test_waypoint_inside_bounds_is_placed() {
        let (store, center) = store_around(1);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);

        let (lat, lon) = crate::coord::tile_center(center.tile_x, center.tile_y, ZOOM);
        viewport.set_waypoint(Some((lat, lon)));
        let (x, y) = viewport.waypoint_pixel().unwrap();
        assert!((x - 384).abs() <= 1 && (y - 384).abs() <= 1);
        assert_eq!(
            viewport.canvas().get(x + WAYPOINT_RADIUS as i32, y),
            Some(Color332::BLACK)
        );

        viewport.set_waypoint(Some((LAT + 10.0, LON)));
        assert!(viewport.waypoint_pixel().is_none());
    }

    #[test]
    fn test_route_is_drawn_over_canvas() {
        let (store, center) = store_around(1);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);

        let west = crate::coord::tile_center(center.tile_x - 1, center.tile_y, ZOOM);
        let east = crate::coord::tile_center(center.tile_x + 1, center.tile_y, ZOOM);
        let track = Track::new(vec![
            TrackPoint::new(west.0, west.1),
            TrackPoint::new(east.0, east.1),
        ]);
        viewport.set_route(Some(Arc::new(track)));
        let route = viewport.config().route_color;
        assert_eq!(viewport.canvas().get(384, 384), Some(route));
        assert_eq!(viewport.canvas().get(384, 300), Some(Color332::RED));
    }

    #[test]
    fn test_overlay_changes_do_not_reload_tiles() {
        let (store, center) = store_around(1);
        let mut viewport = controller(Arc::clone(&store), 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);
        let reads = store.read_count();
        let (hits, misses) = {
            let stats = viewport.cache.stats();
            (stats.hits, stats.misses)
        };

        let (lat, lon) = crate::coord::tile_center(center.tile_x, center.tile_y, ZOOM);
        viewport.set_waypoint(Some((lat, lon)));
        let (x, y) = viewport.waypoint_pixel().unwrap();
        let rim = (x + WAYPOINT_RADIUS as i32, y);
        assert_eq!(viewport.canvas().get(rim.0, rim.1), Some(Color332::BLACK));

        let west = crate::coord::tile_center(center.tile_x - 1, center.tile_y, ZOOM);
        let track = Track::new(vec![
            TrackPoint::new(west.0, west.1),
            TrackPoint::new(lat, lon),
        ]);
        viewport.set_route(Some(Arc::new(track)));
        viewport.set_waypoint(None);
        viewport.set_route(None);

        assert_eq!(store.read_count(), reads);
        let stats = viewport.cache.stats();
        assert_eq!((stats.hits, stats.misses), (hits, misses));
        // Both overlays are gone and the tiles underneath are intact.
        assert_eq!(viewport.canvas().get(rim.0, rim.1), Some(Color332::RED));
        assert_eq!(viewport.canvas().get(300, 384), Some(Color332::RED));
        assert_eq!(viewport.canvas().get(200, 384), Some(Color332::GREEN));
    }

    #[test]
    fn test_north_up_display_centers_canvas() {
        let (store, _) = store_around(1);
        let config = ViewportConfig {
            default_zoom: ZOOM,
            mode: DisplayMode::NorthUp,
            ..Default::default()
        };
        let source = Arc::new(TileSource::new(store, TileDecoder::new(), Renderer::default()));
        let mut viewport =
            ViewportController::new(source, Arc::new(TileCache::new(16)), config);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);

        let mut screen = FrameBuffer::new(240, 320, Color332::BLACK);
        viewport.display(&mut screen, 45.0);
        assert_eq!(screen.raster().get(120, 160), Some(Color332::RED));
        assert_eq!(viewport.state(), ViewportState::Idle);
    }

    #[test]
    fn test_heading_up_display_rotates() {
        let (store, _) = store_around(1);
        let mut viewport = controller(store, 16);
        viewport.set_position(LAT, LON);
        viewport.generate(ZOOM);

        let mut screen = FrameBuffer::new(240, 320, Color332::BLACK);
        viewport.display(&mut screen, 90.0);
        assert_eq!(viewport.state(), ViewportState::Rotating);
        // The live position is inside the red center tile.
        assert_eq!(screen.raster().get(120, 160), Some(Color332::RED));
    }
}
