//! Integration tests for the tile pipeline.
//!
//! These tests drive tile bytes through storage, decoding and rendering:
//! - indexed palette colors and derived borders
//! - layer ordering independent of file order
//! - seam suppression on tile borders
//! - decoding arbitrary bytes without panicking
//!
//! Run with: `cargo test --test tile_pipeline`

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use waymark::codec::{
    Color332, Layer, Palette, TileDecoder, TileWriter, LOGICAL_PER_PIXEL as PX,
};
use waymark::coord::TileAddress;
use waymark::render::{RenderConfig, Renderer};
use waymark::source::{TileError, TileSource};
use waymark::storage::{MemoryTileStore, TileStore};

// ============================================================================
// Helper Functions
// ============================================================================

/// Palette whose index 2 is pure red.
fn red_palette() -> Arc<Palette> {
    Arc::new(Palette::from_rgb(&[(0, 0, 0), (255, 255, 255), (255, 0, 0)]))
}

fn square(min: i64, max: i64) -> [(i64, i64); 4] {
    [
        (min * PX, min * PX),
        (max * PX, min * PX),
        (max * PX, max * PX),
        (min * PX, max * PX),
    ]
}

fn render(bytes: &[u8], decoder: &TileDecoder) -> waymark::render::Raster {
    let tile = decoder.decode(bytes).unwrap();
    Renderer::default().render(&tile)
}

const LAYER_COLORS: [(Layer, Color332); 5] = [
    (Layer::Terrain, Color332(0x1c)),
    (Layer::Water, Color332(0x03)),
    (Layer::Buildings, Color332(0x92)),
    (Layer::Outlines, Color332(0x00)),
    (Layer::Roads, Color332(0xe0)),
];

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_indexed_square_renders_filled_with_darker_border() {
    let bytes = TileWriter::new()
        .set_color_index(2)
        .stroke_polygon(&square(40, 200))
        .finish();

    let raster = render(&bytes, &TileDecoder::with_palette(red_palette()));

    assert_eq!(raster.get(120, 120), Some(Color332::RED));
    assert_eq!(raster.get(100, 40), Some(Color332::RED.border()));
    assert_eq!(raster.get(40, 100), Some(Color332::RED.border()));
    assert_eq!(raster.get(20, 20), Some(Color332::BACKGROUND));
    assert_ne!(Color332::RED.border(), Color332::RED);
}

#[test]
fn test_missing_palette_skips_indexed_color() {
    let bytes = TileWriter::new()
        .set_color_index(2)
        .set_color(Color332::GREEN)
        .rectangle(10 * PX, 10 * PX, 20 * PX, 20 * PX)
        .finish();

    let tile = TileDecoder::new().decode(&bytes).unwrap();

    assert_eq!(tile.skipped, 1);
    assert_eq!(tile.commands.len(), 1);
}

#[test]
fn test_layers_paint_in_order_regardless_of_file_order() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..10 {
        let mut order = LAYER_COLORS.to_vec();
        order.shuffle(&mut rng);

        let mut writer = TileWriter::new();
        for (layer, color) in &order {
            writer = writer
                .set_layer(*layer)
                .set_color(*color)
                .rectangle(64 * PX, 64 * PX, 128 * PX, 128 * PX);
        }
        let raster = render(&writer.finish(), &TileDecoder::new());

        assert_eq!(
            raster.get(128, 128),
            Some(Color332(0xe0)),
            "roads must be on top for order {order:?}"
        );
    }
}

#[test]
fn test_topmost_present_layer_wins() {
    // Without roads, outlines are on top.
    let bytes = TileWriter::new()
        .set_layer(Layer::Outlines)
        .set_color(Color332::BLACK)
        .rectangle(64 * PX, 64 * PX, 128 * PX, 128 * PX)
        .set_layer(Layer::Water)
        .set_color(Color332::BLUE)
        .rectangle(0, 0, 192 * PX, 192 * PX)
        .finish();

    let raster = render(&bytes, &TileDecoder::new());

    assert_eq!(raster.get(128, 128), Some(Color332::BLACK));
    assert_eq!(raster.get(32, 32), Some(Color332::BLUE));
}

#[test]
fn test_border_spanning_line_is_suppressed() {
    let bytes = TileWriter::new()
        .set_color(Color332::BLACK)
        .line(0, 0, 255 * PX, 0)
        .line(0, 255 * PX, 255 * PX, 255 * PX)
        .line(10 * PX, 10 * PX, 100 * PX, 100 * PX)
        .finish();

    let tile = TileDecoder::new().decode(&bytes).unwrap();
    assert_eq!(tile.suppressed, 2);
    assert_eq!(tile.commands.len(), 1);

    let raster = Renderer::default().render(&tile);
    for x in 0..256 {
        assert_eq!(raster.get(x, 0), Some(Color332::BACKGROUND));
        assert_eq!(raster.get(x, 255), Some(Color332::BACKGROUND));
    }
}

#[test]
fn test_edge_to_edge_lines_are_suppressed() {
    let bytes = TileWriter::new()
        .set_color(Color332::BLACK)
        .line(0, 128 * PX, 255 * PX, 128 * PX)
        .line(64 * PX, 0, 64 * PX, 255 * PX)
        .line(10 * PX, 10 * PX, 40 * PX, 50 * PX)
        .finish();

    let tile = TileDecoder::new().decode(&bytes).unwrap();
    assert_eq!(tile.suppressed, 2);
    assert_eq!(tile.commands.len(), 1);

    let raster = Renderer::default().render(&tile);
    for i in 0..256 {
        assert_eq!(raster.get(i, 128), Some(Color332::BACKGROUND));
        assert_eq!(raster.get(64, i), Some(Color332::BACKGROUND));
    }
}

#[test]
fn test_background_comes_from_render_config() {
    let bytes = TileWriter::new()
        .set_color(Color332::RED)
        .circle(128 * PX, 128 * PX, 10 * PX)
        .finish();
    let tile = TileDecoder::new().decode(&bytes).unwrap();

    let raster = Renderer::new(RenderConfig {
        background: Color332::WHITE,
        ..Default::default()
    })
    .render(&tile);

    assert_eq!(raster.get(0, 0), Some(Color332::WHITE));
    assert_eq!(raster.get(128, 128), Some(Color332::RED));
}

// ============================================================================
// Decoding robustness
// ============================================================================

#[test]
fn test_decode_is_idempotent() {
    let bytes = TileWriter::new()
        .set_layer(Layer::Water)
        .set_color(Color332::BLUE)
        .stroke_polygon(&square(10, 90))
        .set_layer(Layer::Roads)
        .highway(0, 50 * PX, 200 * PX, 60 * PX, 3)
        .dashed_line(5 * PX, 5 * PX, 120 * PX, 200 * PX, 4, 2)
        .finish();

    let decoder = TileDecoder::with_palette(red_palette());
    let first = decoder.decode(&bytes).unwrap();
    let second = decoder.decode(&bytes).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_random_bytes_never_panic() {
    let mut rng = StdRng::seed_from_u64(42);
    let decoder = TileDecoder::with_palette(red_palette());
    let renderer = Renderer::default();

    for _ in 0..500 {
        let len = rng.random_range(0..256);
        let mut bytes = vec![0u8; len];
        rng.fill(&mut bytes[..]);

        let first = decoder.decode(&bytes);
        if let Ok(tile) = &first {
            assert!(tile.commands.len() <= 256 * 64);
            let _ = renderer.render(tile);
        }
        assert_eq!(format!("{first:?}"), format!("{:?}", decoder.decode(&bytes)));
    }
}

#[test]
fn test_truncated_tile_keeps_complete_commands() {
    let bytes = TileWriter::new()
        .set_color(Color332::RED)
        .rectangle(0, 0, 50 * PX, 50 * PX)
        .rectangle(60 * PX, 60 * PX, 50 * PX, 50 * PX)
        .finish();
    let cut = &bytes[..bytes.len() - 2];

    let tile = TileDecoder::new().decode(cut).unwrap();

    assert!(tile.truncated);
    assert_eq!(tile.commands.len(), 1);
}

// ============================================================================
// Storage and source
// ============================================================================

#[test]
fn test_filesystem_source_renders_and_reports_missing_tiles() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let root = temp_dir.path();

    std::fs::write(
        root.join("palette.bin"),
        Palette::encode(&[(0, 0, 0), (255, 255, 255), (255, 0, 0)]),
    )
    .unwrap();

    let address = TileAddress::new(41.3874, 2.1686, 12).unwrap();
    let file = root.join(format!("{}.fmp", address.path));
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(
        &file,
        TileWriter::new()
            .set_color_index(2)
            .rectangle(0, 0, 256 * PX, 256 * PX)
            .finish(),
    )
    .unwrap();

    let source = TileSource::open(root, RenderConfig::default()).unwrap();
    let raster = source.render(&address.path).unwrap();
    assert_eq!(raster.get(128, 128), Some(Color332::RED));

    let missing = address.neighbor(1, 0).unwrap();
    let err = source.render(&missing.path).unwrap_err();
    assert!(err.is_absent());
}

#[test]
fn test_custom_extension() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("3/4")).unwrap();
    std::fs::write(
        root.join("3/4/5.tile"),
        TileWriter::new()
            .set_color(Color332::GREEN)
            .rectangle(0, 0, 256 * PX, 256 * PX)
            .finish(),
    )
    .unwrap();

    let source = TileSource::open_with_extension(root, "tile", RenderConfig::default()).unwrap();
    assert!(source.store().contains("3/4/5"));
    assert_eq!(
        source.render("3/4/5").unwrap().get(5, 5),
        Some(Color332::GREEN)
    );
}

#[test]
fn test_corrupt_palette_is_an_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("palette.bin"), [0xff, 0xff]).unwrap();

    let result = TileSource::open(temp_dir.path(), RenderConfig::default());
    assert!(matches!(result, Err(TileError::Palette { .. })));
}

#[test]
fn test_memory_store_counts_reads() {
    let store = Arc::new(MemoryTileStore::new());
    store.insert(
        "1/0/0",
        TileWriter::new()
            .set_color(Color332::RED)
            .rectangle(0, 0, 10 * PX, 10 * PX)
            .finish(),
    );
    let source = TileSource::new(store.clone(), TileDecoder::new(), Renderer::default());

    source.render("1/0/0").unwrap();
    source.render("1/0/0").unwrap();

    assert_eq!(store.read_count(), 2);
}
