//! Waymark - vector map tiles and route following for handheld GPS devices
//!
//! This library provides the map engine behind the device screen: a compact
//! binary tile format and its decoder, a layered software renderer, an LRU
//! raster cache with background preloading, the pan/zoom/rotate viewport, and
//! the matcher that follows a pre-loaded route and selects the next turn.
//!
//! # Architecture
//!
//! ```text
//!  TileStore ──► TileSource ──► TileCache ◄── Preloader
//!                (codec +          │
//!                 render)          ▼
//!                          ViewportController ──► DisplaySurface
//!                                  ▲
//!  Track ──► detect_turns ──► Matcher (NavState) ──► NavEvent
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod coord;
pub mod logging;
pub mod nav;
pub mod render;
pub mod source;
pub mod storage;
pub mod viewport;
