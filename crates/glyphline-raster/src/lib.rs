//! Glyphline Raster - rasterization seam and glyph bitmap cache.
//!
//! This crate holds the leaf pieces of the glyphline pipeline:
//!
//! - [`Rasterizer`] - the opaque backend that turns styled text into a bitmap
//! - [`GlyphStyle`] - every pixel-affecting attribute of a rasterization
//! - [`GlyphRasterCache`] - content-addressed store with at-most-one
//!   rasterization per fingerprint
//!
//! The cache is scheduler-agnostic: [`GlyphRasterCache::render`] returns a
//! plain future that any executor can drive.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glyphline_raster::{GlyphRasterCache, GlyphStyle, RasterRequest};
//!
//! let cache = GlyphRasterCache::global();
//! let request = RasterRequest::new("Hello", GlyphStyle::default());
//! let bitmap = pollster::block_on(cache.render(&backend, request))?;
//! ```

pub mod bitmap;
pub mod cache;
pub mod color;
pub mod error;
pub mod rasterizer;
pub mod style;

pub use bitmap::Bitmap;
pub use cache::{Fingerprint, GlyphRasterCache};
pub use color::Color;
pub use error::{RasterError, RasterResult};
pub use rasterizer::{RasterRequest, Rasterizer};
pub use style::{FontStyle, FontWeight, GlyphStyle, Shadow, Stroke};

// Re-export the math type used throughout the public API.
pub use glam::Vec2;
