//! Glyphline - rich-text layout over cached bitmap glyphs
//!
//! This crate provides a rich-text label for host environments without
//! native rich text:
//! - Markup normalization and per-token style resolution
//! - Sub/superscripts, fractions, fill-in blanks, manual shifts and breaks
//! - Line breaking and positioning in the host's y-up coordinate space
//! - Asynchronous rasterization through the shared glyph cache, joined
//!   before the block resizes, reflows and reattaches to the host
//! - Per-token or whole-block click handling
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use glyphline::{BlockOptions, RichTextBlock};
//!
//! let mut block = RichTextBlock::new(rasterizer, BlockOptions::default());
//! block.set_host(Box::new(scene_node));
//! pollster::block_on(block.set_string(
//!     "Solve [BOLD]x[/BOLD] in x[SUPERSCRIPT][2] = [FRACTION]1|2[/FRACTION]",
//! ))?;
//! pollster::block_on(block.fill_in_blank(0, "answer"))?;
//! ```

pub mod block;
pub mod completion;
pub mod decoration;
pub mod error;
pub mod fill_in;
pub mod fraction;
pub mod geometry;
pub mod host;
pub mod interact;
pub mod layout;
pub mod logging;
pub mod markup;
pub mod script;

pub use block::{
    BlockOptions, CompletionCallback, RenderFallback, RichTextBlock, SymbolHandler,
};
pub use completion::CompletionCoordinator;
pub use decoration::DecorationRect;
pub use error::{LabelError, LabelResult};
pub use fill_in::FillInSlots;
pub use fraction::{ComposedFraction, FractionChild, FractionParts};
pub use geometry::Rect;
pub use host::HostParent;
pub use interact::{ClickEvent, ClickHandler, InteractionLayer};
pub use layout::{
    GlyphContent, HorizontalAlign, LayoutConfig, LayoutResult, LineLayoutEngine, PlacedGlyph,
};
pub use markup::{CustomTag, MarkupSet, StyleFlags};

// Re-export the raster seam so hosts only depend on one crate.
pub use glyphline_raster::{
    Bitmap, Color, GlyphRasterCache, GlyphStyle, RasterError, RasterRequest, RasterResult,
    Rasterizer, Vec2,
};
