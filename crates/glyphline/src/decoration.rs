//! Post-layout decoration rects.
//!
//! Decorations are drawn after the reflow pass so their positions track the
//! final token bounding boxes.

use glyphline_raster::Color;

use crate::geometry::Rect;
use crate::layout::PlacedGlyph;

/// A solid rectangle attached to the host alongside the glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorationRect {
    pub rect: Rect,
    pub color: Color,
}

/// Build an underline rect for every underline-flagged token.
///
/// The legacy renderer draws its glyphs a few pixels lower, so the
/// underline offset collapses to zero there.
pub fn underline_decorations(
    glyphs: &[PlacedGlyph],
    font_size: f32,
    legacy_renderer: bool,
) -> Vec<DecorationRect> {
    let y_offset = if legacy_renderer { 0.0 } else { 3.0 };
    glyphs
        .iter()
        .filter(|glyph| glyph.flags.underline)
        .map(|glyph| DecorationRect {
            rect: Rect::new(
                glyph.rect.x - 2.0,
                glyph.rect.y + y_offset,
                glyph.rect.width + 3.0,
                font_size * 0.05,
            ),
            color: glyph.color,
        })
        .collect()
}
