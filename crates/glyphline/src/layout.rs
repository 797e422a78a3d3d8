//! The line-breaking and positioning state machine.
//!
//! Tokens arrive in document order with their rasterized sizes already
//! known and are placed on a cursor that starts at the top-left of the
//! container and walks down in the host's y-up coordinate space. Total
//! content height is only known once every line exists (the cursor may walk
//! below zero), so a final reflow pass resizes the container and shifts
//! every placed token by the height delta.

use glam::Vec2;
use glyphline_raster::{Bitmap, Color};
use tracing::trace;

use crate::fraction::ComposedFraction;
use crate::geometry::Rect;
use crate::markup::StyleFlags;

/// Distance between the container top and the first baseline row.
pub const TOP_INSET: f32 = 5.0;
/// Extra placed height for bold tokens under the legacy renderer.
const LEGACY_BOLD_PAD: f32 = 0.24;
/// Script tokens render at this fraction of the base font size.
pub const SCRIPT_SCALE: f32 = 0.6;

/// Horizontal alignment of committed lines inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Default)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// The rendered content of one placed token.
#[derive(Debug, Clone)]
pub enum GlyphContent {
    Bitmap(Bitmap),
    Fraction(ComposedFraction),
}

/// One rasterized, positioned unit of the block.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    /// Cleaned source text of the token.
    pub text: String,
    pub flags: StyleFlags,
    pub color: Color,
    pub content: GlyphContent,
    /// Placed bounding box, block-local.
    pub rect: Rect,
}

/// Layout parameters derived from the block options.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub container_width: f32,
    pub container_height: f32,
    pub font_size: f32,
    /// Line height multiple; line pitch is `font_size * line_height`.
    pub line_height: f32,
    /// Word spacing divisor; inter-word advance is `font_size / word_space`.
    pub word_space: f32,
    pub alignment: HorizontalAlign,
    /// Compensate a known bold-height discrepancy of the legacy renderer.
    pub legacy_renderer: bool,
}

impl LayoutConfig {
    /// Vertical distance between consecutive lines.
    pub fn line_offset(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Horizontal gap appended after every token.
    pub fn word_offset(&self) -> f32 {
        self.font_size / self.word_space
    }
}

/// Mutable cursor state threaded through one layout pass.
#[derive(Debug, Clone, Copy)]
struct LayoutCursor {
    x: f32,
    y: f32,
    /// Set when the previous token was manually shifted; the next glue
    /// placement must not re-anchor it.
    previous_was_shift: bool,
    /// Set when the current line holds a fraction; the next wrap reserves
    /// an extra line of vertical room.
    line_has_fraction: bool,
}

/// Result of one full layout pass.
#[derive(Debug)]
pub struct LayoutResult {
    pub glyphs: Vec<PlacedGlyph>,
    /// Committed lines as indices into `glyphs`.
    pub lines: Vec<Vec<usize>>,
    /// Final container size after reflow.
    pub content_size: Vec2,
    /// How much the container grew (or shrank); the block moves by the same
    /// amount to keep its anchor point fixed.
    pub height_delta: f32,
}

/// The line layout engine. Feed tokens in document order with [`place`],
/// then call [`finish`] for the alignment and reflow passes.
///
/// [`place`]: LineLayoutEngine::place
/// [`finish`]: LineLayoutEngine::finish
pub struct LineLayoutEngine {
    config: LayoutConfig,
    cursor: LayoutCursor,
    glyphs: Vec<PlacedGlyph>,
    current_line: Vec<usize>,
    lines: Vec<Vec<usize>>,
}

impl LineLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let cursor = LayoutCursor {
            x: 0.0,
            y: config.container_height - config.line_offset() - TOP_INSET,
            previous_was_shift: false,
            line_has_fraction: false,
        };
        Self {
            config,
            cursor,
            glyphs: Vec::new(),
            current_line: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Place the next token. `glyph.rect` must carry the token's width and
    /// height; its position is assigned here.
    pub fn place(&mut self, mut glyph: PlacedGlyph) {
        let width = glyph.rect.width;
        if self.cursor.x + width > self.config.container_width || glyph.flags.line_break {
            self.break_line();
        }

        let index = self.glyphs.len();
        let flags = glyph.flags.clone();
        if matches!(glyph.content, GlyphContent::Fraction(_)) {
            self.cursor.line_has_fraction = true;
        }

        if flags.concat {
            self.glyphs.push(glyph);
            self.glue(index, true);
        } else {
            if self.config.legacy_renderer && flags.bold {
                glyph.rect.height += self.config.font_size * LEGACY_BOLD_PAD;
            }
            glyph.rect.x = self.cursor.x;
            glyph.rect.y = self.cursor.y;
            self.glyphs.push(glyph);
        }

        // Sub/superscript tokens never get a fresh slot: they are offset
        // within their own height and glued to the preceding token.
        if flags.has_script() {
            let rect = &mut self.glyphs[index].rect;
            let offset = if flags.subscript {
                rect.height * 0.05
            } else {
                rect.height * 0.5
            };
            rect.y += offset;
            self.glue(index, false);
        }

        self.shift(index, &flags);

        self.current_line.push(index);
        self.cursor.x += width + self.config.word_offset();
        trace!(
            "placed {:?} at ({}, {})",
            self.glyphs[index].text,
            self.glyphs[index].rect.x,
            self.glyphs[index].rect.y
        );
    }

    /// Commit every remaining token, align lines, and run the deferred
    /// reflow.
    pub fn finish(mut self) -> LayoutResult {
        self.lines.push(std::mem::take(&mut self.current_line));
        if self.config.alignment != HorizontalAlign::Left {
            self.align_lines();
        }

        // The cursor walked top-down and may have gone below zero; only now
        // is the real content height known.
        let actual_height = self.config.container_height - self.cursor.y;
        let height_delta = actual_height - self.config.container_height;
        for glyph in &mut self.glyphs {
            glyph.rect.y += height_delta;
        }

        LayoutResult {
            glyphs: self.glyphs,
            lines: self.lines,
            content_size: Vec2::new(self.config.container_width, actual_height),
            height_delta,
        }
    }

    fn break_line(&mut self) {
        self.cursor.x = 0.0;
        self.cursor.y -= self.config.line_offset();
        if self.cursor.line_has_fraction {
            // Reserve vertical room for the fraction column.
            self.cursor.y -= self.config.line_offset();
            self.cursor.line_has_fraction = false;
        }
        self.lines.push(std::mem::take(&mut self.current_line));
    }

    /// Glue placement: the token abuts the previous token's trailing edge
    /// with no inter-word gap.
    fn glue(&mut self, index: usize, change_y: bool) {
        let previous = match self.current_line.last().copied() {
            Some(previous) => previous,
            None if index > 0 => index - 1,
            // A glue flag on the very first token has nothing to attach to.
            None => {
                self.glyphs[index].rect.x = self.cursor.x;
                self.glyphs[index].rect.y = self.cursor.y;
                return;
            }
        };

        let previous_rect = self.glyphs[previous].rect;
        if !self.cursor.previous_was_shift && self.cursor.y != previous_rect.y {
            // The previous token was placed before a wrap: re-anchor it to
            // the current cursor so the glued pair moves to the new line
            // together.
            self.glyphs[previous].rect.x = self.cursor.x;
            self.glyphs[previous].rect.y = self.cursor.y;
            self.current_line.push(previous);
            if let Some(last_line) = self.lines.last_mut() {
                last_line.pop();
            }
        } else if previous_rect.x > self.cursor.x {
            self.glyphs[previous].rect.x = self.cursor.x;
            self.glyphs[previous].rect.y = self.cursor.y;
            self.cursor.x += previous_rect.width;
        }

        self.cursor.x = self.glyphs[previous].rect.right();
        self.glyphs[index].rect.x = self.cursor.x;
        if change_y {
            self.glyphs[index].rect.y = self.cursor.y;
        }
    }

    /// Manual vertical shift by a third of the line pitch.
    fn shift(&mut self, index: usize, flags: &StyleFlags) {
        self.cursor.previous_was_shift = false;
        if flags.has_shift() {
            let direction = if flags.shift_up { 1.0 } else { -1.0 };
            self.glyphs[index].rect.y += (self.config.line_offset() / 3.0) * direction;
            self.cursor.previous_was_shift = true;
        }
    }

    /// Shift every line so its right edge honors the configured alignment.
    fn align_lines(&mut self) {
        let divisor = if self.config.alignment == HorizontalAlign::Center {
            2.0
        } else {
            1.0
        };
        for line in &self.lines {
            let Some(&last) = line.last() else { continue };
            let offset = (self.config.container_width - self.glyphs[last].rect.right()) / divisor;
            for &index in line {
                self.glyphs[index].rect.x += offset;
            }
        }
    }
}
