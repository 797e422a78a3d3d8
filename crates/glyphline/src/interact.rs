//! Pointer interaction over the arranged token set.
//!
//! The host engine delivers pointer events however it likes; the block
//! forwards the release point here in block-local coordinates. Hit testing
//! walks tokens in placement order and the first match wins; whole-block
//! mode invokes the handler once with the full token list.

use glam::Vec2;

use crate::geometry::Rect;
use crate::layout::PlacedGlyph;

/// What a click resolved to.
#[derive(Debug)]
pub enum ClickEvent<'a> {
    /// Whole-block click semantics: the full token list.
    Block(&'a [PlacedGlyph]),
    /// Per-token semantics: the first token whose bounding box contains the
    /// point, with its placement index.
    Glyph { glyph: &'a PlacedGlyph, index: usize },
}

pub type ClickHandler = Box<dyn FnMut(ClickEvent<'_>) + Send>;

/// Click configuration and state for one block.
pub struct InteractionLayer {
    handler: Option<ClickHandler>,
    enabled: bool,
    /// Whole-block click semantics instead of per-token hit testing.
    area_click: bool,
    was_clicked: bool,
}

impl InteractionLayer {
    pub fn new(area_click: bool) -> Self {
        Self {
            handler: None,
            enabled: true,
            area_click,
            was_clicked: false,
        }
    }

    pub fn set_click_handler(&mut self, handler: ClickHandler) {
        self.handler = Some(handler);
    }

    pub fn set_click_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn was_clicked(&self) -> bool {
        self.was_clicked
    }

    pub fn reset_clicked(&mut self) {
        self.was_clicked = false;
    }

    /// Hit-test a pointer release. Returns whether the event was consumed;
    /// a consumed event must not be re-dispatched by the host.
    pub fn pointer_up(&mut self, point: Vec2, frame: Rect, glyphs: &[PlacedGlyph]) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(handler) = self.handler.as_mut() else {
            return false;
        };

        if self.area_click {
            if frame.contains(point) {
                self.was_clicked = true;
                handler(ClickEvent::Block(glyphs));
                return true;
            }
            return false;
        }

        for (index, glyph) in glyphs.iter().enumerate() {
            if glyph.rect.contains(point) {
                handler(ClickEvent::Glyph { glyph, index });
                return true;
            }
        }
        false
    }
}
