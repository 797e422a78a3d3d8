//! The scene-host seam.
//!
//! The block does not inherit from any host engine type: it owns its placed
//! glyphs and hands them to whatever scene-graph node the host environment
//! provides through this trait. Implementations translate the calls into
//! the host's own primitives (add child, set bitmap, set position/size).

use glam::Vec2;

use crate::decoration::DecorationRect;
use crate::layout::PlacedGlyph;

/// The parent node a block attaches its composed contents to.
///
/// Calls arrive in a fixed order per render pass: `begin_frame`, then
/// `set_block_frame`, then one `attach_glyph` per token in placement order,
/// then one `attach_rect` per decoration. Positions are block-local in the
/// host's y-up coordinate space.
pub trait HostParent: Send {
    /// Drop everything attached by the previous render pass.
    fn begin_frame(&mut self);

    /// Position and size the block's own node. `origin` is the block
    /// position in parent coordinates, adjusted so the configured anchor
    /// point stays fixed across reflows.
    fn set_block_frame(&mut self, origin: Vec2, size: Vec2, anchor: Vec2);

    /// Attach one placed glyph. `index` is the token's position in document
    /// order; `z_order` is the configured stacking order for the block's
    /// children.
    fn attach_glyph(&mut self, index: usize, glyph: &PlacedGlyph, z_order: i32);

    /// Attach one decoration rect (underlines, fraction bars are part of
    /// their glyph).
    fn attach_rect(&mut self, rect: &DecorationRect);
}
