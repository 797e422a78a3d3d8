//! The asynchronous completion join.
//!
//! One render pass issues a rasterization future per glyph in document
//! order. Completions may resolve in any order; the coordinator joins all
//! of them before the block is resized, reflowed, reparented and the
//! completion callback fires. With zero pending glyphs the join succeeds
//! immediately.

use futures_util::future::{join_all, BoxFuture};
use glyphline_raster::{Bitmap, RasterResult};

/// Collects the in-flight rasterizations of one render pass.
pub struct CompletionCoordinator<'a> {
    pending: Vec<BoxFuture<'a, RasterResult<Bitmap>>>,
}

impl<'a> CompletionCoordinator<'a> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, future: BoxFuture<'a, RasterResult<Bitmap>>) {
        self.pending.push(future);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for every pending rasterization.
    ///
    /// All futures are driven to completion even when one fails, so a
    /// failure never abandons bitmaps that the cache still finishes and
    /// stores. Bitmaps come back in push (document) order.
    pub async fn join(self) -> RasterResult<Vec<Bitmap>> {
        join_all(self.pending).await.into_iter().collect()
    }
}

impl Default for CompletionCoordinator<'_> {
    fn default() -> Self {
        Self::new()
    }
}
