//! Content-addressed glyph bitmap cache.
//!
//! Maps a styled-text fingerprint to its rasterized bitmap and guarantees
//! at most one rasterization per fingerprint: concurrent misses for the same
//! key share a single in-flight future instead of racing the backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::bitmap::Bitmap;
use crate::error::RasterResult;
use crate::rasterizer::{RasterRequest, Rasterizer};
use crate::style::GlyphStyle;

/// Key for cached glyph bitmaps.
///
/// A pure function of the request text and every pixel-affecting style
/// attribute; identical inputs always produce the same fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn compute(text: &str, style: &GlyphStyle) -> Self {
        Self(fxhash::hash64(&(text, style)))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

type SharedRaster = Shared<BoxFuture<'static, RasterResult<Bitmap>>>;

enum Slot {
    /// Rasterization completed; the bitmap is immutable from here on.
    Ready(Bitmap),
    /// Rasterization is in flight; later requests await the same future.
    Pending(SharedRaster),
}

/// Process-wide store of rasterized glyph bitmaps.
///
/// Entries are written once and never invalidated except by [`clear`].
/// Callers that need a refreshed glyph must vary the fingerprint (different
/// text or style).
///
/// [`clear`]: GlyphRasterCache::clear
pub struct GlyphRasterCache {
    slots: Mutex<HashMap<Fingerprint, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GlyphRasterCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::with_capacity(256)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The shared process-wide cache. Labels use this unless a private cache
    /// is injected at construction.
    pub fn global() -> &'static Arc<GlyphRasterCache> {
        static GLOBAL: OnceLock<Arc<GlyphRasterCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(GlyphRasterCache::new()))
    }

    /// Look up a completed bitmap without triggering rasterization.
    pub fn get(&self, fingerprint: Fingerprint) -> Option<Bitmap> {
        let slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(err) => {
                warn!("glyph cache lookup skipped: {err}");
                return None;
            }
        };
        match slots.get(&fingerprint) {
            Some(Slot::Ready(bitmap)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(bitmap.clone())
            }
            _ => None,
        }
    }

    /// Resolve a request to a bitmap, rasterizing on a cache miss.
    ///
    /// On a hit this resolves immediately with the stored bitmap. On a miss
    /// the backend is invoked exactly once per fingerprint; every concurrent
    /// caller awaits the same in-flight future. A failed rasterization
    /// leaves no entry behind, so a later request may retry.
    pub async fn render(
        &self,
        rasterizer: &dyn Rasterizer,
        request: RasterRequest,
    ) -> RasterResult<Bitmap> {
        let fingerprint = request.fingerprint();
        let pending = {
            let mut slots = self.slots.lock()?;
            match slots.get(&fingerprint) {
                Some(Slot::Ready(bitmap)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(bitmap.clone());
                }
                Some(Slot::Pending(shared)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    shared.clone()
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let shared = rasterizer.rasterize(request).shared();
                    slots.insert(fingerprint, Slot::Pending(shared.clone()));
                    shared
                }
            }
        };

        let result = pending.await;

        let mut slots = self.slots.lock()?;
        match &result {
            Ok(bitmap) => {
                slots.insert(fingerprint, Slot::Ready(bitmap.clone()));
            }
            Err(err) => {
                if matches!(slots.get(&fingerprint), Some(Slot::Pending(_))) {
                    slots.remove(&fingerprint);
                }
                debug!("rasterization failed for {:016x}: {err}", fingerprint.value());
            }
        }
        result
    }

    /// Drop every entry and reset the statistics.
    pub fn clear(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of cached entries (completed and in flight).
    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups served without invoking the backend.
    pub fn hit_rate(&self) -> f32 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f32 / total as f32
        }
    }

    /// Cache statistics as a formatted string.
    pub fn stats_string(&self) -> String {
        format!(
            "GlyphCache: {} entries, {:.1}% hit rate ({} hits, {} misses)",
            self.len(),
            self.hit_rate() * 100.0,
            self.hits(),
            self.misses()
        )
    }
}

impl Default for GlyphRasterCache {
    fn default() -> Self {
        Self::new()
    }
}
