//! Test utilities for glyphline.
//!
//! The main component is [`StubRasterizer`], a deterministic monospace
//! backend for testing the pipeline without a real font stack.
//!
//! # Design
//!
//! ## Interior Mutability
//!
//! The stub records calls through atomics, allowing the `&self` trait
//! method to count invocations.
//!
//! ## Deterministic Metrics
//!
//! Every glyph is `char_count * font_size * 0.6` wide (rounded) and
//! `font_size * 1.2` tall, so layout assertions can compute expected
//! positions by hand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use glyphline_raster::{Bitmap, RasterError, RasterRequest, Rasterizer, RasterResult};

/// Advance per character as a fraction of the font size.
pub const STUB_ADVANCE: f32 = 0.6;
/// Bitmap height as a fraction of the font size.
pub const STUB_HEIGHT: f32 = 1.2;

/// A deterministic monospace rasterization backend.
///
/// Resolves immediately with a blank bitmap sized from the request, counts
/// every invocation, and can be told to fail requests whose text contains a
/// given pattern.
#[derive(Default)]
pub struct StubRasterizer {
    calls: AtomicUsize,
    fail_pattern: Mutex<Option<String>>,
}

impl StubRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request whose text contains `pattern`.
    pub fn fail_matching(&self, pattern: impl Into<String>) {
        if let Ok(mut fail) = self.fail_pattern.lock() {
            *fail = Some(pattern.into());
        }
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        if let Ok(mut fail) = self.fail_pattern.lock() {
            *fail = None;
        }
    }

    /// Number of rasterization calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Expected bitmap width for `text` at `font_size`.
    pub fn width_of(text: &str, font_size: f32) -> f32 {
        (text.chars().count() as f32 * font_size * STUB_ADVANCE).round()
    }

    /// Expected bitmap height at `font_size`.
    pub fn height_of(font_size: f32) -> f32 {
        (font_size * STUB_HEIGHT).round()
    }
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, request: RasterRequest) -> BoxFuture<'static, RasterResult<Bitmap>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .fail_pattern
            .lock()
            .ok()
            .and_then(|pattern| pattern.clone())
            .is_some_and(|pattern| request.text.contains(&pattern));
        let width = Self::width_of(&request.text, request.style.font_size).max(1.0) as u32;
        let height = Self::height_of(request.style.font_size).max(1.0) as u32;
        async move {
            if fail {
                Err(RasterError::Backend(format!(
                    "injected failure for {:?}",
                    request.text
                )))
            } else {
                Ok(Bitmap::blank(width, height))
            }
        }
        .boxed()
    }
}
