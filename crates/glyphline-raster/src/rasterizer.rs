use futures_util::future::BoxFuture;

use crate::bitmap::Bitmap;
use crate::cache::Fingerprint;
use crate::error::RasterResult;
use crate::style::GlyphStyle;

/// One styled-text rasterization request.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRequest {
    pub text: String,
    pub style: GlyphStyle,
}

impl RasterRequest {
    pub fn new(text: impl Into<String>, style: GlyphStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Content-addressed key for this request.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(&self.text, &self.style)
    }
}

/// The opaque rasterization backend.
///
/// Implementations turn a styled piece of text into a bitmap however they
/// like (DOM capture, CPU font rendering, a GPU pass). The returned future
/// must be `'static` so an in-flight rasterization can be shared between
/// every caller waiting on the same fingerprint.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, request: RasterRequest) -> BoxFuture<'static, RasterResult<Bitmap>>;
}
