use glyphline_raster::RasterError;

/// Errors surfaced by the rich-text block.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelError {
    /// A glyph rasterization failed. Whether the block keeps its previous
    /// contents depends on the configured [`RenderFallback`].
    ///
    /// [`RenderFallback`]: crate::block::RenderFallback
    Raster(RasterError),

    /// `fill_in_blank`/`reset_blank` was called with an index outside the
    /// slot list derived from the current document.
    FillInOutOfRange { index: usize, count: usize },
}

impl std::fmt::Display for LabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelError::Raster(err) => write!(f, "Glyph rasterization failed: {}", err),
            LabelError::FillInOutOfRange { index, count } => write!(
                f,
                "Fill-in index {} out of range (document has {} blanks)",
                index, count
            ),
        }
    }
}

impl std::error::Error for LabelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LabelError::Raster(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RasterError> for LabelError {
    fn from(err: RasterError) -> Self {
        LabelError::Raster(err)
    }
}

/// Result type for label operations.
pub type LabelResult<T> = Result<T, LabelError>;
