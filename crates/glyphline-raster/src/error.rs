/// Errors that can occur while rasterizing or caching glyph bitmaps.
///
/// The error is `Clone` because an in-flight rasterization may be awaited by
/// several callers at once; each of them receives the same failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterError {
    /// The rasterization backend failed.
    Backend(String),

    /// A backend returned a pixel buffer that does not match its dimensions.
    InvalidBitmap { expected: usize, actual: usize },

    /// Lock was poisoned (Mutex).
    LockPoisoned(String),
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::Backend(msg) => write!(f, "Rasterization failed: {}", msg),
            RasterError::InvalidBitmap { expected, actual } => write!(
                f,
                "Invalid bitmap buffer: expected {} bytes but got {}",
                expected, actual
            ),
            RasterError::LockPoisoned(msg) => {
                write!(
                    f,
                    "Lock was poisoned (likely due to panic in another thread): {}",
                    msg
                )
            }
        }
    }
}

impl std::error::Error for RasterError {}

impl<T> From<std::sync::PoisonError<T>> for RasterError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        RasterError::LockPoisoned(err.to_string())
    }
}

/// Result type for rasterization operations.
pub type RasterResult<T> = Result<T, RasterError>;
