use std::sync::Arc;

use glam::Vec2;

use crate::error::{RasterError, RasterResult};

/// An immutable RGBA8 bitmap produced by a [`Rasterizer`](crate::Rasterizer).
///
/// The pixel buffer is reference counted, so cloning a bitmap (for example
/// when the cache hands the same glyph to several labels) is cheap.
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Wrap a pixel buffer. `data` must hold exactly `width * height` RGBA
    /// pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RasterResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RasterError::InvalidBitmap {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: data.into(),
            width,
            height,
        })
    }

    /// A fully transparent bitmap of the given dimensions.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 4].into(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bitmap dimensions as layout units.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
