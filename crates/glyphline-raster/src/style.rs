use std::hash::{Hash, Hasher};

use glam::Vec2;

use crate::color::Color;

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Default)]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl FontWeight {
    /// CSS-style numeric weight.
    pub fn to_number(self) -> u16 {
        match self {
            FontWeight::Thin => 100,
            FontWeight::ExtraLight => 200,
            FontWeight::Light => 300,
            FontWeight::Normal => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::ExtraBold => 800,
            FontWeight::Black => 900,
        }
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// Text stroke attributes. A stroke only renders with a width greater than 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// Text shadow attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub offset: Vec2,
    pub blur: f32,
    pub color: Color,
}

/// Every attribute of a styled-text rasterization that affects pixels.
///
/// Two requests with equal text and equal `GlyphStyle` values must produce
/// identical bitmaps; the cache fingerprint is derived from exactly these
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphStyle {
    pub font_family: String,
    pub font_size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub color: Color,
    pub opacity: f32,
    pub stroke: Option<Stroke>,
    pub shadow: Option<Shadow>,
    pub background: Option<Color>,
    /// Fixed container box. `None` sizes the bitmap to its content.
    pub container: Option<Vec2>,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_owned(),
            font_size: 16.0,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            color: Color::BLACK,
            opacity: 1.0,
            stroke: None,
            shadow: None,
            background: None,
            container: None,
        }
    }
}

impl GlyphStyle {
    /// Derive the style for a glyph rendered at a scaled font size, keeping
    /// every other pixel-affecting attribute.
    pub fn scaled(&self, factor: f32) -> Self {
        let mut scaled = self.clone();
        scaled.font_size = self.font_size * factor;
        scaled
    }
}

// f32 fields are hashed by bit pattern so the fingerprint stays a pure
// function of the style value.
impl Hash for GlyphStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font_family.hash(state);
        self.font_size.to_bits().hash(state);
        self.weight.hash(state);
        self.style.hash(state);
        self.color.to_bits().hash(state);
        self.opacity.to_bits().hash(state);
        match &self.stroke {
            Some(stroke) => {
                1u8.hash(state);
                stroke.color.to_bits().hash(state);
                stroke.width.to_bits().hash(state);
            }
            None => 0u8.hash(state),
        }
        match &self.shadow {
            Some(shadow) => {
                1u8.hash(state);
                shadow.offset.x.to_bits().hash(state);
                shadow.offset.y.to_bits().hash(state);
                shadow.blur.to_bits().hash(state);
                shadow.color.to_bits().hash(state);
            }
            None => 0u8.hash(state),
        }
        match &self.background {
            Some(background) => {
                1u8.hash(state);
                background.to_bits().hash(state);
            }
            None => 0u8.hash(state),
        }
        match &self.container {
            Some(container) => {
                1u8.hash(state);
                container.x.to_bits().hash(state);
                container.y.to_bits().hash(state);
            }
            None => 0u8.hash(state),
        }
    }
}
