//! Fraction composition.
//!
//! A `[FRACTION]` token carries a `whole|numerator|denominator` or
//! `numerator|denominator` body (`_` escapes a space). The parts are
//! rasterized separately and composed into one glyph block: numerator over
//! a horizontal bar, denominator under it, optional whole number to the
//! left. The layout engine treats the composite as a single atomic token.

use glam::Vec2;
use glyphline_raster::Bitmap;

use crate::geometry::Rect;
use crate::script::format_script;

/// Horizontal gap between the whole number and the fraction column.
const WHOLE_GAP: f32 = 5.0;
/// Scale applied to numerator/denominator when a whole number is present.
pub const MIXED_PART_SCALE: f32 = 0.85;
/// Vertical pad added to the composite height.
const HEIGHT_PAD: f32 = 4.0;

/// The textual parts of a fraction body, script markers already expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct FractionParts {
    pub whole: Option<String>,
    pub numerator: String,
    pub denominator: String,
}

impl FractionParts {
    /// Split a fraction body on `|`. Returns `None` for bodies without at
    /// least a numerator and a denominator; such tokens render as plain
    /// text.
    pub fn parse(body: &str) -> Option<Self> {
        let unescaped = body.replace('_', " ");
        let parts: Vec<String> = unescaped.split('|').map(format_script).collect();
        match parts.len() {
            2 => {
                let mut parts = parts.into_iter();
                Some(Self {
                    whole: None,
                    numerator: parts.next().unwrap_or_default(),
                    denominator: parts.next().unwrap_or_default(),
                })
            }
            3 => {
                let mut parts = parts.into_iter();
                Some(Self {
                    whole: parts.next(),
                    numerator: parts.next().unwrap_or_default(),
                    denominator: parts.next().unwrap_or_default(),
                })
            }
            _ => None,
        }
    }
}

/// One rasterized child of a composed fraction, positioned relative to the
/// composite origin (bottom-left, y-up).
#[derive(Debug, Clone)]
pub struct FractionChild {
    pub bitmap: Bitmap,
    pub offset: Vec2,
}

/// A fraction laid out as a single glyph block.
#[derive(Debug, Clone)]
pub struct ComposedFraction {
    /// Whole number (if any), numerator, denominator, in that order.
    pub children: Vec<FractionChild>,
    /// The fraction bar, relative to the composite origin.
    pub bar: Rect,
    pub size: Vec2,
}

/// Lay out a whole/numerator/denominator triple as one composite block.
///
/// The bar spans `max(numerator width, denominator width)` with the
/// narrower part centered against the wider; bar thickness is
/// `font_size / 20`. Without a whole number the leading gap is trimmed so
/// the fraction sits flush left.
pub fn compose(
    whole: Option<&Bitmap>,
    numerator: &Bitmap,
    denominator: &Bitmap,
    font_size: f32,
) -> ComposedFraction {
    let (whole_width, whole_height) = whole
        .map(|bitmap| (bitmap.size().x, bitmap.size().y))
        .unwrap_or((0.0, 0.0));
    let num_size = numerator.size();
    let den_size = denominator.size();

    let mut num_pos = Vec2::new(whole_width + WHOLE_GAP, whole_height / 2.0);
    let mut den_pos = Vec2::new(num_pos.x, num_pos.y - num_size.y * 0.65 - 8.0);

    // Center the narrower of the two against the wider; the bar spans the
    // wider width.
    let bar_width = num_size.x.max(den_size.x);
    let bar_x = num_pos.x;
    if den_size.x > num_size.x {
        num_pos.x += (den_size.x - num_size.x) / 2.0;
    } else if num_size.x > den_size.x {
        den_pos.x += (num_size.x - den_size.x) / 2.0;
    }

    let mut bar = Rect::new(
        bar_x,
        num_pos.y + num_size.y * 0.35 - 6.0,
        bar_width,
        font_size / 20.0,
    );

    let leading_trim = if whole.is_some() { 0.0 } else { WHOLE_GAP + 0.5 };
    let width = bar_x + bar_width - leading_trim;
    let height = num_size.y * 0.65 + den_size.y * 0.65 + HEIGHT_PAD;

    let mut children = Vec::with_capacity(3);
    if let Some(whole) = whole {
        children.push(FractionChild {
            bitmap: whole.clone(),
            offset: Vec2::ZERO,
        });
    }
    children.push(FractionChild {
        bitmap: numerator.clone(),
        offset: num_pos,
    });
    children.push(FractionChild {
        bitmap: denominator.clone(),
        offset: den_pos,
    });

    // Flush-left when there is no whole number.
    if whole.is_none() {
        for child in &mut children {
            child.offset.x -= bar_x;
        }
        bar.x -= bar_x;
    }

    // Normalize vertically so the numerator tops out at the composite
    // height.
    let delta_y = height - (num_pos.y + num_size.y);
    for child in &mut children {
        child.offset.y += delta_y;
    }
    bar.y += delta_y;

    ComposedFraction {
        children,
        bar,
        size: Vec2::new(width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_parts() {
        let parts = FractionParts::parse("1|2").unwrap();
        assert_eq!(parts.whole, None);
        assert_eq!(parts.numerator, "1");
        assert_eq!(parts.denominator, "2");
    }

    #[test]
    fn parse_three_parts() {
        let parts = FractionParts::parse("3|1|2").unwrap();
        assert_eq!(parts.whole.as_deref(), Some("3"));
        assert_eq!(parts.numerator, "1");
        assert_eq!(parts.denominator, "2");
    }

    #[test]
    fn parse_unescapes_spaces_and_scripts() {
        let parts = FractionParts::parse("x[SUPERSCRIPT][2]|2_z").unwrap();
        assert_eq!(parts.numerator, "x²");
        assert_eq!(parts.denominator, "2 z");
    }

    #[test]
    fn parse_rejects_plain_body() {
        assert_eq!(FractionParts::parse("12"), None);
    }

    #[test]
    fn bar_spans_wider_part() {
        let num = Bitmap::blank(10, 12);
        let den = Bitmap::blank(30, 12);
        let composed = compose(None, &num, &den, 16.0);
        assert_eq!(composed.bar.width, 30.0);
        // Numerator centered against the denominator.
        let num_child = &composed.children[0];
        let den_child = &composed.children[1];
        assert!((num_child.offset.x - (den_child.offset.x + 10.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn no_whole_sits_flush_left() {
        let num = Bitmap::blank(10, 12);
        let den = Bitmap::blank(10, 12);
        let composed = compose(None, &num, &den, 16.0);
        assert_eq!(composed.children[0].offset.x, 0.0);
        assert_eq!(composed.bar.x, 0.0);
    }

    #[test]
    fn whole_leads_the_column() {
        let whole = Bitmap::blank(8, 12);
        let num = Bitmap::blank(10, 12);
        let den = Bitmap::blank(10, 12);
        let composed = compose(Some(&whole), &num, &den, 16.0);
        assert_eq!(composed.children[0].offset.x, 0.0);
        assert_eq!(composed.children[1].offset.x, 8.0 + 5.0);
        // Vertical normalization moves every child by the same delta, so
        // the numerator stays half the whole height above the whole.
        let rise = composed.children[1].offset.y - composed.children[0].offset.y;
        assert!((rise - 6.0).abs() < f32::EPSILON * 16.0);
        assert!(composed.size.x > composed.children[1].offset.x);
    }

    #[test]
    fn composite_height_combines_parts() {
        let num = Bitmap::blank(10, 20);
        let den = Bitmap::blank(10, 10);
        let composed = compose(None, &num, &den, 16.0);
        assert_eq!(composed.size.y, 20.0 * 0.65 + 10.0 * 0.65 + 4.0);
    }
}
