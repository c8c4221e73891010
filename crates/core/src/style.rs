//! Replacement planning: turn a [`Hit`] into an erase region, an insertion
//! point and a drawing style.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::hits::Hit;

/// Font used when the hit carries no font name.
pub const DEFAULT_FONT_NAME: &str = "Times-Roman";

/// Font size used when the hit carries no size.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Vertical growth of the erase region on each edge, as a fraction of the
/// font size.
const ERASE_EXPAND_RATIO: f32 = 0.5;

/// Distance of the baseline above the bottom of the hit bbox, as a fraction
/// of the font size.
const BASELINE_RATIO: f32 = 0.2;

/// An RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Unpack a `0xRRGGBB` integer.
    pub fn from_packed(color: u32) -> Self {
        Rgb {
            r: ((color >> 16) & 0xFF) as f32 / 255.0,
            g: ((color >> 8) & 0xFF) as f32 / 255.0,
            b: (color & 0xFF) as f32 / 255.0,
        }
    }

    /// Pack into a `0xRRGGBB` integer, clamping each channel.
    pub fn to_packed(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

/// Font, size and color for the replacement text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementStyle {
    pub font_name: String,
    pub font_size: f32,
    pub color: Rgb,
}

impl ReplacementStyle {
    /// Derive the style from a hit, falling back to Times-Roman 12pt black.
    pub fn from_hit(hit: &Hit) -> Self {
        ReplacementStyle {
            font_name: hit
                .font
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_FONT_NAME.to_string()),
            font_size: hit
                .size
                .filter(|size| *size > 0.0)
                .unwrap_or(DEFAULT_FONT_SIZE),
            color: hit.color.map(Rgb::from_packed).unwrap_or(Rgb::BLACK),
        }
    }
}

/// Everything the replacement engine needs to mutate the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementPlan {
    /// Region to redact, covering ascenders and descenders of the hit.
    pub erase: Rect,
    /// Baseline origin of the replacement text.
    pub insertion: Point,
    pub style: ReplacementStyle,
}

/// Compute the erase region, insertion point and style for a hit.
pub fn plan_replacement(hit: &Hit) -> ReplacementPlan {
    let style = ReplacementStyle::from_hit(hit);
    let erase = hit.bbox.expand_y(ERASE_EXPAND_RATIO * style.font_size);
    let insertion = Point::new(hit.bbox.x0, hit.bbox.y1 - style.font_size * BASELINE_RATIO);

    ReplacementPlan {
        erase,
        insertion,
        style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn make_hit(font: Option<&str>, size: Option<f32>, color: Option<u32>) -> Hit {
        Hit {
            page: 1,
            span_text: "Hello World".to_string(),
            found_text: "World".to_string(),
            bbox: Rect::new(54.5, 0.0, 100.0, 10.0),
            font: font.map(str::to_string),
            size,
            color,
        }
    }

    #[test]
    fn test_unpack_orange() {
        let c = Rgb::from_packed(0xFF8000);
        assert!((c.r - 1.0).abs() < EPS);
        assert!((c.g - 0.502).abs() < EPS);
        assert!((c.b - 0.0).abs() < EPS);
    }

    #[test]
    fn test_pack_roundtrips_byte_channels() {
        assert_eq!(Rgb::from_packed(0x123456).to_packed(), 0x123456);
        assert_eq!(Rgb::WHITE.to_packed(), 0xFFFFFF);
    }

    #[test]
    fn test_style_defaults() {
        let style = ReplacementStyle::from_hit(&make_hit(None, None, None));
        assert_eq!(style.font_name, "Times-Roman");
        assert_eq!(style.font_size, 12.0);
        assert_eq!(style.color, Rgb::BLACK);
    }

    #[test]
    fn test_style_from_hit_values() {
        let style = ReplacementStyle::from_hit(&make_hit(
            Some("Helvetica-Bold"),
            Some(9.5),
            Some(0x0000FF),
        ));
        assert_eq!(style.font_name, "Helvetica-Bold");
        assert_eq!(style.font_size, 9.5);
        assert_eq!(style.color, Rgb::from_packed(0x0000FF));
    }

    #[test]
    fn test_plan_erase_region_expands_by_half_size() {
        let plan = plan_replacement(&make_hit(None, Some(10.0), None));
        assert_eq!(plan.erase, Rect::new(54.5, -5.0, 100.0, 15.0));
    }

    #[test]
    fn test_plan_insertion_point_near_bbox_bottom() {
        let plan = plan_replacement(&make_hit(None, Some(10.0), None));
        assert!((plan.insertion.x - 54.5).abs() < EPS);
        assert!((plan.insertion.y - 8.0).abs() < EPS);
    }

    #[test]
    fn test_plan_uses_default_size_for_geometry() {
        let plan = plan_replacement(&make_hit(None, None, None));
        assert_eq!(plan.erase.y0, -6.0);
        assert_eq!(plan.erase.y1, 16.0);
        assert!((plan.insertion.y - (10.0 - 2.4)).abs() < EPS);
    }
}
