//! Glyph outlines and the providers that supply them.
//!
//! Outlines use TrueType conventions: font units, y pointing up, contours of
//! on-curve and off-curve (quadratic control) points. [`layout`] turns a
//! string into flattened, pixel-space contours ready for the glyph filler.

mod layout;
mod ttf;

use std::collections::HashMap;

pub use layout::{flatten_contour, TextLayout};
pub use ttf::TtfFont;

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlinePoint {
    pub position: Vec2,
    pub on_curve: bool,
}

impl OutlinePoint {
    pub const fn on(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            on_curve: true,
        }
    }

    pub const fn off(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            on_curve: false,
        }
    }
}

/// Outline of a single glyph in font units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphOutline {
    pub contours: Vec<Vec<OutlinePoint>>,
    pub advance: f32,
}

impl GlyphOutline {
    /// An outline made of straight edges only.
    pub fn from_polygons(polygons: &[&[Vec2]], advance: f32) -> Self {
        Self {
            contours: polygons
                .iter()
                .map(|poly| poly.iter().map(|p| OutlinePoint::on(p.x, p.y)).collect())
                .collect(),
            advance,
        }
    }

    /// An outline with no contours, e.g. a space.
    pub fn blank(advance: f32) -> Self {
        Self {
            contours: Vec::new(),
            advance,
        }
    }
}

/// Vertical font metrics in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
    pub line_gap: f32,
}

impl FontMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascender - self.descender + self.line_gap
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            units_per_em: 1000.0,
            ascender: 800.0,
            descender: -200.0,
            line_gap: 0.0,
        }
    }
}

/// Supplies glyph outlines and spacing for text primitives.
pub trait GlyphSource: Send + Sync {
    fn glyph(&self, ch: char) -> Option<GlyphOutline>;

    /// Horizontal adjustment between `prev` and `next`, in font units.
    fn kerning(&self, _prev: char, _next: char) -> f32 {
        0.0
    }

    fn metrics(&self) -> FontMetrics;
}

/// An in-memory glyph table, for procedural fonts and tests.
#[derive(Debug, Clone, Default)]
pub struct GlyphSet {
    glyphs: HashMap<char, GlyphOutline>,
    kerning: HashMap<(char, char), f32>,
    metrics: FontMetrics,
}

impl GlyphSet {
    pub fn new(metrics: FontMetrics) -> Self {
        Self {
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
            metrics,
        }
    }

    pub fn with_glyph(mut self, ch: char, outline: GlyphOutline) -> Self {
        self.glyphs.insert(ch, outline);
        self
    }

    pub fn with_kerning(mut self, prev: char, next: char, adjust: f32) -> Self {
        self.kerning.insert((prev, next), adjust);
        self
    }

    pub fn insert(&mut self, ch: char, outline: GlyphOutline) {
        self.glyphs.insert(ch, outline);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl GlyphSource for GlyphSet {
    fn glyph(&self, ch: char) -> Option<GlyphOutline> {
        self.glyphs.get(&ch).cloned()
    }

    fn kerning(&self, prev: char, next: char) -> f32 {
        self.kerning.get(&(prev, next)).copied().unwrap_or(0.0)
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }
}

/// A tiny block font: every glyph in `chars` is a filled box with a square
/// hole, one em wide. Handy for smoke renders and tests.
pub fn block_font(chars: &str) -> GlyphSet {
    let metrics = FontMetrics::default();
    let outer = [
        Vec2::new(100.0, 0.0),
        Vec2::new(700.0, 0.0),
        Vec2::new(700.0, 700.0),
        Vec2::new(100.0, 700.0),
    ];
    let hole = [
        Vec2::new(300.0, 200.0),
        Vec2::new(300.0, 500.0),
        Vec2::new(500.0, 500.0),
        Vec2::new(500.0, 200.0),
    ];
    chars.chars().fold(GlyphSet::new(metrics), |set, ch| {
        let outline = if ch.is_whitespace() {
            GlyphOutline::blank(800.0)
        } else {
            GlyphOutline::from_polygons(&[&outer, &hole], 800.0)
        };
        set.with_glyph(ch, outline)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_set_lookup_and_kerning() {
        let set = block_font("AB ").with_kerning('A', 'B', -50.0);
        assert_eq!(set.len(), 3);
        assert!(set.glyph('A').is_some());
        assert!(set.glyph('Z').is_none());
        assert_eq!(set.glyph(' ').map(|g| g.contours.len()), Some(0));
        assert_eq!(set.kerning('A', 'B'), -50.0);
        assert_eq!(set.kerning('B', 'A'), 0.0);
        assert_eq!(set.metrics().line_height(), 1000.0);
    }
}
