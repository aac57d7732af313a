use std::path::Path;

use ttf_parser::{Face, GlyphId, OutlineBuilder};

use super::{FontMetrics, GlyphOutline, GlyphSource, OutlinePoint};
use crate::error::ResourceError;
use crate::math::Vec2;

/// Line segments per cubic curve (CFF outlines).
const CUBIC_STEPS: usize = 8;

/// A TrueType/OpenType font backed by `ttf-parser`.
///
/// The raw bytes are owned; the face is re-parsed per query, which is cheap
/// (table offsets only) and keeps the type `'static`.
#[derive(Debug, Clone)]
pub struct TtfFont {
    data: Vec<u8>,
    index: u32,
    metrics: FontMetrics,
}

impl TtfFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ResourceError> {
        Self::from_collection(data, 0)
    }

    /// Loads face `index` of a font collection.
    pub fn from_collection(data: Vec<u8>, index: u32) -> Result<Self, ResourceError> {
        let face = Face::parse(&data, index)?;
        let metrics = FontMetrics {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            line_gap: face.line_gap() as f32,
        };
        log::debug!(
            "parsed font face {} ({} glyphs, {} units/em)",
            index,
            face.number_of_glyphs(),
            metrics.units_per_em
        );
        Ok(Self {
            data,
            index,
            metrics,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(data)
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }
}

impl GlyphSource for TtfFont {
    fn glyph(&self, ch: char) -> Option<GlyphOutline> {
        let face = self.face()?;
        let id = face.glyph_index(ch)?;
        let advance = face.glyph_hor_advance(id).unwrap_or(0) as f32;

        let mut collector = OutlineCollector::default();
        // Glyphs without an outline (spaces) still have an advance.
        face.outline_glyph(id, &mut collector);

        Some(GlyphOutline {
            contours: collector.finish(),
            advance,
        })
    }

    fn kerning(&self, prev: char, next: char) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let (Some(left), Some(right)) = (face.glyph_index(prev), face.glyph_index(next)) else {
            return 0.0;
        };
        kern_pair(&face, left, right).unwrap_or(0.0)
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }
}

fn kern_pair(face: &Face<'_>, left: GlyphId, right: GlyphId) -> Option<f32> {
    let kern = face.tables().kern.as_ref()?;
    kern.subtables
        .into_iter()
        .filter(|st| st.horizontal && !st.variable)
        .find_map(|st| st.glyphs_kerning(left, right))
        .map(f32::from)
}

/// Collects `ttf-parser` outline callbacks into on/off-curve contours.
#[derive(Default)]
struct OutlineCollector {
    contours: Vec<Vec<OutlinePoint>>,
    current: Vec<OutlinePoint>,
}

impl OutlineCollector {
    fn last(&self) -> Vec2 {
        self.current
            .last()
            .map(|p| p.position)
            .unwrap_or(Vec2::ZERO)
    }

    fn flush(&mut self) {
        let mut contour = std::mem::take(&mut self.current);
        if contour.len() > 1 {
            let closes = matches!(
                (contour.first(), contour.last()),
                (Some(a), Some(b)) if a == b
            );
            if closes {
                contour.pop();
            }
        }
        if contour.len() >= 2 {
            self.contours.push(contour);
        }
    }

    fn finish(mut self) -> Vec<Vec<OutlinePoint>> {
        self.flush();
        self.contours
    }
}

impl OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.current.push(OutlinePoint::on(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current.push(OutlinePoint::on(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.current.push(OutlinePoint::off(x1, y1));
        self.current.push(OutlinePoint::on(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last();
        let (p1, p2, p3) = (Vec2::new(x1, y1), Vec2::new(x2, y2), Vec2::new(x, y));
        for step in 1..=CUBIC_STEPS {
            let t = step as f32 / CUBIC_STEPS as f32;
            let u = 1.0 - t;
            let p = p0 * (u * u * u)
                + p1 * (3.0 * u * u * t)
                + p2 * (3.0 * u * t * t)
                + p3 * (t * t * t);
            self.current.push(OutlinePoint::on(p.x, p.y));
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_font_error() {
        let err = TtfFont::from_bytes(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, ResourceError::Font(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TtfFont::from_file("/definitely/not/here.ttf").unwrap_err();
        assert!(matches!(err, ResourceError::Io { .. }));
    }

    #[test]
    fn collector_splits_contours_and_drops_closing_point() {
        let mut c = OutlineCollector::default();
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.quad_to(10.0, 10.0, 0.0, 10.0);
        c.line_to(0.0, 0.0);
        c.close();
        c.move_to(2.0, 2.0);
        c.curve_to(3.0, 2.0, 4.0, 3.0, 4.0, 4.0);
        c.close();
        let contours = c.finish();
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].len(), 4);
        assert!(!contours[0][2].on_curve);
        assert_eq!(contours[1].len(), 1 + CUBIC_STEPS);
    }
}
