use super::{GlyphSource, OutlinePoint};
use crate::math::{Aabb2, Vec2};

/// Line segments per quadratic curve.
const CURVE_STEPS: usize = 8;

fn push_quadratic(out: &mut Vec<Vec2>, from: Vec2, control: Vec2, to: Vec2) {
    for step in 1..=CURVE_STEPS {
        let t = step as f32 / CURVE_STEPS as f32;
        let a = from.lerp(control, t);
        let b = control.lerp(to, t);
        out.push(a.lerp(b, t));
    }
}

/// Flattens a TrueType contour into a closed polygon.
///
/// Two consecutive off-curve points imply an on-curve point at their
/// midpoint. A contour made only of off-curve points starts at the midpoint
/// of its last and first points.
pub fn flatten_contour(points: &[OutlinePoint]) -> Vec<Vec2> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let first_on = points.iter().position(|p| p.on_curve);
    let (start, order): (Vec2, Vec<usize>) = match first_on {
        Some(s) => (points[s].position, (1..=n).map(|i| (s + i) % n).collect()),
        None => (
            points[n - 1].position.lerp(points[0].position, 0.5),
            (0..n).collect(),
        ),
    };

    let mut out = vec![start];
    let mut pen = start;
    let mut control: Option<Vec2> = None;

    for i in order {
        let p = points[i];
        match (p.on_curve, control) {
            (true, Some(c)) => {
                push_quadratic(&mut out, pen, c, p.position);
                pen = p.position;
                control = None;
            }
            (true, None) => {
                out.push(p.position);
                pen = p.position;
            }
            (false, Some(c)) => {
                let mid = c.lerp(p.position, 0.5);
                push_quadratic(&mut out, pen, c, mid);
                pen = mid;
                control = Some(p.position);
            }
            (false, None) => control = Some(p.position),
        }
    }
    if let Some(c) = control {
        push_quadratic(&mut out, pen, c, start);
    }

    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// A string laid out in local pixel space (y down, origin at the top-left of
/// the first line).
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub contours: Vec<Vec<Vec2>>,
    /// Typographic box: line widths by line heights.
    pub bounds: Aabb2,
    pub line_count: usize,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::empty()
    }
}

impl TextLayout {
    pub fn build(text: &str, font: &dyn GlyphSource, size: f32) -> Self {
        let metrics = font.metrics();
        if metrics.units_per_em <= 0.0 || size <= 0.0 {
            return Self::empty();
        }
        let scale = size / metrics.units_per_em;
        let line_height = metrics.line_height() * scale;

        let mut contours = Vec::new();
        let mut widest = 0.0f32;
        let mut line_count = 0;

        for (line_index, line) in text.split('\n').enumerate() {
            line_count += 1;
            let baseline = metrics.ascender * scale + line_index as f32 * line_height;
            let mut pen_x = 0.0f32;
            let mut prev: Option<char> = None;

            for ch in line.chars() {
                if let Some(p) = prev {
                    pen_x += font.kerning(p, ch) * scale;
                }
                prev = Some(ch);

                let Some(glyph) = font.glyph(ch) else {
                    log::trace!("no glyph for {:?}", ch);
                    continue;
                };
                for contour in &glyph.contours {
                    let flat = flatten_contour(contour);
                    if flat.len() < 3 {
                        continue;
                    }
                    contours.push(
                        flat.into_iter()
                            .map(|p| Vec2::new(pen_x + p.x * scale, baseline - p.y * scale))
                            .collect(),
                    );
                }
                pen_x += glyph.advance * scale;
            }
            widest = widest.max(pen_x);
        }

        Self {
            contours,
            bounds: Aabb2::new(
                Vec2::ZERO,
                Vec2::new(widest, line_count as f32 * line_height),
            ),
            line_count,
        }
    }

    pub fn empty() -> Self {
        Self {
            contours: Vec::new(),
            bounds: Aabb2::EMPTY,
            line_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{block_font, FontMetrics, GlyphOutline, GlyphSet};
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn straight_contour_is_unchanged() {
        let pts = [
            OutlinePoint::on(0.0, 0.0),
            OutlinePoint::on(10.0, 0.0),
            OutlinePoint::on(10.0, 10.0),
        ];
        let flat = flatten_contour(&pts);
        assert_eq!(
            flat,
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]
        );
    }

    #[test]
    fn consecutive_off_points_imply_midpoint() {
        let pts = [
            OutlinePoint::on(0.0, 0.0),
            OutlinePoint::off(10.0, 0.0),
            OutlinePoint::off(10.0, 10.0),
            OutlinePoint::on(0.0, 10.0),
        ];
        let flat = flatten_contour(&pts);
        assert!(flat.contains(&Vec2::new(10.0, 5.0)));
        assert_eq!(flat.len(), 1 + 2 * CURVE_STEPS);
    }

    #[test]
    fn all_off_curve_contour_closes() {
        let pts = [
            OutlinePoint::off(0.0, 0.0),
            OutlinePoint::off(10.0, 0.0),
            OutlinePoint::off(10.0, 10.0),
            OutlinePoint::off(0.0, 10.0),
        ];
        let flat = flatten_contour(&pts);
        assert_eq!(flat[0], Vec2::new(0.0, 5.0));
        assert_eq!(flat.len(), 4 * CURVE_STEPS);
    }

    #[test]
    fn layout_advances_and_kerns() {
        let font = block_font("AB").with_kerning('A', 'B', -100.0);
        let layout = TextLayout::build("AB", &font, 10.0);
        // 2 glyphs x (outer + hole)
        assert_eq!(layout.contours.len(), 4);
        // 800 + 800 - 100 font units at 10 / 1000 px per unit
        assert_relative_eq!(layout.bounds.max.x, 15.0, epsilon = 1e-5);
        // Glyph tops sit below the layout origin (y flipped from font space).
        let top = layout.contours[0].iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        assert_relative_eq!(top, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn newline_starts_a_new_line() {
        let font = block_font("A");
        let layout = TextLayout::build("A\nA", &font, 10.0);
        assert_eq!(layout.line_count, 2);
        assert_relative_eq!(layout.bounds.max.y, 20.0, epsilon = 1e-5);
    }

    #[test]
    fn missing_glyphs_are_skipped() {
        let font = GlyphSet::new(FontMetrics::default()).with_glyph('x', GlyphOutline::blank(500.0));
        let layout = TextLayout::build("yx", &font, 20.0);
        assert!(layout.is_empty());
        assert_relative_eq!(layout.bounds.max.x, 10.0, epsilon = 1e-5);
    }
}
