//! Contours with cached winding, and polygon components with holes.

use crate::math::{Aabb2, Vec2};
use crate::triangulate::{self, Triangle2};

/// An ordered, implicitly closed vertex list with its orientation cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Vec2>,
    clockwise: bool,
}

impl Contour {
    pub fn new(points: Vec<Vec2>) -> Self {
        let clockwise = triangulate::is_clockwise(&points);
        Self { points, clockwise }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Orientation from the shoelace sum, refreshed on every mutation.
    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn set_points(&mut self, points: Vec<Vec2>) {
        self.points = points;
        self.refresh();
    }

    pub fn push(&mut self, point: Vec2) {
        self.points.push(point);
        self.refresh();
    }

    /// Replaces one vertex. Out-of-range indices are ignored.
    pub fn set_point(&mut self, index: usize, point: Vec2) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
            self.refresh();
        }
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
        self.refresh();
    }

    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_points(self.points.iter())
    }

    fn refresh(&mut self) {
        self.clockwise = triangulate::is_clockwise(&self.points);
    }
}

impl AsRef<[Vec2]> for Contour {
    fn as_ref(&self) -> &[Vec2] {
        &self.points
    }
}

impl From<Vec<Vec2>> for Contour {
    fn from(points: Vec<Vec2>) -> Self {
        Self::new(points)
    }
}

/// One outer contour plus the holes cut out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    outer: Contour,
    holes: Vec<Contour>,
}

impl Component {
    pub fn new(outer: impl Into<Contour>) -> Self {
        Self {
            outer: outer.into(),
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: impl Into<Contour>) -> Self {
        self.holes.push(hole.into());
        self
    }

    pub fn add_hole(&mut self, hole: impl Into<Contour>) {
        self.holes.push(hole.into());
    }

    pub fn outer(&self) -> &Contour {
        &self.outer
    }

    pub fn outer_mut(&mut self) -> &mut Contour {
        &mut self.outer
    }

    pub fn holes(&self) -> &[Contour] {
        &self.holes
    }

    pub fn holes_mut(&mut self) -> &mut [Contour] {
        &mut self.holes
    }

    pub fn bounds(&self) -> Aabb2 {
        self.outer.bounds()
    }

    /// Ear-clipped triangles, empty when the outline is degenerate.
    pub fn triangulate(&self) -> Vec<Triangle2> {
        triangulate::triangulate_oriented(self.outer.points(), self.outer.is_clockwise(), &self.holes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    #[test]
    fn winding_follows_mutation() {
        let mut c = Contour::new(square(0.0, 1.0));
        assert!(!c.is_clockwise());
        c.reverse();
        assert!(c.is_clockwise());
        c.set_points(square(0.0, 2.0));
        assert!(!c.is_clockwise());
        // Dragging one vertex across the opposite edge flips the orientation.
        let mut tri = Contour::new(vec![Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)]);
        assert!(!tri.is_clockwise());
        tri.set_point(2, Vec2::new(0.0, -4.0));
        assert!(tri.is_clockwise());
    }

    #[test]
    fn component_with_hole_area() {
        let c = Component::new(square(0.0, 10.0)).with_hole(square(3.0, 7.0));
        let area: f32 = c.triangulate().iter().map(triangulate::triangle_area).sum();
        assert_relative_eq!(area, 84.0, epsilon = 1e-3);
    }
}
