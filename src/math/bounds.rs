//! Axis-aligned and oriented bounding boxes.

use super::mat3::Mat3;
use super::vec2::Vec2;
use super::vec3::Vec3;

/// Axis-aligned 2D box. An empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2 {
    pub const EMPTY: Aabb2 = Aabb2 {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self::new(Vec2::ZERO, size)
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Vec2>>(points: I) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |acc, &p| Self::new(acc.min.min(p), acc.max.max(p)))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Minimum corner, or the origin for an empty box.
    pub fn min_or_zero(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::ZERO
        } else {
            self.min
        }
    }

    /// Size of the box, zero when empty.
    pub fn size(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn inflate(&self, amount: f32) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::new(self.min - Vec2::splat(amount), self.max + Vec2::splat(amount))
    }

    pub fn union(&self, other: &Aabb2) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// Bounding box of this box after an affine transform.
    pub fn transformed(&self, m: &Mat3) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().map(|c| m.transform_point(c)).iter())
    }
}

/// Oriented 2D box: a transformed rectangle kept as its four corners.
///
/// Corner order follows [`Aabb2::corners`]: `origin`, `origin + u`,
/// `origin + u + v`, `origin + v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub corners: [Vec2; 4],
}

impl Obb {
    pub fn from_rect(rect: &Aabb2, transform: &Mat3) -> Self {
        Self {
            corners: rect.corners().map(|c| transform.transform_point(c)),
        }
    }

    fn axes(&self) -> (Vec2, Vec2) {
        (
            self.corners[1] - self.corners[0],
            self.corners[3] - self.corners[0],
        )
    }

    /// Normalized box coordinates of `p`: `(0,0)` at the first corner, `(1,1)`
    /// at the opposite one. Degenerate axes yield `0` on that axis.
    pub fn uv(&self, p: Vec2) -> Vec2 {
        let (u, v) = self.axes();
        let d = p - self.corners[0];
        let project = |axis: Vec2| {
            let len2 = axis.length_squared();
            if len2 <= f32::EPSILON {
                0.0
            } else {
                d.dot(axis) / len2
            }
        };
        Vec2::new(project(u), project(v))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let uv = self.uv(p);
        (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
    }

    pub fn aabb(&self) -> Aabb2 {
        Aabb2::from_points(self.corners.iter())
    }
}

/// Axis-aligned 3D box, used for mesh extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn from_points<'a, I: IntoIterator<Item = &'a Vec3>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(&first) = iter.next() else {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            };
        };
        iter.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, &p| Self {
                min: acc.min.min(p),
                max: acc.max.max(p),
            },
        )
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_box_has_zero_size() {
        assert!(Aabb2::EMPTY.is_empty());
        assert_eq!(Aabb2::EMPTY.size(), Vec2::ZERO);
        assert_eq!(Aabb2::from_points(std::iter::empty()), Aabb2::EMPTY);
    }

    #[test]
    fn obb_uv_under_rotation() {
        let rect = Aabb2::from_size(Vec2::new(10.0, 20.0));
        let m = Mat3::translation(Vec2::new(5.0, 5.0)) * Mat3::rotation(0.4);
        let obb = Obb::from_rect(&rect, &m);
        let center = m.transform_point(Vec2::new(5.0, 10.0));
        assert_abs_diff_eq!(obb.uv(center), Vec2::HALF, epsilon = 1e-5);
        assert!(obb.contains(center));
        assert!(!obb.contains(m.transform_point(Vec2::new(-1.0, 10.0))));
    }

    #[test]
    fn aabb3_extent() {
        let b = Aabb3::from_points([Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, -2.0, 1.0)].iter());
        assert_eq!(b.size(), Vec3::new(4.0, 4.0, 1.0));
    }
}
