//! Placement components with cached transforms.
//!
//! A placement holds where an object sits (position, pivot anchor, scale,
//! rotation) plus a monotonically increasing version counter. Every setter that
//! changes placement bumps the version and dirties both caches; the scene
//! graph compares versions to decide when global transforms are stale.
//!
//! The composed local transform is
//!
//! ```text
//! Translate(position) * Rotate(rotation) * Scale(scale) * Translate(-pivot)
//! pivot = local_box.min + anchor * local_box.size
//! ```
//!
//! so the pivot stays fixed while rotating and scaling.
//!
//! Setters return `&mut Self` for chaining:
//!
//! ```ignore
//! placement
//!     .set_position(Vec2::new(5.0, 2.0))
//!     .rotate(0.1)
//!     .set_scale_uniform(2.0);
//! ```

use crate::math::{Aabb2, Aabb3, Mat3, Mat4, Obb, Vec2, Vec3};

/// A lazily recomputed value with an explicit dirty flag.
///
/// Owners check [`Cached::peek`] and write back with [`Cached::store`] through
/// `&mut self`; there is no interior mutability involved.
#[derive(Debug, Clone, Copy)]
pub struct Cached<T> {
    value: T,
    dirty: bool,
}

impl<T: Copy> Cached<T> {
    /// Creates a dirty cache holding a placeholder value.
    pub fn new(placeholder: T) -> Self {
        Self {
            value: placeholder,
            dirty: true,
        }
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stores a freshly computed value and marks the cache clean.
    pub fn store(&mut self, value: T) -> T {
        self.value = value;
        self.dirty = false;
        value
    }

    /// Returns the cached value if it is current.
    pub fn peek(&self) -> Option<T> {
        (!self.dirty).then_some(self.value)
    }
}

/// 2D placement: position, anchor, scale and rotation (radians).
#[derive(Debug, Clone)]
pub struct Placement2D {
    position: Vec2,
    anchor: Vec2,
    scale: Vec2,
    rotation: f32,
    version: u64,
    transform: Cached<Mat3>,
    bounds: Cached<Obb>,
}

impl Default for Placement2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            anchor: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            version: 0,
            transform: Cached::new(Mat3::IDENTITY),
            bounds: Cached::new(Obb {
                corners: [Vec2::ZERO; 4],
            }),
        }
    }
}

impl Placement2D {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transform version. Only mutators advance it.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) -> &mut Self {
        self.version += 1;
        self.transform.invalidate();
        self.bounds.invalidate();
        self
    }

    /// Marks both caches stale after the local geometry changed.
    pub fn invalidate_geometry(&mut self) -> &mut Self {
        self.touch()
    }

    /// Marks only the bounding box stale (stroke-only changes).
    pub fn invalidate_bounds(&mut self) {
        self.bounds.invalidate();
    }

    pub fn is_transform_dirty(&self) -> bool {
        self.transform.is_dirty()
    }

    pub fn is_bounds_dirty(&self) -> bool {
        self.bounds.is_dirty()
    }

    // ============ Position ============

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) -> &mut Self {
        self.position = position;
        self.touch()
    }

    pub fn translate(&mut self, delta: Vec2) -> &mut Self {
        self.position += delta;
        self.touch()
    }

    // ============ Anchor ============

    /// Pivot as a fraction of the local geometry size.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec2) -> &mut Self {
        self.anchor = anchor;
        self.touch()
    }

    // ============ Rotation ============

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) -> &mut Self {
        self.rotation = rotation;
        self.touch()
    }

    pub fn rotate(&mut self, delta: f32) -> &mut Self {
        self.rotation += delta;
        self.touch()
    }

    // ============ Scale ============

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) -> &mut Self {
        self.scale = scale;
        self.touch()
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.set_scale(Vec2::splat(s))
    }

    pub fn scale_by(&mut self, factor: Vec2) -> &mut Self {
        self.scale = self.scale.mul_elem(factor);
        self.touch()
    }

    // ============ Matrix Generation ============

    /// Composes the local transform for geometry occupying `local_box`.
    pub fn compose(&self, local_box: &Aabb2) -> Mat3 {
        let pivot = local_box.min_or_zero() + self.anchor.mul_elem(local_box.size());
        Mat3::translation(self.position)
            * Mat3::rotation(self.rotation)
            * Mat3::scaling(self.scale)
            * Mat3::translation(-pivot)
    }

    /// Cached local transform. `local_box` is only evaluated when the cache is
    /// dirty.
    pub fn transform(&mut self, local_box: impl FnOnce() -> Aabb2) -> Mat3 {
        if let Some(transform) = self.transform.peek() {
            return transform;
        }
        let composed = self.compose(&local_box());
        self.transform.store(composed)
    }

    /// Cached oriented box of `stroke_box` under the local transform.
    pub fn oriented_bounds(
        &mut self,
        local_box: impl FnOnce() -> Aabb2,
        stroke_box: impl FnOnce() -> Aabb2,
    ) -> Obb {
        if let Some(bounds) = self.bounds.peek() {
            return bounds;
        }
        let transform = self.transform(local_box);
        self.bounds.store(Obb::from_rect(&stroke_box(), &transform))
    }
}

/// 3D placement: position, anchor, scale and Euler rotation (radians).
#[derive(Debug, Clone)]
pub struct Placement3D {
    position: Vec3,
    anchor: Vec3,
    scale: Vec3,
    rotation: Vec3, // Euler angles in radians: x=pitch, y=yaw, z=roll
    version: u64,
    transform: Cached<Mat4>,
    bounds: Cached<Aabb3>,
}

impl Default for Placement3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            anchor: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            version: 0,
            transform: Cached::new(Mat4::identity()),
            bounds: Cached::new(Aabb3 {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
            }),
        }
    }
}

impl Placement3D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) -> &mut Self {
        self.version += 1;
        self.transform.invalidate();
        self.bounds.invalidate();
        self
    }

    /// Marks both caches stale after the mesh changed.
    pub fn invalidate_geometry(&mut self) -> &mut Self {
        self.touch()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self.touch()
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position = self.position + delta;
        self.touch()
    }

    /// Pivot as a fraction of the mesh extent.
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec3) -> &mut Self {
        self.anchor = anchor;
        self.touch()
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self.touch()
    }

    pub fn rotate(&mut self, delta: Vec3) -> &mut Self {
        self.rotation = self.rotation + delta;
        self.touch()
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self.touch()
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.set_scale(Vec3::new(s, s, s))
    }

    /// Order: Translation * RotationX * RotationY * RotationZ * Scale * Translate(-pivot)
    pub fn compose(&self, extent: &Aabb3) -> Mat4 {
        let pivot = extent.min + self.anchor.mul_elem(extent.size());
        Mat4::translation(self.position.x, self.position.y, self.position.z)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z)
            * Mat4::translation(-pivot.x, -pivot.y, -pivot.z)
    }

    pub fn transform(&mut self, extent: impl FnOnce() -> Aabb3) -> Mat4 {
        if let Some(transform) = self.transform.peek() {
            return transform;
        }
        let composed = self.compose(&extent());
        self.transform.store(composed)
    }

    /// Cached extent of `vertices` after the local transform.
    pub fn bounds(&mut self, vertices: &[Vec3]) -> Aabb3 {
        if let Some(bounds) = self.bounds.peek() {
            return bounds;
        }
        let transform = self.transform(|| Aabb3::from_points(vertices.iter()));
        let moved: Vec<Vec3> = vertices.iter().map(|v| transform.transform_point(*v)).collect();
        self.bounds.store(Aabb3::from_points(moved.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    fn square() -> Aabb2 {
        Aabb2::from_size(Vec2::new(10.0, 10.0))
    }

    #[test]
    fn default_is_identity() {
        let mut p = Placement2D::new();
        assert_eq!(p.transform(square), Mat3::IDENTITY);
        let mut p3 = Placement3D::new();
        let unit = Aabb3 {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        };
        assert_eq!(p3.transform(|| unit), Mat4::identity());
    }

    #[test]
    fn fluent_setters_bump_version() {
        let mut p = Placement2D::new();
        p.set_position(Vec2::new(1.0, 2.0))
            .rotate(0.5)
            .set_scale_uniform(2.0);
        assert_eq!(p.version(), 3);
        assert_eq!(p.position(), Vec2::new(1.0, 2.0));
        assert_eq!(p.scale(), Vec2::splat(2.0));
    }

    #[test]
    fn transform_is_idempotent() {
        let mut p = Placement2D::new();
        p.set_position(Vec2::new(3.3, -1.7))
            .set_rotation(0.31)
            .set_anchor(Vec2::HALF);
        let a = p.transform(square);
        let b = p.transform(|| panic!("cache should be clean"));
        assert_eq!(a, b);
        assert!(!p.is_transform_dirty());
    }

    #[test]
    fn anchor_is_a_fixed_pivot() {
        let mut p = Placement2D::new();
        p.set_position(Vec2::new(50.0, 50.0))
            .set_anchor(Vec2::HALF)
            .set_rotation(FRAC_PI_2)
            .set_scale_uniform(3.0);
        let m = p.transform(square);
        // The pivot (box centre) lands exactly on the position.
        assert_abs_diff_eq!(m * Vec2::new(5.0, 5.0), Vec2::new(50.0, 50.0), epsilon = 1e-4);
    }

    #[test]
    fn mutator_dirties_both_caches() {
        let mut p = Placement2D::new();
        p.transform(square);
        p.oriented_bounds(square, square);
        assert!(!p.is_bounds_dirty());
        p.translate(Vec2::ONE);
        assert!(p.is_transform_dirty());
        assert!(p.is_bounds_dirty());
    }

    #[test]
    fn bounds_invalidation_keeps_transform_and_version() {
        let mut p = Placement2D::new();
        p.transform(square);
        p.oriented_bounds(square, square);
        let version = p.version();
        p.invalidate_bounds();
        assert!(p.is_bounds_dirty());
        assert!(!p.is_transform_dirty());
        assert_eq!(p.version(), version);
        let obb = p.oriented_bounds(square, || square().inflate(1.0));
        assert_eq!(obb.corners[0], Vec2::splat(-1.0));
    }

    #[test]
    fn mesh_extent_follows_placement() {
        let mut p = Placement3D::new();
        let verts = [Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)];
        p.set_position(Vec3::new(10.0, 0.0, 0.0));
        let b = p.bounds(&verts);
        assert_abs_diff_eq!(b.min.x, 10.0, epsilon = 1e-6);
        assert_abs_diff_eq!(b.max.x, 12.0, epsilon = 1e-6);
    }
}
