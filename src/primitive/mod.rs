//! Drawable primitives.
//!
//! A primitive pairs a placement (position, anchor, rotation, scale and
//! their caches) with geometry and appearance. Placement and geometry
//! mutators advance the placement version and dirty both caches;
//! stroke-only mutators dirty just the bounding box; appearance setters
//! (color, depth, visibility, blend, shader) touch neither.

pub mod mesh;
pub mod polygon;
pub mod shape;

use std::sync::Arc;

pub use mesh::PolygonMesh;
pub use polygon::{Component, Contour};
pub use shape::{Polyline, Shape2D, TextShape};

use crate::colors::{BlendMode, WHITE};
use crate::math::{Aabb3, Mat3, Mat4, Obb, Vec2, Vec3};
use crate::render::shader::Shader;
use crate::scene::SceneItem;
use crate::text::GlyphSource;
use crate::texture::Texture;
use crate::transform::{Placement2D, Placement3D};

/// A 2D shape with placement and appearance.
#[derive(Clone)]
pub struct Primitive2D {
    placement: Placement2D,
    shape: Shape2D,
    color: u32,
    depth: i32,
    visible: bool,
    blend: BlendMode,
    shader: Option<Arc<dyn Shader>>,
}

impl std::fmt::Debug for Primitive2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive2D")
            .field("shape", &self.shape)
            .field("color", &format_args!("{:#010x}", self.color))
            .field("depth", &self.depth)
            .field("visible", &self.visible)
            .field("shader", &self.shader.is_some())
            .finish()
    }
}

impl Primitive2D {
    pub fn new(shape: Shape2D) -> Self {
        Self {
            placement: Placement2D::new(),
            shape,
            color: WHITE,
            depth: 0,
            visible: true,
            blend: BlendMode::default(),
            shader: None,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.placement.set_position(position);
        self
    }

    // ============ Appearance ============

    pub fn shape(&self) -> &Shape2D {
        &self.shape
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_color(&mut self, color: u32) -> &mut Self {
        self.color = color;
        self
    }

    /// Larger depth draws further back.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: i32) -> &mut Self {
        self.depth = depth;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend(&mut self, blend: BlendMode) -> &mut Self {
        self.blend = blend;
        self
    }

    pub fn shader(&self) -> Option<&Arc<dyn Shader>> {
        self.shader.as_ref()
    }

    pub fn set_shader(&mut self, shader: Option<Arc<dyn Shader>>) -> &mut Self {
        self.shader = shader;
        self
    }

    // ============ Placement ============

    pub fn placement(&self) -> &Placement2D {
        &self.placement
    }

    pub fn version(&self) -> u64 {
        self.placement.version()
    }

    pub fn position(&self) -> Vec2 {
        self.placement.position()
    }

    pub fn set_position(&mut self, position: Vec2) -> &mut Self {
        self.placement.set_position(position);
        self
    }

    pub fn translate(&mut self, delta: Vec2) -> &mut Self {
        self.placement.translate(delta);
        self
    }

    pub fn set_anchor(&mut self, anchor: Vec2) -> &mut Self {
        self.placement.set_anchor(anchor);
        self
    }

    pub fn set_rotation(&mut self, rotation: f32) -> &mut Self {
        self.placement.set_rotation(rotation);
        self
    }

    pub fn rotate(&mut self, delta: f32) -> &mut Self {
        self.placement.rotate(delta);
        self
    }

    pub fn set_scale(&mut self, scale: Vec2) -> &mut Self {
        self.placement.set_scale(scale);
        self
    }

    pub fn set_scale_uniform(&mut self, scale: f32) -> &mut Self {
        self.placement.set_scale_uniform(scale);
        self
    }

    // ============ Geometry ============

    /// Replaces the geometry wholesale.
    pub fn set_shape(&mut self, shape: Shape2D) -> &mut Self {
        self.shape = shape;
        self.placement.invalidate_geometry();
        self
    }

    /// Edits the geometry in place; both caches are dirtied afterwards.
    pub fn edit_shape(&mut self, edit: impl FnOnce(&mut Shape2D)) -> &mut Self {
        edit(&mut self.shape);
        self.placement.invalidate_geometry();
        self
    }

    /// Size of a rectangle or bitmap. Ignored for other kinds.
    pub fn set_size(&mut self, new_size: Vec2) -> &mut Self {
        if let Shape2D::Rectangle { size } | Shape2D::Bitmap { size, .. } = &mut self.shape {
            *size = new_size;
            self.placement.invalidate_geometry();
        }
        self
    }

    pub fn set_radius(&mut self, new_radius: Vec2) -> &mut Self {
        if let Shape2D::Ellipse { radius, .. } = &mut self.shape {
            *radius = new_radius;
            self.placement.invalidate_geometry();
        }
        self
    }

    /// Stroke width of an ellipse outline or polyline. Only the bounding box
    /// changes; the anchor basis does not.
    pub fn set_thickness(&mut self, new_thickness: f32) -> &mut Self {
        match &mut self.shape {
            Shape2D::Ellipse { thickness, .. } => *thickness = new_thickness,
            Shape2D::Polyline(line) => line.thickness = new_thickness,
            _ => return self,
        }
        self.placement.invalidate_bounds();
        self
    }

    pub fn set_filled(&mut self, fill: bool) -> &mut Self {
        match &mut self.shape {
            Shape2D::Ellipse { filled, .. } => *filled = fill,
            Shape2D::Polyline(line) => line.filled = fill,
            _ => {}
        }
        self
    }

    /// Points of a polyline or the outer contour of a single-component polygon.
    pub fn set_points(&mut self, points: Vec<Vec2>) -> &mut Self {
        match &mut self.shape {
            Shape2D::Polyline(line) => line.path.set_points(points),
            Shape2D::Polygon { components } if components.len() == 1 => {
                components[0].outer_mut().set_points(points)
            }
            Shape2D::Triangle { points: tri } if points.len() == 3 => {
                tri.copy_from_slice(&points)
            }
            _ => return self,
        }
        self.placement.invalidate_geometry();
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        if let Shape2D::Text(shape) = &mut self.shape {
            shape.set_text(text);
            self.placement.invalidate_geometry();
        }
        self
    }

    pub fn set_font_size(&mut self, size: f32) -> &mut Self {
        if let Shape2D::Text(shape) = &mut self.shape {
            shape.set_size(size);
            self.placement.invalidate_geometry();
        }
        self
    }

    pub fn set_font(&mut self, font: Arc<dyn GlyphSource>) -> &mut Self {
        if let Shape2D::Text(shape) = &mut self.shape {
            shape.set_font(font);
            self.placement.invalidate_geometry();
        }
        self
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> &mut Self {
        if let Shape2D::Text(shape) = &mut self.shape {
            shape.set_smoothing(smoothing);
            self.placement.invalidate_bounds();
        }
        self
    }

    pub fn set_texture(&mut self, new_texture: Option<Arc<Texture>>) -> &mut Self {
        if let Shape2D::Bitmap { texture, .. } = &mut self.shape {
            *texture = new_texture;
        }
        self
    }

    // ============ Derived ============

    /// Cached local transform.
    pub fn transform(&mut self) -> Mat3 {
        let shape = &self.shape;
        self.placement.transform(|| shape.local_bounds())
    }

    /// Cached oriented box of the stroked geometry in parent space.
    pub fn bounds(&mut self) -> Obb {
        let shape = &self.shape;
        self.placement
            .oriented_bounds(|| shape.local_bounds(), || shape.stroke_bounds())
    }
}

impl SceneItem for Primitive2D {
    type Transform = Mat3;

    fn identity() -> Mat3 {
        Mat3::IDENTITY
    }

    fn version(&self) -> u64 {
        self.placement.version()
    }

    fn local_transform(&mut self) -> Mat3 {
        self.transform()
    }
}

/// A mesh with placement and appearance.
#[derive(Clone)]
pub struct Primitive3D {
    placement: Placement3D,
    mesh: PolygonMesh,
    color: u32,
    /// Submission order hint; the z-buffer still decides visibility.
    depth: i32,
    visible: bool,
    shader: Option<Arc<dyn Shader>>,
}

impl std::fmt::Debug for Primitive3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive3D")
            .field("triangles", &self.mesh.triangle_count())
            .field("color", &format_args!("{:#010x}", self.color))
            .field("depth", &self.depth)
            .field("visible", &self.visible)
            .field("shader", &self.shader.is_some())
            .finish()
    }
}

impl Primitive3D {
    pub fn new(mesh: PolygonMesh) -> Self {
        Self {
            placement: Placement3D::new(),
            mesh,
            color: WHITE,
            depth: 0,
            visible: true,
            shader: None,
        }
    }

    pub fn mesh(&self) -> &PolygonMesh {
        &self.mesh
    }

    pub fn set_mesh(&mut self, mesh: PolygonMesh) -> &mut Self {
        self.mesh = mesh;
        self.placement.invalidate_geometry();
        self
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) -> &mut Self {
        self.mesh.set_vertices(vertices, self.color);
        self.placement.invalidate_geometry();
        self
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    /// Sets the primitive color and repaints every vertex with it.
    pub fn set_color(&mut self, color: u32) -> &mut Self {
        self.color = color;
        self.mesh.fill_colors(color);
        self
    }

    pub fn set_vertex_color(&mut self, index: usize, color: u32) -> &mut Self {
        self.mesh.set_vertex_color(index, color);
        self
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Larger depths are submitted first, so among fragments at equal `z`
    /// the smaller depth wins.
    pub fn set_depth(&mut self, depth: i32) -> &mut Self {
        self.depth = depth;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    pub fn shader(&self) -> Option<&Arc<dyn Shader>> {
        self.shader.as_ref()
    }

    pub fn set_shader(&mut self, shader: Option<Arc<dyn Shader>>) -> &mut Self {
        self.shader = shader;
        self
    }

    pub fn placement(&self) -> &Placement3D {
        &self.placement
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.placement.set_position(position);
        self
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.placement.translate(delta);
        self
    }

    pub fn set_anchor(&mut self, anchor: Vec3) -> &mut Self {
        self.placement.set_anchor(anchor);
        self
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.placement.set_rotation(rotation);
        self
    }

    pub fn rotate(&mut self, delta: Vec3) -> &mut Self {
        self.placement.rotate(delta);
        self
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.placement.set_scale(scale);
        self
    }

    pub fn set_scale_uniform(&mut self, scale: f32) -> &mut Self {
        self.placement.set_scale_uniform(scale);
        self
    }

    pub fn transform(&mut self) -> Mat4 {
        let mesh = &self.mesh;
        self.placement.transform(|| mesh.extent())
    }

    /// Cached extent of the transformed mesh.
    pub fn bounds(&mut self) -> Aabb3 {
        self.placement.bounds(self.mesh.vertices())
    }
}

impl SceneItem for Primitive3D {
    type Transform = Mat4;

    fn identity() -> Mat4 {
        Mat4::identity()
    }

    fn version(&self) -> u64 {
        self.placement.version()
    }

    fn local_transform(&mut self) -> Mat4 {
        self.transform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::RED;
    use approx::assert_abs_diff_eq;

    fn rect() -> Primitive2D {
        Primitive2D::new(Shape2D::rectangle(10.0, 20.0))
    }

    #[test]
    fn transform_is_cached_bit_identical() {
        let mut p = rect();
        p.set_position(Vec2::new(3.25, 7.5)).set_rotation(0.7).set_anchor(Vec2::HALF);
        let a = p.transform();
        let b = p.transform();
        assert_eq!(a, b);
        assert!(!p.placement().is_transform_dirty());
    }

    #[test]
    fn appearance_does_not_bump_version() {
        let mut p = rect();
        let v = p.version();
        p.set_color(RED).set_depth(4).set_visible(false).set_blend(BlendMode::Opaque);
        assert_eq!(p.version(), v);
        p.set_size(Vec2::new(1.0, 1.0));
        assert_eq!(p.version(), v + 1);
    }

    #[test]
    fn thickness_only_dirties_bounds() {
        let mut p = Primitive2D::new(Shape2D::circle(5.0));
        p.transform();
        p.bounds();
        let v = p.version();
        p.set_thickness(2.0);
        assert_eq!(p.version(), v);
        assert!(!p.placement().is_transform_dirty());
        assert!(p.placement().is_bounds_dirty());
        // Anchor (0, 0) pins the geometry box minimum to the position.
        let obb = p.bounds();
        assert_abs_diff_eq!(obb.corners[0], Vec2::splat(-1.0), epsilon = 1e-6);
        assert_abs_diff_eq!(obb.corners[2], Vec2::splat(11.0), epsilon = 1e-6);
    }

    #[test]
    fn ellipse_anchor_pivots_about_centre() {
        let mut p = Primitive2D::new(Shape2D::circle(5.0));
        p.set_anchor(Vec2::HALF).set_position(Vec2::new(40.0, 30.0)).set_rotation(1.0);
        let m = p.transform();
        assert_abs_diff_eq!(m.transform_point(Vec2::ZERO), Vec2::new(40.0, 30.0), epsilon = 1e-5);
    }

    #[test]
    fn mesh_colors_follow_primitive_color() {
        let mut p = Primitive3D::new(PolygonMesh::cube(1.0, WHITE));
        p.set_color(RED);
        assert!(p.mesh().colors().iter().all(|&c| c == RED));
        let v = p.placement().version();
        p.set_vertices(vec![Vec3::ZERO; 3]);
        assert_eq!(p.mesh().colors().len(), 3);
        assert_eq!(p.placement().version(), v + 1);
    }

    #[test]
    fn mesh_depth_is_appearance_only() {
        let mut p = Primitive3D::new(PolygonMesh::cube(1.0, WHITE));
        assert_eq!(p.depth(), 0);
        let v = p.placement().version();
        p.set_depth(7);
        assert_eq!(p.depth(), 7);
        assert_eq!(p.placement().version(), v);
    }

    #[test]
    fn mesh_bounds_follow_transform() {
        let mut p = Primitive3D::new(PolygonMesh::cube(2.0, WHITE));
        p.set_position(Vec3::new(5.0, 0.0, 0.0)).set_scale_uniform(2.0);
        let b = p.bounds();
        assert_abs_diff_eq!(b.min.x, 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(b.max.x, 9.0, epsilon = 1e-5);
    }
}
