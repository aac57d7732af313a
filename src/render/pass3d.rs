//! The 3D pass: mesh primitives through view, projection and the triangle
//! rasterizer.
//!
//! Per triangle:
//!
//! ```text
//! model --(global)--> world --(view)--> view space --(projection)--> clip
//!   cull back faces in view space, reject w <= W_EPSILON,
//!   divide by w, map NDC to pixels (y flipped), fill with depth z/w
//! ```

use super::framebuffer::FrameBuffer;
use super::rasterizer::{BarycentricTriangle, PixelShader, Rasterizer, VertexColorShader};
use super::shader::MeshShaderAdapter;
use crate::camera::Camera;
use crate::colors::BlendMode;
use crate::math::{Mat4, Vec2, Vec3, Vec4};
use crate::primitive::Primitive3D;
use crate::scene::SceneGraph;

/// Vertices with clip `w` at or below this are treated as behind the eye.
pub const W_EPSILON: f32 = 1e-5;

/// Per-frame counters for the 3D pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub triangles: usize,
    pub culled: usize,
    pub clipped: usize,
    pub fragments: usize,
}

impl std::ops::AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles += rhs.triangles;
        self.culled += rhs.culled;
        self.clipped += rhs.clipped;
        self.fragments += rhs.fragments;
    }
}

/// `true` when the face `(a, b, c)` (view space, eye at the origin) points
/// away from the eye.
#[inline]
pub fn is_back_face(a: Vec3, b: Vec3, c: Vec3) -> bool {
    let normal = (b - a).cross(c - a);
    normal.dot(a) >= 0.0
}

/// Maps NDC `x, y` in `[-1, 1]` to pixel coordinates, y down.
#[inline]
pub fn ndc_to_screen(ndc: Vec3, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * width as f32,
        (1.0 - ndc.y) * 0.5 * height as f32,
    )
}

/// Draws every visible mesh primitive of `scene`, larger depth hints first.
pub fn draw_scene(
    fb: &mut FrameBuffer<'_>,
    scene: &mut SceneGraph<Primitive3D>,
    camera: &Camera,
    rasterizer: &Rasterizer,
    time: f32,
) -> MeshStats {
    let view = camera.view_matrix();
    let projection = camera.projection_matrix();

    let mut queue = scene.draw_queue();
    queue.sort_by(|a, b| b.item.depth().cmp(&a.item.depth()));

    let mut stats = MeshStats::default();
    for entry in queue.iter().filter(|e| e.item.is_visible()) {
        let model_view = view * entry.transform;
        stats += draw_mesh(fb, rasterizer, entry.item, &model_view, &projection, time);
    }
    log::trace!(
        "3d pass: {} triangles, {} culled, {} clipped, {} fragments",
        stats.triangles,
        stats.culled,
        stats.clipped,
        stats.fragments
    );
    stats
}

/// Rasterizes one mesh. `model_view` takes model space to view space.
pub fn draw_mesh(
    fb: &mut FrameBuffer<'_>,
    rasterizer: &Rasterizer,
    primitive: &Primitive3D,
    model_view: &Mat4,
    projection: &Mat4,
    time: f32,
) -> MeshStats {
    let mesh = primitive.mesh();
    let (width, height) = (fb.width(), fb.height());
    let mut stats = MeshStats::default();

    for index in 0..mesh.triangle_count() {
        let Some((vertices, colors)) = mesh.triangle(index) else {
            continue;
        };
        stats.triangles += 1;

        let [a, b, c] = vertices.map(|v| model_view.transform_point(v));
        if is_back_face(a, b, c) {
            stats.culled += 1;
            continue;
        }

        let clip = [a, b, c].map(|v| *projection * Vec4::from(v));
        if clip.iter().any(|v| v.w <= W_EPSILON) {
            stats.clipped += 1;
            continue;
        }

        let ndc = clip.map(Vec4::to_vec3_perspective);
        let tri = BarycentricTriangle::new(ndc.map(|v| ndc_to_screen(v, width, height)));
        let depths = ndc.map(|v| v.z);
        let w = clip.map(|v| v.w);

        let vertex_colors;
        let custom;
        let shader: &dyn PixelShader = match primitive.shader() {
            Some(s) => {
                custom = MeshShaderAdapter::new(&**s, w, time);
                &custom
            }
            None => {
                vertex_colors = VertexColorShader::new(colors, w);
                &vertex_colors
            }
        };
        stats.fragments += rasterizer.fill_triangle(fb, &tri, depths, shader, BlendMode::Alpha);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLACK, RED};
    use crate::primitive::PolygonMesh;
    use crate::render::surface::Surface;
    use crate::scene::IdGenerator;

    fn cube_scene(color: u32) -> SceneGraph<Primitive3D> {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let id = scene.insert(&mut ids, Primitive3D::new(PolygonMesh::cube(2.0, color)));
        scene.get_mut(id).unwrap().set_anchor(Vec3::HALF);
        scene.add_item(id, None).unwrap();
        scene
    }

    #[test]
    fn back_face_orientation() {
        let a = Vec3::new(0.0, 0.0, 5.0);
        let b = Vec3::new(0.0, 1.0, 5.0);
        let c = Vec3::new(1.0, 1.0, 5.0);
        // Normal (0, 0, -1) faces the eye.
        assert!(!is_back_face(a, b, c));
        assert!(is_back_face(a, c, b));
    }

    #[test]
    fn ndc_corners_map_to_screen_corners() {
        assert_eq!(ndc_to_screen(Vec3::new(-1.0, 1.0, 0.0), 200, 100), Vec2::ZERO);
        assert_eq!(ndc_to_screen(Vec3::new(1.0, -1.0, 0.0), 200, 100), Vec2::new(200.0, 100.0));
    }

    #[test]
    fn cube_shows_half_its_faces() {
        let mut scene = cube_scene(RED);
        let mut surface = Surface::new(64, 64, BLACK);
        let stats = draw_scene(
            &mut surface.as_framebuffer(),
            &mut scene,
            &Camera::default(),
            &Rasterizer::serial(),
            0.0,
        );
        assert_eq!(stats.triangles, 12);
        // From straight ahead only the front face is visible.
        assert_eq!(stats.culled, 10);
        assert_eq!(surface.pixel(32, 32), Some(RED));
        assert_eq!(surface.pixel(1, 1), Some(BLACK));
        let depth = surface.depth(32, 32).unwrap();
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn faces_reaching_behind_the_eye_are_rejected() {
        let mut scene = cube_scene(RED);
        let id = scene.root_children()[0];
        scene.get_mut(id).unwrap().set_position(Vec3::new(2.0, 0.0, 0.0));

        // The cube's left face spans z in [-1, 1] and faces the eye.
        let mut surface = Surface::new(32, 32, BLACK);
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let stats = draw_scene(&mut surface.as_framebuffer(), &mut scene, &camera, &Rasterizer::serial(), 0.0);
        assert_eq!(stats.clipped, 2);
    }

    #[test]
    fn nearer_face_wins_depth_test() {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        for (z, color) in [(3.0, RED), (0.0, crate::colors::BLUE)] {
            let id = scene.insert(&mut ids, Primitive3D::new(PolygonMesh::cube(1.0, color)));
            scene
                .get_mut(id)
                .unwrap()
                .set_anchor(Vec3::HALF)
                .set_position(Vec3::new(0.0, 0.0, z));
            scene.add_item(id, None).unwrap();
        }
        let mut surface = Surface::new(64, 64, BLACK);
        draw_scene(&mut surface.as_framebuffer(), &mut scene, &Camera::default(), &Rasterizer::serial(), 0.0);
        assert_eq!(surface.pixel(32, 32), Some(crate::colors::BLUE));
    }

    #[test]
    fn depth_hint_breaks_coplanar_ties() {
        use crate::colors::BLUE;
        for order in [[(RED, 0), (BLUE, 5)], [(BLUE, 5), (RED, 0)]] {
            let mut ids = IdGenerator::new();
            let mut scene = SceneGraph::new();
            for (color, depth) in order {
                let id = scene.insert(&mut ids, Primitive3D::new(PolygonMesh::cube(2.0, color)));
                scene.get_mut(id).unwrap().set_anchor(Vec3::HALF).set_depth(depth);
                scene.add_item(id, None).unwrap();
            }
            let mut surface = Surface::new(64, 64, BLACK);
            draw_scene(&mut surface.as_framebuffer(), &mut scene, &Camera::default(), &Rasterizer::serial(), 0.0);
            assert_eq!(surface.pixel(32, 32), Some(RED));
        }
    }
}
