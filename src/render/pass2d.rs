//! The 2D pass: depth-sorted primitives drawn over whatever the 3D pass left.

use super::framebuffer::FrameBuffer;
use super::rasterizer::{stroke_triangles, EllipseFill, FlatShader, GlyphFill, PixelShader, Rasterizer};
use super::shader::{ShaderAdapter, TextureShader};
use crate::math::{Aabb2, Mat3, Obb, Vec2};
use crate::primitive::{Primitive2D, Shape2D};
use crate::scene::SceneGraph;
use crate::triangulate::{self, Triangle2};

const NO_HOLES: &[Vec<Vec2>] = &[];

fn transform_triangles(triangles: Vec<Triangle2>, m: &Mat3) -> Vec<Triangle2> {
    triangles
        .into_iter()
        .map(|t| t.map(|p| m.transform_point(p)))
        .collect()
}

fn box_triangles(size: Vec2, m: &Mat3) -> Vec<Triangle2> {
    let [a, b, c, d] = Aabb2::from_size(size).corners().map(|p| m.transform_point(p));
    vec![[a, b, c], [a, c, d]]
}

/// Draws every visible primitive of `scene`. Larger depth values draw first;
/// ties keep queue order. Returns the number of fragments shaded.
pub fn draw_scene(
    fb: &mut FrameBuffer<'_>,
    scene: &mut SceneGraph<Primitive2D>,
    rasterizer: &Rasterizer,
    time: f32,
) -> usize {
    let mut queue = scene.draw_queue();
    queue.sort_by(|a, b| b.item.depth().cmp(&a.item.depth()));

    let mut fragments = 0;
    let mut drawn = 0;
    for entry in queue.iter().filter(|e| e.item.is_visible()) {
        fragments += draw_primitive(fb, rasterizer, entry.item, &entry.transform, time);
        drawn += 1;
    }
    log::trace!("2d pass: {} primitives, {} fragments", drawn, fragments);
    fragments
}

/// Rasterizes one primitive under its global transform.
pub fn draw_primitive(
    fb: &mut FrameBuffer<'_>,
    rasterizer: &Rasterizer,
    primitive: &Primitive2D,
    global: &Mat3,
    time: f32,
) -> usize {
    let shape = primitive.shape();
    let flat = FlatShader::new(primitive.color());
    let adapter;
    let texture_shader;
    let shader: &dyn PixelShader = match (primitive.shader(), shape) {
        (Some(custom), _) => {
            adapter = ShaderAdapter::new(
                &**custom,
                Obb::from_rect(&shape.stroke_bounds(), global),
                time,
            );
            &adapter
        }
        (None, Shape2D::Bitmap { size, texture: Some(texture) }) => {
            texture_shader = TextureShader::new(
                texture,
                Obb::from_rect(&Aabb2::from_size(*size), global),
                primitive.color(),
            );
            &texture_shader
        }
        _ => &flat,
    };
    fill_shape(fb, rasterizer, primitive, global, shader)
}

fn fill_shape(
    fb: &mut FrameBuffer<'_>,
    rasterizer: &Rasterizer,
    primitive: &Primitive2D,
    global: &Mat3,
    shader: &dyn PixelShader,
) -> usize {
    let depth = primitive.depth() as f32;
    let blend = primitive.blend();

    match primitive.shape() {
        Shape2D::Triangle { points } => {
            let tri = [points.map(|p| global.transform_point(p))];
            rasterizer.fill_triangles(fb, &tri, depth, shader, blend)
        }
        Shape2D::Rectangle { size } | Shape2D::Bitmap { size, .. } => {
            rasterizer.fill_triangles(fb, &box_triangles(*size, global), depth, shader, blend)
        }
        Shape2D::Ellipse {
            radius,
            thickness,
            filled,
        } => match EllipseFill::new(*radius, *thickness, *filled, global) {
            Some(ellipse) => rasterizer.fill_ellipse(fb, &ellipse, depth, shader, blend),
            None => 0,
        },
        Shape2D::Polyline(line) => {
            let mut fragments = 0;
            if line.filled && line.closed {
                let interior = triangulate::triangulate_oriented(
                    line.path.points(),
                    line.path.is_clockwise(),
                    NO_HOLES,
                );
                let interior = transform_triangles(interior, global);
                fragments += rasterizer.fill_triangles(fb, &interior, depth, shader, blend);
            }
            let screen: Vec<Vec2> = line
                .path
                .points()
                .iter()
                .map(|p| global.transform_point(*p))
                .collect();
            let stroke = stroke_triangles(
                &screen,
                line.thickness * global.mean_scale(),
                line.rounded_joins,
                line.closed,
            );
            fragments + rasterizer.fill_triangles(fb, &stroke, depth, shader, blend)
        }
        Shape2D::Polygon { components } => components
            .iter()
            .map(|component| {
                let triangles = transform_triangles(component.triangulate(), global);
                rasterizer.fill_triangles(fb, &triangles, depth, shader, blend)
            })
            .sum(),
        Shape2D::Text(text) => {
            let contours = text
                .layout()
                .contours
                .iter()
                .map(|c| c.iter().map(|p| global.transform_point(*p)).collect())
                .collect();
            let glyphs = GlyphFill::new(contours, text.smoothing());
            rasterizer.fill_glyphs(fb, &glyphs, depth, shader, blend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{argb, BlendMode, BLACK, BLUE, GREEN, RED};
    use crate::primitive::{Component, Polyline};
    use crate::render::surface::Surface;
    use crate::scene::IdGenerator;
    use std::sync::Arc;

    fn render(scene: &mut SceneGraph<Primitive2D>) -> Surface {
        let mut surface = Surface::new(64, 64, BLACK);
        draw_scene(&mut surface.as_framebuffer(), scene, &Rasterizer::serial(), 0.0);
        surface
    }

    fn add(scene: &mut SceneGraph<Primitive2D>, ids: &mut IdGenerator, p: Primitive2D) {
        let id = scene.insert(ids, p);
        scene.add_item(id, None).unwrap();
    }

    #[test]
    fn smaller_depth_draws_on_top() {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let mut front = Primitive2D::new(Shape2D::rectangle(20.0, 20.0)).with_color(RED);
        front.set_depth(1);
        let mut back = Primitive2D::new(Shape2D::rectangle(40.0, 40.0)).with_color(BLUE);
        back.set_depth(5);
        add(&mut scene, &mut ids, front);
        add(&mut scene, &mut ids, back);

        let surface = render(&mut scene);
        assert_eq!(surface.pixel(5, 5), Some(RED));
        assert_eq!(surface.pixel(30, 30), Some(BLUE));
        assert_eq!(surface.pixel(50, 50), Some(BLACK));
    }

    #[test]
    fn invisible_primitives_are_skipped() {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let mut p = Primitive2D::new(Shape2D::rectangle(20.0, 20.0)).with_color(RED);
        p.set_visible(false);
        add(&mut scene, &mut ids, p);
        assert_eq!(render(&mut scene).pixel(5, 5), Some(BLACK));
    }

    #[test]
    fn child_inherits_parent_transform() {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let parent = scene.insert(&mut ids, Primitive2D::new(Shape2D::rectangle(1.0, 1.0)).at(Vec2::new(30.0, 30.0)));
        let child = scene.insert(&mut ids, Primitive2D::new(Shape2D::circle(4.0)).with_color(GREEN).at(Vec2::new(4.0, 4.0)));
        scene.add_item(parent, None).unwrap();
        scene.add_item(child, Some(parent)).unwrap();
        scene.get_mut(parent).unwrap().set_visible(false);

        // Child box min lands at (34, 34); centre at (38, 38).
        let surface = render(&mut scene);
        assert_eq!(surface.pixel(38, 38), Some(GREEN));
        assert_eq!(surface.pixel(31, 31), Some(BLACK));
    }

    #[test]
    fn shader_sees_box_uv() {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let mut p = Primitive2D::new(Shape2D::rectangle(32.0, 32.0));
        p.set_blend(BlendMode::Opaque)
            .set_shader(Some(Arc::new(|uv: Vec2, _t: f32| if uv.x < 0.5 { RED } else { BLUE })));
        add(&mut scene, &mut ids, p);
        let surface = render(&mut scene);
        assert_eq!(surface.pixel(2, 10), Some(RED));
        assert_eq!(surface.pixel(30, 10), Some(BLUE));
    }

    #[test]
    fn polygon_with_hole_leaves_gap() {
        let square = |a: f32, b: f32| {
            vec![Vec2::new(a, a), Vec2::new(b, a), Vec2::new(b, b), Vec2::new(a, b)]
        };
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let shape = Shape2D::Polygon {
            components: vec![Component::new(square(0.0, 40.0)).with_hole(square(10.0, 30.0))],
        };
        add(&mut scene, &mut ids, Primitive2D::new(shape).with_color(RED));
        let surface = render(&mut scene);
        assert_eq!(surface.pixel(5, 20), Some(RED));
        assert_eq!(surface.pixel(20, 20), Some(BLACK));
    }

    #[test]
    fn filled_closed_polyline_covers_interior() {
        let mut line = Polyline::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(40.0, 0.0),
                Vec2::new(40.0, 40.0),
                Vec2::new(0.0, 40.0),
            ],
            2.0,
        );
        line.closed = true;
        line.filled = true;
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        add(
            &mut scene,
            &mut ids,
            Primitive2D::new(Shape2D::Polyline(line)).with_color(GREEN).at(Vec2::new(10.0, 10.0)),
        );
        let surface = render(&mut scene);
        assert_eq!(surface.pixel(30, 30), Some(GREEN));
        assert_eq!(surface.pixel(60, 60), Some(BLACK));
    }

    /// Distinct colors written over the black background.
    fn painted_colors(surface: &Surface) -> Vec<u32> {
        let mut colors: Vec<u32> = surface.pixels().iter().copied().filter(|&c| c != BLACK).collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    #[test]
    fn translucent_rectangle_blends_once_per_pixel() {
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        let white_half = argb(0x80, 255, 255, 255);
        add(&mut scene, &mut ids, Primitive2D::new(Shape2D::rectangle(32.0, 32.0)).with_color(white_half));

        let surface = render(&mut scene);
        // Diagonal pixel of the two-triangle split matches an interior one.
        assert_eq!(surface.pixel(10, 10), surface.pixel(10, 20));
        assert_eq!(painted_colors(&surface).len(), 1);
        assert_eq!(surface.pixels().iter().filter(|&&c| c != BLACK).count(), 32 * 32);
    }

    #[test]
    fn translucent_polygon_has_no_seams() {
        let hexagon = vec![
            Vec2::new(16.0, 0.0),
            Vec2::new(40.0, 0.0),
            Vec2::new(56.0, 24.0),
            Vec2::new(40.0, 48.0),
            Vec2::new(16.0, 48.0),
            Vec2::new(0.0, 24.0),
        ];
        let mut ids = IdGenerator::new();
        let mut scene = SceneGraph::new();
        add(
            &mut scene,
            &mut ids,
            Primitive2D::new(Shape2D::polygon(hexagon)).with_color(argb(0x60, 255, 0, 0)),
        );
        let surface = render(&mut scene);
        assert_eq!(painted_colors(&surface).len(), 1);
    }
}
