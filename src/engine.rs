//! Core rendering engine.
//!
//! The [`Engine`] owns the render surface, the 2D and 3D scene graphs, the
//! camera and the id generator. Callers create primitives through it, get
//! back [`ItemId`]s, attach them to a scene and draw frames:
//!
//! ```ignore
//! let mut engine = Engine::new(640, 480);
//! let id = engine.create_circle(20.0);
//! engine.add_item(id, None)?;
//! engine.draw_frame();
//! engine.present_frame(&mut backend)?;
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::RenderBackend;
use crate::camera::Camera;
use crate::colors;
use crate::error::{BackendError, ResourceError, SceneError};
use crate::math::{Vec2, Vec3};
use crate::primitive::{Component, PolygonMesh, Polyline, Primitive2D, Primitive3D, Shape2D, TextShape};
use crate::render::rasterizer::{DEFAULT_PARALLEL_THRESHOLD, DEFAULT_TILE_SIZE};
use crate::render::{pass2d, pass3d, MeshStats, Rasterizer, Surface};
use crate::scene::{IdGenerator, ItemId, SceneGraph};
use crate::text::{GlyphSource, TtfFont};
use crate::texture::Texture;

/// Engine settings. Every field has a usable default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: u32,
    /// Fills covering more pixels than this run on the worker pool.
    pub parallel_threshold: usize,
    pub tile_size: usize,
    /// Worker count; `None` uses the `rayon` pool size.
    pub workers: Option<usize>,
    pub camera: Camera,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            clear_color: colors::BACKGROUND,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            tile_size: DEFAULT_TILE_SIZE,
            workers: None,
            camera: Camera::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_color(mut self, color: u32) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_parallel_threshold(mut self, pixels: usize) -> Self {
        self.parallel_threshold = pixels;
        self
    }

    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }
}

/// Counters from the last [`Engine::draw_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub mesh: MeshStats,
    pub fragments_2d: usize,
    pub nodes_2d: usize,
    pub nodes_3d: usize,
}

pub struct Engine {
    surface: Surface,
    rasterizer: Rasterizer,
    camera: Camera,
    scene_2d: SceneGraph<Primitive2D>,
    scene_3d: SceneGraph<Primitive3D>,
    ids: IdGenerator,
    time: f32,
    frame: u64,
    /// Resource paths already reported as unavailable.
    warned: HashSet<PathBuf>,
}

impl Engine {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(EngineConfig::default().with_size(width, height))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_id_generator(config, IdGenerator::new())
    }

    /// Uses `ids` for every item this engine creates.
    pub fn with_id_generator(config: EngineConfig, ids: IdGenerator) -> Self {
        let mut camera = config.camera;
        camera
            .projection_mut()
            .set_aspect_ratio(aspect_ratio(config.width, config.height));
        log::debug!(
            "engine {}x{}, parallel above {} px",
            config.width,
            config.height,
            config.parallel_threshold
        );
        Self {
            surface: Surface::new(config.width, config.height, config.clear_color),
            rasterizer: Rasterizer::new(config.parallel_threshold, config.tile_size, config.workers),
            camera,
            scene_2d: SceneGraph::new(),
            scene_3d: SceneGraph::new(),
            ids,
            time: 0.0,
            frame: 0,
            warned: HashSet::new(),
        }
    }

    // ============ Creation ============

    /// Registers a 2D primitive. It is not drawn until attached with
    /// [`add_item`](Self::add_item).
    pub fn create_primitive(&mut self, primitive: Primitive2D) -> ItemId {
        let id = self.scene_2d.insert(&mut self.ids, primitive);
        log::debug!("created 2d item {}", id);
        id
    }

    pub fn create_primitive3d(&mut self, primitive: Primitive3D) -> ItemId {
        let id = self.scene_3d.insert(&mut self.ids, primitive);
        log::debug!("created 3d item {}", id);
        id
    }

    pub fn create_triangle(&mut self, points: [Vec2; 3]) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Triangle { points }))
    }

    pub fn create_rectangle(&mut self, size: Vec2) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Rectangle { size }))
    }

    pub fn create_circle(&mut self, radius: f32) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::circle(radius)))
    }

    pub fn create_ellipse(&mut self, radius: Vec2, thickness: f32, filled: bool) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Ellipse {
            radius,
            thickness,
            filled,
        }))
    }

    pub fn create_polyline(&mut self, points: Vec<Vec2>, thickness: f32) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Polyline(Polyline::new(
            points, thickness,
        ))))
    }

    pub fn create_polygon(&mut self, components: Vec<Component>) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Polygon { components }))
    }

    pub fn create_text(&mut self, text: &str, font: Arc<dyn GlyphSource>, size: f32) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Text(TextShape::new(text, font, size))))
    }

    pub fn create_bitmap(&mut self, size: Vec2, texture: Option<Arc<Texture>>) -> ItemId {
        self.create_primitive(Primitive2D::new(Shape2D::Bitmap { size, texture }))
    }

    pub fn create_mesh(&mut self, mesh: PolygonMesh) -> ItemId {
        self.create_primitive3d(Primitive3D::new(mesh))
    }

    pub fn create_cube(&mut self, size: f32, color: u32) -> ItemId {
        let mut cube = Primitive3D::new(PolygonMesh::cube(size, color));
        cube.set_color(color).set_anchor(Vec3::HALF);
        self.create_primitive3d(cube)
    }

    // ============ Access ============

    pub fn primitive(&self, id: ItemId) -> Option<&Primitive2D> {
        self.scene_2d.get(id)
    }

    pub fn primitive_mut(&mut self, id: ItemId) -> Option<&mut Primitive2D> {
        self.scene_2d.get_mut(id)
    }

    pub fn primitive3d(&self, id: ItemId) -> Option<&Primitive3D> {
        self.scene_3d.get(id)
    }

    pub fn primitive3d_mut(&mut self, id: ItemId) -> Option<&mut Primitive3D> {
        self.scene_3d.get_mut(id)
    }

    pub fn scene_2d(&self) -> &SceneGraph<Primitive2D> {
        &self.scene_2d
    }

    pub fn scene_3d(&self) -> &SceneGraph<Primitive3D> {
        &self.scene_3d
    }

    // ============ Scene ============

    /// Attaches `id` under `parent` (or the root) in whichever scene it was
    /// created for. Attaching an already attached item does nothing.
    pub fn add_item(&mut self, id: ItemId, parent: Option<ItemId>) -> Result<(), SceneError> {
        if self.scene_2d.is_registered(id) {
            self.scene_2d.add_item(id, parent)
        } else if self.scene_3d.is_registered(id) {
            self.scene_3d.add_item(id, parent)
        } else {
            Err(SceneError::UnknownItem(id))
        }
    }

    /// Detaches `id` and destroys its subtree. Returns the number of nodes
    /// removed; the primitives stay registered.
    pub fn remove_item(&mut self, id: ItemId) -> usize {
        self.scene_2d.remove_item(id) + self.scene_3d.remove_item(id)
    }

    /// Detaches `id` and forgets its primitive.
    pub fn discard(&mut self, id: ItemId) -> bool {
        let removed_2d = self.scene_2d.discard(id).is_some();
        let removed_3d = self.scene_3d.discard(id).is_some();
        removed_2d || removed_3d
    }

    /// Detaches everything from both scenes.
    pub fn clear(&mut self) {
        self.scene_2d.clear();
        self.scene_3d.clear();
        log::debug!("cleared both scenes");
    }

    // ============ Frame ============

    /// Renders the 3D scene, then the 2D scene over it.
    pub fn draw_frame(&mut self) -> FrameStats {
        self.surface.clear_frame_buffer();

        let mesh = pass3d::draw_scene(
            &mut self.surface.as_framebuffer(),
            &mut self.scene_3d,
            &self.camera,
            &self.rasterizer,
            self.time,
        );

        self.surface.reset_depth();
        let fragments_2d = pass2d::draw_scene(
            &mut self.surface.as_framebuffer(),
            &mut self.scene_2d,
            &self.rasterizer,
            self.time,
        );

        self.frame += 1;
        let stats = FrameStats {
            mesh,
            fragments_2d,
            nodes_2d: self.scene_2d.node_count(),
            nodes_3d: self.scene_3d.node_count(),
        };
        log::trace!("frame {}: {:?}", self.frame, stats);
        stats
    }

    /// Hands the finished frame to `backend`, then lets it clean up.
    pub fn present_frame(&self, backend: &mut dyn RenderBackend) -> Result<(), BackendError> {
        backend.present(&self.surface)?;
        backend.clear();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.camera
            .projection_mut()
            .set_aspect_ratio(aspect_ratio(width, height));
        log::debug!("resized to {}x{}", width, height);
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn set_clear_color(&mut self, color: u32) {
        self.surface.set_clear_color(color);
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Seconds passed to shaders.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    pub fn advance_time(&mut self, delta: f32) {
        self.time += delta;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // ============ Resources ============

    pub fn load_font(&self, path: impl AsRef<Path>) -> Result<Arc<dyn GlyphSource>, ResourceError> {
        Ok(Arc::new(TtfFont::from_file(path)?))
    }

    pub fn load_texture(&self, path: impl AsRef<Path>) -> Result<Arc<Texture>, ResourceError> {
        Ok(Arc::new(Texture::from_file(path)?))
    }

    /// Loads an OBJ mesh; vertices without colors take `color`.
    pub fn load_mesh(&self, path: impl AsRef<Path>, color: u32) -> Result<PolygonMesh, ResourceError> {
        PolygonMesh::from_obj(path, color)
    }

    pub fn load_font_or_warn(&mut self, path: impl AsRef<Path>) -> Option<Arc<dyn GlyphSource>> {
        let result = self.load_font(path.as_ref());
        self.ok_or_warn(path.as_ref(), result)
    }

    pub fn load_texture_or_warn(&mut self, path: impl AsRef<Path>) -> Option<Arc<Texture>> {
        let result = self.load_texture(path.as_ref());
        self.ok_or_warn(path.as_ref(), result)
    }

    pub fn load_mesh_or_warn(&mut self, path: impl AsRef<Path>, color: u32) -> Option<PolygonMesh> {
        let result = self.load_mesh(path.as_ref(), color);
        self.ok_or_warn(path.as_ref(), result)
    }

    /// Logs a failed load once per path and turns it into `None`.
    fn ok_or_warn<T>(&mut self, path: &Path, result: Result<T, ResourceError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if self.warned.insert(path.to_path_buf()) {
                    log::warn!("resource unavailable: {}", err);
                }
                None
            }
        }
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::colors::{BLACK, BLUE, RED};
    use crate::logging::{init_logging, LoggingConfig};

    fn engine() -> Engine {
        init_logging(LoggingConfig::for_tests());
        Engine::with_config(
            EngineConfig::default()
                .with_size(64, 64)
                .with_clear_color(BLACK)
                .with_workers(2),
        )
    }

    #[test]
    fn ids_come_from_the_injected_generator() {
        let mut engine = Engine::with_id_generator(EngineConfig::default(), IdGenerator::starting_at(100));
        assert_eq!(engine.create_circle(1.0).raw(), 100);
        assert_eq!(engine.create_cube(1.0, RED).raw(), 101);
    }

    #[test]
    fn add_routes_to_the_right_scene() {
        let mut engine = engine();
        let circle = engine.create_circle(3.0);
        let cube = engine.create_cube(1.0, RED);
        engine.add_item(circle, None).unwrap();
        engine.add_item(cube, None).unwrap();
        assert_eq!(engine.scene_2d().node_count(), 1);
        assert_eq!(engine.scene_3d().node_count(), 1);

        let stray = IdGenerator::starting_at(999).next_id();
        assert_eq!(engine.add_item(stray, None), Err(SceneError::UnknownItem(stray)));
        // 3D items cannot parent 2D ones.
        let orphan = engine.create_circle(1.0);
        assert_eq!(
            engine.add_item(orphan, Some(cube)),
            Err(SceneError::UnknownParent(cube))
        );
    }

    #[test]
    fn removing_a_parent_evicts_children() {
        let mut engine = engine();
        let a = engine.create_rectangle(Vec2::new(4.0, 4.0));
        let b = engine.create_rectangle(Vec2::new(2.0, 2.0));
        engine.add_item(a, None).unwrap();
        engine.add_item(b, Some(a)).unwrap();
        assert_eq!(engine.remove_item(a), 2);
        assert_eq!(engine.scene_2d().node_count(), 0);
        assert!(engine.primitive(b).is_some());
    }

    #[test]
    fn frame_draws_3d_under_2d() {
        let mut engine = engine();
        let cube = engine.create_cube(2.0, BLUE);
        engine.add_item(cube, None).unwrap();
        let dot = engine.create_circle(3.0);
        engine
            .primitive_mut(dot)
            .unwrap()
            .set_color(RED)
            .set_anchor(Vec2::HALF)
            .set_position(Vec2::new(32.0, 32.0));
        engine.add_item(dot, None).unwrap();

        let stats = engine.draw_frame();
        assert!(stats.mesh.fragments > 0);
        assert!(stats.fragments_2d > 0);
        assert_eq!(engine.surface().pixel(32, 32), Some(RED));
        assert_eq!(engine.surface().pixel(22, 32), Some(BLUE));
        assert_eq!(engine.surface().pixel(0, 0), Some(BLACK));

        let mut backend = MemoryBackend::new();
        backend.init(64, 64).unwrap();
        engine.present_frame(&mut backend).unwrap();
        assert_eq!(backend.pixel(32, 32), Some(RED));
    }

    #[test]
    fn shaders_see_engine_time() {
        let mut engine = engine();
        let id = engine.create_rectangle(Vec2::new(64.0, 64.0));
        engine
            .primitive_mut(id)
            .unwrap()
            .set_shader(Some(Arc::new(|_: Vec2, t: f32| if t >= 1.0 { RED } else { BLUE })));
        engine.add_item(id, None).unwrap();
        engine.draw_frame();
        assert_eq!(engine.surface().pixel(5, 5), Some(BLUE));
        engine.set_time(1.5);
        engine.draw_frame();
        assert_eq!(engine.surface().pixel(5, 5), Some(RED));
    }

    #[test]
    fn missing_resources_warn_and_continue() {
        let mut engine = engine();
        assert!(engine.load_texture_or_warn("does/not/exist.png").is_none());
        assert!(engine.load_font_or_warn("does/not/exist.ttf").is_none());
        assert!(engine.load_mesh_or_warn("does/not/exist.obj", RED).is_none());
        assert!(engine.load_font("does/not/exist.ttf").is_err());
    }

    #[test]
    fn resize_updates_surface_and_aspect() {
        let mut engine = engine();
        engine.resize(200, 100);
        assert_eq!((engine.width(), engine.height()), (200, 100));
        approx::assert_relative_eq!(engine.camera().projection().aspect_ratio(), 2.0);
    }
}
