//! Renders a demo scene.
//!
//! Headless by default: `rasterkit [OUTPUT.png]` draws one frame and writes
//! it to disk (`frame.png` when no path is given). Built with the `sdl`
//! feature, `rasterkit --window` opens an animated window instead.

use std::sync::Arc;

use rasterkit::prelude::*;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn build_scene(engine: &mut Engine) -> Result<Vec<ItemId>> {
    let cube = engine.create_cube(2.0, colors::rgb(40, 120, 220));
    {
        let cube = engine
            .primitive3d_mut(cube)
            .ok_or(SceneError::UnknownItem(cube))?;
        cube.set_rotation(Vec3::new(0.5, 0.6, 0.0));
        cube.set_vertex_color(0, colors::RED);
        cube.set_vertex_color(4, colors::GREEN);
    }
    engine.add_item(cube, None)?;

    let panel = engine.create_rectangle(Vec2::new(220.0, 160.0));
    engine
        .primitive_mut(panel)
        .ok_or(SceneError::UnknownItem(panel))?
        .set_color(colors::argb(0xA0, 20, 20, 30))
        .set_position(Vec2::new(20.0, 20.0))
        .set_depth(10);
    engine.add_item(panel, None)?;

    // Children of the panel move with it.
    let ring = engine.create_ellipse(Vec2::new(40.0, 25.0), 6.0, false);
    engine
        .primitive_mut(ring)
        .ok_or(SceneError::UnknownItem(ring))?
        .set_color(colors::rgb(250, 200, 40))
        .set_anchor(Vec2::HALF)
        .set_position(Vec2::new(60.0, 50.0))
        .set_rotation(0.3);
    engine.add_item(ring, Some(panel))?;

    let label = engine.create_text("RASTER", Arc::new(block_font("AERST")), 24.0);
    engine
        .primitive_mut(label)
        .ok_or(SceneError::UnknownItem(label))?
        .set_smoothing(0.75)
        .set_position(Vec2::new(12.0, 110.0));
    engine.add_item(label, Some(panel))?;

    let path = engine.create_polyline(
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(120.0, 60.0),
            Vec2::new(200.0, 0.0),
            Vec2::new(280.0, 80.0),
        ],
        10.0,
    );
    engine
        .primitive_mut(path)
        .ok_or(SceneError::UnknownItem(path))?
        .set_color(colors::rgb(230, 80, 120))
        .set_position(Vec2::new(480.0, 40.0))
        .edit_shape(|shape| {
            if let Shape2D::Polyline(line) = shape {
                line.rounded_joins = true;
            }
        });
    engine.add_item(path, None)?;

    let frame = Component::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(140.0, 0.0),
        Vec2::new(140.0, 100.0),
        Vec2::new(0.0, 100.0),
    ])
    .with_hole(vec![
        Vec2::new(30.0, 30.0),
        Vec2::new(30.0, 70.0),
        Vec2::new(110.0, 70.0),
        Vec2::new(110.0, 30.0),
    ]);
    let window = engine.create_polygon(vec![frame]);
    engine
        .primitive_mut(window)
        .ok_or(SceneError::UnknownItem(window))?
        .set_color(colors::rgb(90, 200, 120))
        .set_position(Vec2::new(40.0, 420.0));
    engine.add_item(window, None)?;

    let checker = Texture::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            colors::WHITE
        } else {
            colors::BLACK
        }
    })
    .map(Arc::new);
    let bitmap = engine.create_bitmap(Vec2::new(96.0, 96.0), checker);
    engine
        .primitive_mut(bitmap)
        .ok_or(SceneError::UnknownItem(bitmap))?
        .set_position(Vec2::new(640.0, 460.0));
    engine.add_item(bitmap, None)?;

    let pulse = engine.create_circle(50.0);
    engine
        .primitive_mut(pulse)
        .ok_or(SceneError::UnknownItem(pulse))?
        .set_anchor(Vec2::HALF)
        .set_position(Vec2::new(400.0, 480.0))
        .set_shader(Some(Arc::new(|uv: Vec2, time: f32| {
            let wave = ((uv.x * 6.0 + time).sin() * 0.5 + 0.5) * 255.0;
            colors::argb(0xFF, wave as u8, 64, 255 - wave as u8)
        })));
    engine.add_item(pulse, None)?;

    Ok(vec![cube, ring])
}

fn render_png(path: &str) -> Result<()> {
    let mut engine = Engine::new(WIDTH, HEIGHT);
    build_scene(&mut engine)?;

    let mut backend = MemoryBackend::new();
    backend.init(WIDTH, HEIGHT)?;

    let stats = engine.draw_frame();
    log::info!(
        "drew {} triangles ({} culled, {} clipped), {} 2d fragments",
        stats.mesh.triangles,
        stats.mesh.culled,
        stats.mesh.clipped,
        stats.fragments_2d
    );
    engine.present_frame(&mut backend)?;
    backend.save(path)?;
    Ok(())
}

#[cfg(feature = "sdl")]
fn run_window() -> Result<()> {
    use std::time::Instant;

    let mut backend = SdlBackend::new("rasterkit", WIDTH, HEIGHT)?;
    let mut engine = Engine::new(WIDTH, HEIGHT);
    let animated = build_scene(&mut engine)?;
    let start = Instant::now();

    loop {
        match backend.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) => {
                engine.resize(w, h);
                backend.resize(w, h)?;
            }
            WindowEvent::None => {}
        }

        engine.set_time(start.elapsed().as_secs_f32());
        if let Some(cube) = engine.primitive3d_mut(animated[0]) {
            cube.rotate(Vec3::new(0.01, 0.013, 0.0));
        }
        if let Some(ring) = engine.primitive_mut(animated[1]) {
            ring.rotate(0.02);
        }

        engine.draw_frame();
        engine.present_frame(&mut backend)?;
    }
    Ok(())
}

fn main() {
    init_logging(LoggingConfig::default());

    let arg = std::env::args().nth(1);
    let result = match arg.as_deref() {
        #[cfg(feature = "sdl")]
        Some("--window") => run_window(),
        Some(path) => render_png(path),
        None => render_png("frame.png"),
    };

    if let Err(err) = result {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
