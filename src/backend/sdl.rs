//! Windowed backend: streams each frame into an SDL texture.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};

use super::RenderBackend;
use crate::colors;
use crate::error::BackendError;
use crate::render::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
}

fn init_error(e: impl ToString) -> BackendError {
    BackendError::Init(e.to_string())
}

fn present_error(e: impl ToString) -> BackendError {
    BackendError::Present(e.to_string())
}

pub struct SdlBackend {
    // Field order matters: the texture must drop before its creator.
    texture: Option<Texture<'static>>,
    texture_creator: Box<TextureCreator<WindowContext>>,
    canvas: Canvas<Window>,
    event_pump: sdl2::EventPump,
    width: u32,
    height: u32,
}

impl SdlBackend {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, BackendError> {
        let sdl_context = sdl2::init().map_err(init_error)?;
        let video_subsystem = sdl_context.video().map_err(init_error)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(init_error)?;

        let canvas = window.into_canvas().build().map_err(init_error)?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump().map_err(init_error)?;

        let mut backend = Self {
            texture: None,
            texture_creator,
            canvas,
            event_pump,
            width,
            height,
        };
        backend.init(width, height)?;
        Ok(backend)
    }

    pub fn poll_events(&mut self) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => return WindowEvent::Resize(w as u32, h as u32),
                _ => {}
            }
        }
        WindowEvent::None
    }
}

impl RenderBackend for SdlBackend {
    fn init(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.texture = None;
        // SAFETY: texture_creator is boxed, never replaced, and declared after
        // texture, so it outlives every texture created from it.
        let creator: &'static TextureCreator<WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        let texture = creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(init_error)?;
        self.texture = Some(texture);
        self.width = width;
        self.height = height;
        log::debug!("sdl backend ready at {}x{}", width, height);
        Ok(())
    }

    fn present(&mut self, surface: &Surface) -> Result<(), BackendError> {
        let texture = self
            .texture
            .as_mut()
            .ok_or_else(|| BackendError::Init("no streaming texture".into()))?;
        texture
            .update(None, &surface.to_argb_bytes(), (self.width * 4) as usize)
            .map_err(present_error)?;

        self.canvas.clear();
        self.canvas
            .copy(texture, None, Some(Rect::new(0, 0, self.width, self.height)))
            .map_err(present_error)?;
        self.canvas.present();
        Ok(())
    }

    fn clear_frame_buffer(&mut self, color: u32) -> Result<(), BackendError> {
        let [a, r, g, b] = colors::channels(color);
        self.canvas.set_draw_color(sdl2::pixels::Color::RGBA(r, g, b, a));
        self.canvas.clear();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.init(width, height)
    }
}
