//! Headless backend that keeps the last presented frame in memory.

use std::path::Path;

use super::RenderBackend;
use crate::colors;
use crate::error::BackendError;
use crate::render::Surface;

#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
    initialized: bool,
    frames_presented: u64,
    has_frame: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// The last presented frame, if any.
    pub fn frame(&self) -> Option<&[u32]> {
        self.has_frame.then_some(self.pixels.as_slice())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.frame().map(|f| f[(y * self.width + x) as usize])
    }

    pub fn to_rgba_image(&self) -> Result<image::RgbaImage, BackendError> {
        let frame = self.frame().ok_or(BackendError::NoFrame)?;
        Ok(image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [a, r, g, b] = colors::channels(frame[(y * self.width + x) as usize]);
            image::Rgba([r, g, b, a])
        }))
    }

    /// Writes the last frame as an image; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        let path = path.as_ref();
        self.to_rgba_image()?.save(path)?;
        log::info!("saved {}x{} frame to {}", self.width, self.height, path.display());
        Ok(())
    }
}

impl RenderBackend for MemoryBackend {
    fn init(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.width = width;
        self.height = height;
        self.pixels = vec![colors::TRANSPARENT; (width * height) as usize];
        self.initialized = true;
        self.has_frame = false;
        Ok(())
    }

    fn present(&mut self, surface: &Surface) -> Result<(), BackendError> {
        if !self.initialized {
            return Err(BackendError::Init("present before init".into()));
        }
        if (surface.width(), surface.height()) != (self.width, self.height) {
            return Err(BackendError::Present(format!(
                "surface is {}x{}, backend expects {}x{}",
                surface.width(),
                surface.height(),
                self.width,
                self.height
            )));
        }
        self.pixels.copy_from_slice(surface.pixels());
        self.has_frame = true;
        self.frames_presented += 1;
        Ok(())
    }

    fn clear_frame_buffer(&mut self, color: u32) -> Result<(), BackendError> {
        self.pixels.fill(color);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.init(width, height)
    }
}
