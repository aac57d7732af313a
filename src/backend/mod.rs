//! Where finished frames go.
//!
//! The engine only needs a narrow contract from a backend: prepare for a
//! size, take a finished [`Surface`], and do any end-of-frame bookkeeping.

mod memory;
#[cfg(feature = "sdl")]
mod sdl;

pub use memory::MemoryBackend;
#[cfg(feature = "sdl")]
pub use sdl::{SdlBackend, WindowEvent};

use crate::error::BackendError;
use crate::render::Surface;

pub trait RenderBackend {
    /// Prepares the backend for frames of `width x height`.
    fn init(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Shows or stores the finished frame.
    fn present(&mut self, surface: &Surface) -> Result<(), BackendError>;

    /// End-of-frame bookkeeping, called after every `present`.
    fn clear(&mut self) {
        self.clear_palette();
    }

    /// Fills the backend's own target with `color`.
    fn clear_frame_buffer(&mut self, color: u32) -> Result<(), BackendError>;

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Drops cached per-frame resources (color palettes, glyph atlases).
    fn clear_palette(&mut self) {}
}
