//! Rendering: pixel storage, rasterizers, shaders and the per-frame passes.

pub mod framebuffer;
pub mod pass2d;
pub mod pass3d;
pub mod rasterizer;
pub mod shader;
pub mod surface;

pub use framebuffer::{FrameBuffer, PixelRect, PixelTarget, Tile};
pub use pass3d::MeshStats;
pub use rasterizer::Rasterizer;
pub use shader::Shader;
pub use surface::{Surface, CLEAR_DEPTH};
