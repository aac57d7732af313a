//! A CPU software rasterizer for 2D vector primitives and simple 3D meshes.
//!
//! Everything is drawn on the CPU into an owned ARGB surface. Backends only
//! display or export the finished frame: [`backend::MemoryBackend`] keeps it
//! in memory (and can write a PNG), the optional `sdl` feature adds a window.
//!
//! # Quick Start
//!
//! ```ignore
//! use rasterkit::prelude::*;
//!
//! let mut engine = Engine::new(320, 240);
//! let circle = engine.create_circle(40.0);
//! engine.add_item(circle, None)?;
//! engine.draw_frame();
//!
//! let mut backend = MemoryBackend::new();
//! backend.init(320, 240)?;
//! engine.present_frame(&mut backend)?;
//! backend.save("frame.png")?;
//! ```

// Public API - exposed to library consumers
pub mod backend;
pub mod camera;
pub mod colors;
pub mod engine;
pub mod error;
pub mod logging;
pub mod math;
pub mod primitive;
pub mod render;
pub mod scene;
pub mod text;
pub mod texture;
pub mod transform;
pub mod triangulate;

// Re-export commonly needed types at crate root for convenience
pub use engine::{Engine, EngineConfig, FrameStats};
pub use error::{BackendError, EngineError, ResourceError, Result, SceneError};
pub use scene::ItemId;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use rasterkit::prelude::*;
/// ```
pub mod prelude {
    // Engine
    pub use crate::engine::{Engine, EngineConfig, FrameStats};
    pub use crate::error::{EngineError, Result, SceneError};

    // Scene
    pub use crate::scene::{IdGenerator, ItemId, SceneGraph};

    // Primitives
    pub use crate::primitive::{
        Component, Contour, PolygonMesh, Polyline, Primitive2D, Primitive3D, Shape2D, TextShape,
    };
    pub use crate::text::{block_font, GlyphSource, TtfFont};
    pub use crate::texture::Texture;

    // Camera
    pub use crate::camera::{Camera, Projection};

    // Math
    pub use crate::math::{Aabb2, Aabb3, Mat3, Mat4, Obb, Vec2, Vec3, Vec4};

    // Rendering
    pub use crate::colors::{self, BlendMode};
    pub use crate::render::{Rasterizer, Shader, Surface};

    // Backends
    pub use crate::backend::{MemoryBackend, RenderBackend};
    #[cfg(feature = "sdl")]
    pub use crate::backend::{SdlBackend, WindowEvent};

    // Logging
    pub use crate::logging::{init_logging, LoggingConfig};
}
