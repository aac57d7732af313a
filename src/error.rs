//! Error types.
//!
//! Geometry problems never error: degenerate input draws nothing. Errors are
//! reserved for scene misuse, resource loading and backend failures.

use std::path::PathBuf;

use thiserror::Error;

use crate::scene::ItemId;

/// Misuse of the scene graph API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("item {0} is not registered")]
    UnknownItem(ItemId),
    #[error("parent {0} is not attached to the scene")]
    UnknownParent(ItemId),
}

/// Failure to load a font, image or mesh.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font: {0}")]
    Font(#[from] ttf_parser::FaceParsingError),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to load OBJ {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("{} contains no triangles", path.display())]
    EmptyMesh { path: PathBuf },
}

/// Failure inside a render backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend initialization failed: {0}")]
    Init(String),
    #[error("present failed: {0}")]
    Present(String),
    #[error("no frame has been presented yet")]
    NoFrame,
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
