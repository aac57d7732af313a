//! Geometry of 2D primitives.

use std::fmt;
use std::sync::Arc;

use super::polygon::{Component, Contour};
use crate::math::{Aabb2, Vec2};
use crate::text::{GlyphSource, TextLayout};
use crate::texture::Texture;

/// An open or closed stroke through a list of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub path: Contour,
    pub thickness: f32,
    pub rounded_joins: bool,
    pub closed: bool,
    /// Fill the interior of a closed path as well as stroking it.
    pub filled: bool,
}

impl Polyline {
    pub fn new(points: Vec<Vec2>, thickness: f32) -> Self {
        Self {
            path: Contour::new(points),
            thickness,
            rounded_joins: false,
            closed: false,
            filled: false,
        }
    }
}

/// A string rendered from a glyph source. The layout is rebuilt whenever the
/// text, font or size changes.
#[derive(Clone)]
pub struct TextShape {
    text: String,
    font: Arc<dyn GlyphSource>,
    size: f32,
    smoothing: f32,
    layout: TextLayout,
}

impl fmt::Debug for TextShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextShape")
            .field("text", &self.text)
            .field("size", &self.size)
            .field("smoothing", &self.smoothing)
            .field("contours", &self.layout.contours.len())
            .finish()
    }
}

impl TextShape {
    pub fn new(text: impl Into<String>, font: Arc<dyn GlyphSource>, size: f32) -> Self {
        let text = text.into();
        let layout = TextLayout::build(&text, font.as_ref(), size);
        Self {
            text,
            font,
            size,
            smoothing: 0.0,
            layout,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Edge smoothing radius in pixels; `0` renders aliased.
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn font(&self) -> &Arc<dyn GlyphSource> {
        &self.font
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.relayout();
    }

    pub(crate) fn set_size(&mut self, size: f32) {
        self.size = size;
        self.relayout();
    }

    pub(crate) fn set_font(&mut self, font: Arc<dyn GlyphSource>) {
        self.font = font;
        self.relayout();
    }

    pub(crate) fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.max(0.0);
    }

    fn relayout(&mut self) {
        self.layout = TextLayout::build(&self.text, self.font.as_ref(), self.size);
    }
}

/// The drawable kinds of 2D primitive, in local coordinates.
#[derive(Debug, Clone)]
pub enum Shape2D {
    Triangle {
        points: [Vec2; 3],
    },
    /// Axis-aligned box from the origin to `size`.
    Rectangle {
        size: Vec2,
    },
    /// Centred on the local origin. A circle has equal radii.
    Ellipse {
        radius: Vec2,
        thickness: f32,
        filled: bool,
    },
    Polyline(Polyline),
    Polygon {
        components: Vec<Component>,
    },
    Text(TextShape),
    /// A textured rectangle; without a texture it draws as a flat rectangle.
    Bitmap {
        size: Vec2,
        texture: Option<Arc<Texture>>,
    },
}

impl Shape2D {
    pub fn circle(radius: f32) -> Self {
        Shape2D::Ellipse {
            radius: Vec2::splat(radius),
            thickness: 0.0,
            filled: true,
        }
    }

    pub fn rectangle(width: f32, height: f32) -> Self {
        Shape2D::Rectangle {
            size: Vec2::new(width, height),
        }
    }

    pub fn polygon(outline: Vec<Vec2>) -> Self {
        Shape2D::Polygon {
            components: vec![Component::new(outline)],
        }
    }

    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape2D::Triangle { .. } => "triangle",
            Shape2D::Rectangle { .. } => "rectangle",
            Shape2D::Ellipse { .. } => "ellipse",
            Shape2D::Polyline(_) => "polyline",
            Shape2D::Polygon { .. } => "polygon",
            Shape2D::Text(_) => "text",
            Shape2D::Bitmap { .. } => "bitmap",
        }
    }

    /// Box of the bare geometry; the anchor is a fraction of this box.
    pub fn local_bounds(&self) -> Aabb2 {
        match self {
            Shape2D::Triangle { points } => Aabb2::from_points(points.iter()),
            Shape2D::Rectangle { size } | Shape2D::Bitmap { size, .. } => Aabb2::from_size(*size),
            Shape2D::Ellipse { radius, .. } => Aabb2::new(-*radius, *radius),
            Shape2D::Polyline(line) => line.path.bounds(),
            Shape2D::Polygon { components } => components
                .iter()
                .map(Component::bounds)
                .fold(Aabb2::EMPTY, |acc, b| acc.union(&b)),
            Shape2D::Text(text) => text.layout.bounds,
        }
    }

    /// Width of the outline drawn around the geometry, if any.
    pub fn stroke_width(&self) -> f32 {
        match self {
            Shape2D::Ellipse { thickness, .. } => thickness.max(0.0),
            Shape2D::Polyline(line) => line.thickness.max(0.0),
            Shape2D::Text(text) => text.smoothing * 2.0,
            _ => 0.0,
        }
    }

    /// Local box including half the stroke on every side.
    pub fn stroke_bounds(&self) -> Aabb2 {
        self.local_bounds().inflate(self.stroke_width() * 0.5)
    }
}
