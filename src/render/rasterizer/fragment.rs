//! Fragments and the pixel shaders that color them.
//!
//! The rasterizers decide *which* pixels are covered; a [`PixelShader`]
//! decides *what color* each covered pixel gets. This mirrors the split
//! between a GPU's fixed-function rasterizer and its fragment stage.

use crate::colors::{pack_color, unpack_color};
use crate::math::Vec2;

/// A covered pixel handed to a [`PixelShader`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    /// Barycentric weights for triangle fills; `[1, 0, 0]` for other shapes.
    pub weights: [f32; 3],
    pub depth: f32,
    /// Fraction of the pixel inside the shape, `1.0` for aliased fills. The
    /// rasterizer multiplies the shaded alpha by it.
    pub coverage: f32,
}

impl Fragment {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

/// Per-pixel color computation. `None` discards the fragment.
///
/// Shaders run on worker threads during tiled fills, hence `Sync`.
pub trait PixelShader: Sync {
    fn shade(&self, fragment: &Fragment) -> Option<u32>;
}

impl<F> PixelShader for F
where
    F: Fn(&Fragment) -> Option<u32> + Sync,
{
    #[inline]
    fn shade(&self, fragment: &Fragment) -> Option<u32> {
        self(fragment)
    }
}

/// Returns a constant color for every pixel.
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _fragment: &Fragment) -> Option<u32> {
        Some(self.color)
    }
}

/// Perspective-correct barycentric weights.
///
/// Screen-space weights are divided by each vertex's clip `w` and
/// renormalized, which undoes the perspective divide for attributes.
#[inline]
pub fn perspective_weights(weights: [f32; 3], inv_w: [f32; 3]) -> [f32; 3] {
    let scaled = [
        weights[0] * inv_w[0],
        weights[1] * inv_w[1],
        weights[2] * inv_w[2],
    ];
    let sum = scaled[0] + scaled[1] + scaled[2];
    if sum.abs() <= f32::EPSILON {
        return weights;
    }
    [scaled[0] / sum, scaled[1] / sum, scaled[2] / sum]
}

/// Interpolates per-vertex colors with perspective correction.
pub struct VertexColorShader {
    /// Unpacked RGBA per vertex, in `[0, 1]`.
    colors: [(f32, f32, f32, f32); 3],
    inv_w: [f32; 3],
}

impl VertexColorShader {
    /// `w` is each vertex's clip-space `w`; pass `[1.0; 3]` for affine
    /// interpolation.
    pub fn new(vertex_colors: [u32; 3], w: [f32; 3]) -> Self {
        Self {
            colors: vertex_colors.map(unpack_color),
            inv_w: w.map(|w| 1.0 / w),
        }
    }
}

impl PixelShader for VertexColorShader {
    #[inline]
    fn shade(&self, fragment: &Fragment) -> Option<u32> {
        let l = perspective_weights(fragment.weights, self.inv_w);
        let c = &self.colors;
        Some(pack_color(
            l[0] * c[0].0 + l[1] * c[1].0 + l[2] * c[2].0,
            l[0] * c[0].1 + l[1] * c[1].1 + l[2] * c[2].1,
            l[0] * c[0].2 + l[1] * c[1].2 + l[2] * c[2].2,
            l[0] * c[0].3 + l[1] * c[1].3 + l[2] * c[2].3,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLUE, RED};
    use approx::assert_relative_eq;

    fn at(weights: [f32; 3]) -> Fragment {
        Fragment {
            x: 0,
            y: 0,
            weights,
            depth: 0.0,
            coverage: 1.0,
        }
    }

    #[test]
    fn equal_w_is_affine() {
        let l = perspective_weights([0.2, 0.3, 0.5], [0.5; 3]);
        assert_relative_eq!(l[0], 0.2, epsilon = 1e-6);
        assert_relative_eq!(l[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn far_vertex_loses_weight() {
        // Screen midpoint between a near (w=1) and far (w=3) vertex sits at
        // a quarter of the way in 3D.
        let l = perspective_weights([0.5, 0.5, 0.0], [1.0, 1.0 / 3.0, 1.0]);
        assert_relative_eq!(l[0], 0.75, epsilon = 1e-6);
        assert_relative_eq!(l[1], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn vertex_colors_at_corners() {
        let shader = VertexColorShader::new([RED, BLUE, BLUE], [1.0, 2.0, 4.0]);
        assert_eq!(shader.shade(&at([1.0, 0.0, 0.0])), Some(RED));
        assert_eq!(shader.shade(&at([0.0, 0.0, 1.0])), Some(BLUE));
    }

    #[test]
    fn closures_are_shaders() {
        let discard_left = |f: &Fragment| (f.x > 0).then_some(RED);
        assert_eq!(discard_left.shade(&at([1.0, 0.0, 0.0])), None);
    }
}
