//! User-facing shaders.
//!
//! A [`Shader`] colors a primitive from a normalized `uv` coordinate and the
//! engine clock. Adapters turn it into a rasterizer [`PixelShader`]:
//!
//! - [`ShaderAdapter`] derives `uv` for 2D primitives from their oriented
//!   bounding box in screen space.
//! - [`MeshShaderAdapter`] uses perspective-correct barycentrics `(l1, l2)`
//!   for 3D triangles.
//! - [`TextureShader`] samples a bitmap through the same oriented box.

use super::rasterizer::{perspective_weights, Fragment, PixelShader};
use crate::colors::{pack_color, unpack_color, WHITE};
use crate::math::{Obb, Vec2};
use crate::texture::Texture;

pub trait Shader: Send + Sync {
    /// ARGB color at `uv` in `[0, 1]^2`; `time` is in seconds.
    fn shade(&self, uv: Vec2, time: f32) -> u32;
}

impl<F> Shader for F
where
    F: Fn(Vec2, f32) -> u32 + Send + Sync,
{
    #[inline]
    fn shade(&self, uv: Vec2, time: f32) -> u32 {
        self(uv, time)
    }
}

/// Runs a [`Shader`] over a 2D primitive.
pub struct ShaderAdapter<'a> {
    shader: &'a dyn Shader,
    bounds: Obb,
    time: f32,
}

impl<'a> ShaderAdapter<'a> {
    /// `bounds` is the primitive's oriented box in screen space.
    pub fn new(shader: &'a dyn Shader, bounds: Obb, time: f32) -> Self {
        Self {
            shader,
            bounds,
            time,
        }
    }
}

impl PixelShader for ShaderAdapter<'_> {
    #[inline]
    fn shade(&self, fragment: &Fragment) -> Option<u32> {
        let uv = self.bounds.uv(fragment.center());
        Some(self.shader.shade(uv, self.time))
    }
}

/// Runs a [`Shader`] over a projected 3D triangle.
pub struct MeshShaderAdapter<'a> {
    shader: &'a dyn Shader,
    inv_w: [f32; 3],
    time: f32,
}

impl<'a> MeshShaderAdapter<'a> {
    pub fn new(shader: &'a dyn Shader, w: [f32; 3], time: f32) -> Self {
        Self {
            shader,
            inv_w: w.map(|w| 1.0 / w),
            time,
        }
    }
}

impl PixelShader for MeshShaderAdapter<'_> {
    #[inline]
    fn shade(&self, fragment: &Fragment) -> Option<u32> {
        let [_, l1, l2] = perspective_weights(fragment.weights, self.inv_w);
        Some(self.shader.shade(Vec2::new(l1, l2), self.time))
    }
}

/// Samples a texture across a bitmap primitive, tinted by its color.
pub struct TextureShader<'a> {
    texture: &'a Texture,
    bounds: Obb,
    tint: u32,
}

impl<'a> TextureShader<'a> {
    pub fn new(texture: &'a Texture, bounds: Obb, tint: u32) -> Self {
        Self {
            texture,
            bounds,
            tint,
        }
    }
}

impl PixelShader for TextureShader<'_> {
    #[inline]
    fn shade(&self, fragment: &Fragment) -> Option<u32> {
        let texel = self.texture.sample(self.bounds.uv(fragment.center()));
        if self.tint == WHITE {
            return Some(texel);
        }
        let (r, g, b, a) = unpack_color(texel);
        let (tr, tg, tb, ta) = unpack_color(self.tint);
        Some(pack_color(r * tr, g * tg, b * tb, a * ta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{BLUE, RED};
    use crate::math::{Aabb2, Mat3};

    fn fragment(x: i32, y: i32, weights: [f32; 3]) -> Fragment {
        Fragment {
            x,
            y,
            weights,
            depth: 0.0,
            coverage: 1.0,
        }
    }

    fn gradient(uv: Vec2, _time: f32) -> u32 {
        pack_color(uv.x, uv.y, 0.0, 1.0)
    }

    #[test]
    fn uv_follows_oriented_box() {
        let obb = Obb::from_rect(
            &Aabb2::from_size(Vec2::new(10.0, 10.0)),
            &Mat3::translation(Vec2::new(19.5, -0.5)),
        );
        let shader = gradient;
        let adapter = ShaderAdapter::new(&shader, obb, 0.0);
        // Pixel (24, 4) has its centre in the middle of the box.
        assert_eq!(adapter.shade(&fragment(24, 4, [1.0, 0.0, 0.0])), Some(pack_color(0.5, 0.5, 0.0, 1.0)));
    }

    #[test]
    fn time_is_forwarded() {
        let pulse = |_: Vec2, t: f32| if t > 1.0 { RED } else { BLUE };
        let obb = Obb::from_rect(&Aabb2::from_size(Vec2::ONE), &Mat3::IDENTITY);
        assert_eq!(ShaderAdapter::new(&pulse, obb, 2.0).shade(&fragment(0, 0, [1.0, 0.0, 0.0])), Some(RED));
        assert_eq!(ShaderAdapter::new(&pulse, obb, 0.0).shade(&fragment(0, 0, [1.0, 0.0, 0.0])), Some(BLUE));
    }

    #[test]
    fn mesh_uv_is_barycentric() {
        let shader = gradient;
        let adapter = MeshShaderAdapter::new(&shader, [2.0; 3], 0.0);
        assert_eq!(adapter.shade(&fragment(0, 0, [0.0, 1.0, 0.0])), Some(pack_color(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn tint_multiplies_channels() {
        let tex = Texture::from_pixels(1, 1, vec![WHITE]).unwrap();
        let obb = Obb::from_rect(&Aabb2::from_size(Vec2::ONE), &Mat3::IDENTITY);
        let shader = TextureShader::new(&tex, obb, RED);
        assert_eq!(shader.shade(&fragment(0, 0, [1.0, 0.0, 0.0])), Some(RED));
    }

    #[test]
    fn white_tint_samples_texels() {
        let tex = Texture::from_fn(2, 1, |x, _| if x == 0 { RED } else { BLUE }).unwrap();
        let obb = Obb::from_rect(&Aabb2::from_size(Vec2::new(2.0, 1.0)), &Mat3::IDENTITY);
        let shader = TextureShader::new(&tex, obb, WHITE);
        assert_eq!(shader.shade(&fragment(0, 0, [1.0, 0.0, 0.0])), Some(RED));
        assert_eq!(shader.shade(&fragment(1, 0, [1.0, 0.0, 0.0])), Some(BLUE));
    }
}
