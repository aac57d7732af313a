//! Implicit-surface ellipse fill.
//!
//! Every pixel centre of the screen bounds is mapped back into the ellipse's
//! local frame (centred on the origin) with the inverse transform and tested
//! against the normalized equation
//!
//! ```text
//! (x / rx)^2 + (y / ry)^2 <= 1
//! ```
//!
//! Outlines use two radii, `r + t/2` outside and `r - t/2` inside, so the ring
//! straddles the nominal radius.

use super::emit;
use super::fragment::{Fragment, PixelShader};
use crate::colors::BlendMode;
use crate::math::{invert_affine, Aabb2, Mat3, Vec2};
use crate::render::framebuffer::{PixelRect, PixelTarget};

#[inline]
fn normalized_distance(p: Vec2, radius: Vec2) -> f32 {
    let x = p.x / radius.x;
    let y = p.y / radius.y;
    x * x + y * y
}

/// Coverage test in local space. Boundaries are inclusive on both radii.
pub fn ellipse_covers(local: Vec2, radius: Vec2, thickness: f32, filled: bool) -> bool {
    let half = thickness.max(0.0) * 0.5;
    let outer = radius + Vec2::splat(half);
    if outer.x <= 0.0 || outer.y <= 0.0 || normalized_distance(local, outer) > 1.0 {
        return false;
    }
    if filled {
        return true;
    }
    let inner = radius - Vec2::splat(half);
    inner.x <= 0.0 || inner.y <= 0.0 || normalized_distance(local, inner) >= 1.0
}

/// An ellipse placed on screen, ready to fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFill {
    radius: Vec2,
    thickness: f32,
    filled: bool,
    inverse: Mat3,
    bounds: Aabb2,
}

impl EllipseFill {
    /// Returns `None` for a non-positive radius or a singular transform;
    /// neither covers any pixel.
    pub fn new(radius: Vec2, thickness: f32, filled: bool, transform: &Mat3) -> Option<Self> {
        if radius.x <= 0.0 || radius.y <= 0.0 {
            return None;
        }
        let inverse = invert_affine(transform)?;
        let reach = radius + Vec2::splat(thickness.max(0.0) * 0.5);
        Some(Self {
            radius,
            thickness,
            filled,
            inverse,
            bounds: Aabb2::new(-reach, reach).transformed(transform),
        })
    }

    /// Screen-space bounds of the outer radius.
    pub fn bounds(&self) -> Aabb2 {
        self.bounds
    }

    #[inline]
    pub fn covers(&self, screen: Vec2) -> bool {
        let local = self.inverse.transform_point(screen);
        ellipse_covers(local, self.radius, self.thickness, self.filled)
    }
}

/// Fills the part of `ellipse` inside `region` at a constant depth.
pub fn fill_region<T, S>(
    target: &mut T,
    ellipse: &EllipseFill,
    region: PixelRect,
    depth: f32,
    shader: &S,
    blend: BlendMode,
) -> usize
where
    T: PixelTarget + ?Sized,
    S: PixelShader + ?Sized,
{
    let region = region
        .intersect(&PixelRect::covering(&ellipse.bounds))
        .intersect(&target.bounds());

    let mut emitted = 0;
    for y in region.y0..region.y1 {
        for x in region.x0..region.x1 {
            let fragment = Fragment {
                x,
                y,
                weights: [1.0, 0.0, 0.0],
                depth,
                coverage: 1.0,
            };
            if ellipse.covers(fragment.center()) && emit(target, &fragment, shader, blend) {
                emitted += 1;
            }
        }
    }
    emitted
}
