//! Color packing and compositing.
//!
//! Colors are `u32` in ARGB8888 layout (`0xAARRGGBB`), the same layout the
//! backends upload. Alpha is straight (not premultiplied).

pub const TRANSPARENT: u32 = 0x0000_0000;
pub const BLACK: u32 = 0xFF00_0000;
pub const WHITE: u32 = 0xFFFF_FFFF;
pub const RED: u32 = 0xFFFF_0000;
pub const GREEN: u32 = 0xFF00_FF00;
pub const BLUE: u32 = 0xFF00_00FF;
pub const BACKGROUND: u32 = 0xFF1E_1E1E;

/// How a fragment is combined with the pixel already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Replace the destination pixel.
    Opaque,
    /// Source-over compositing with straight alpha.
    #[default]
    Alpha,
}

#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    argb(0xFF, r, g, b)
}

/// Splits a color into `[a, r, g, b]` bytes.
#[inline]
pub const fn channels(color: u32) -> [u8; 4] {
    [
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    ]
}

#[inline]
pub const fn alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

#[inline]
pub const fn with_alpha(color: u32, a: u8) -> u32 {
    (color & 0x00FF_FFFF) | ((a as u32) << 24)
}

/// Packs normalized RGBA floats into ARGB8888. Values are clamped to `[0, 1]`.
#[inline]
pub fn pack_color(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    argb(to_byte(a), to_byte(r), to_byte(g), to_byte(b))
}

/// Unpacks a color to normalized `(r, g, b, a)` floats.
#[inline]
pub fn unpack_color(color: u32) -> (f32, f32, f32, f32) {
    let [a, r, g, b] = channels(color);
    (
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    )
}

/// Multiplies the alpha channel by `factor` (clamped to `[0, 1]`).
#[inline]
pub fn scale_alpha(color: u32, factor: f32) -> u32 {
    if factor >= 1.0 {
        return color;
    }
    let a = alpha(color) as f32 * factor.max(0.0);
    with_alpha(color, (a + 0.5) as u8)
}

/// Multiplies RGB by `intensity`, keeping alpha.
pub fn modulate(color: u32, intensity: f32) -> u32 {
    let (r, g, b, a) = unpack_color(color);
    pack_color(r * intensity, g * intensity, b * intensity, a)
}

/// Weighted sum of three colors, used for barycentric attribute interpolation.
pub fn weighted_color(colors: [u32; 3], weights: [f32; 3]) -> u32 {
    let mut acc = [0.0f32; 4];
    for (color, w) in colors.iter().zip(weights) {
        let (r, g, b, a) = unpack_color(*color);
        acc[0] += r * w;
        acc[1] += g * w;
        acc[2] += b * w;
        acc[3] += a * w;
    }
    pack_color(acc[0], acc[1], acc[2], acc[3])
}

/// Source-over compositing of `src` onto `dst` with straight alpha.
///
/// A fully opaque source returns `src` exactly; a fully transparent one returns
/// `dst` unchanged.
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let [sa, sr, sg, sb] = channels(src);
    match sa {
        0xFF => return src,
        0 => return dst,
        _ => {}
    }
    let [da, dr, dg, db] = channels(dst);

    let src_a = sa as f32 / 255.0;
    let dst_a = da as f32 / 255.0 * (1.0 - src_a);
    let out_a = src_a + dst_a;
    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let mix = |s: u8, d: u8| ((s as f32 * src_a + d as f32 * dst_a) / out_a + 0.5) as u8;
    argb(
        (out_a * 255.0 + 0.5) as u8,
        mix(sr, dr),
        mix(sg, dg),
        mix(sb, db),
    )
}

/// Applies `mode` to produce the new destination pixel.
#[inline]
pub fn composite(src: u32, dst: u32, mode: BlendMode) -> u32 {
    match mode {
        BlendMode::Opaque => src,
        BlendMode::Alpha => blend_over(src, dst),
    }
}
