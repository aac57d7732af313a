//! 3x3 matrix used as a 2D affine transform.
//!
//! Same convention as [`Mat4`](super::mat4::Mat4): column vectors on the right,
//! translation in the last column, bottom row fixed at `[0, 0, 1]` for every
//! affine matrix produced by this module.
//!
//! ```text
//! | a  b  tx |   | x |
//! | c  d  ty | * | y |
//! | 0  0  1  |   | 1 |
//! ```

use std::ops::Mul;

use super::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    data: [[f32; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const fn new(data: [[f32; 3]; 3]) -> Self {
        Self { data }
    }

    pub fn translation(offset: Vec2) -> Self {
        Self::new([[1.0, 0.0, offset.x], [0.0, 1.0, offset.y], [0.0, 0.0, 1.0]])
    }

    pub fn scaling(scale: Vec2) -> Self {
        Self::new([[scale.x, 0.0, 0.0], [0.0, scale.y, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotation by `angle` radians. Positive angles turn +x towards +y, which is
    /// clockwise on a y-down screen.
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }

    /// Transform a point (w = 1).
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.data;
        Vec2::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2],
        )
    }

    /// Transform a direction (w = 0), ignoring translation.
    #[inline]
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        let m = &self.data;
        Vec2::new(m[0][0] * v.x + m[0][1] * v.y, m[1][0] * v.x + m[1][1] * v.y)
    }

    /// Determinant of the linear 2x2 part.
    pub fn linear_determinant(&self) -> f32 {
        let m = &self.data;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    /// Geometric mean of the axis scale factors, used to scale stroke widths.
    pub fn mean_scale(&self) -> f32 {
        self.linear_determinant().abs().sqrt()
    }

    pub fn translation_part(&self) -> Vec2 {
        Vec2::new(self.data[0][2], self.data[1][2])
    }
}

/// Inverts an affine transform.
///
/// Returns `None` when the linear part is singular (zero area scale).
pub fn invert_affine(m: &Mat3) -> Option<Mat3> {
    let det = m.linear_determinant();
    if det.abs() < f32::EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let d = &m.data;

    let a = d[1][1] * inv_det;
    let b = -d[0][1] * inv_det;
    let c = -d[1][0] * inv_det;
    let e = d[0][0] * inv_det;
    let tx = -(a * d[0][2] + b * d[1][2]);
    let ty = -(c * d[0][2] + e * d[1][2]);

    Some(Mat3::new([[a, b, tx], [c, e, ty], [0.0, 0.0, 1.0]]))
}

impl Mul<Mat3> for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let mut result = [[0.0f32; 3]; 3];
        for (row, out) in result.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = self.data[row][0] * rhs.data[0][col]
                    + self.data[row][1] * rhs.data[1][col]
                    + self.data[row][2] * rhs.data[2][col];
            }
        }
        Mat3::new(result)
    }
}

impl Mul<Vec2> for Mat3 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Vec2 {
        self.transform_point(rhs)
    }
}

impl approx::AbsDiffEq for Mat3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.data
            .iter()
            .flatten()
            .zip(other.data.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_quarter_turn() {
        let p = Mat3::rotation(FRAC_PI_2) * Vec2::RIGHT;
        assert_abs_diff_eq!(p, Vec2::UP, epsilon = 1e-6);
    }

    #[test]
    fn composition_applies_right_first() {
        let m = Mat3::translation(Vec2::new(10.0, 0.0)) * Mat3::scaling(Vec2::splat(2.0));
        assert_eq!(m * Vec2::ONE, Vec2::new(12.0, 2.0));
    }

    #[test]
    fn invert_affine_round_trip() {
        let transforms = [
            Mat3::IDENTITY,
            Mat3::translation(Vec2::new(-3.5, 12.0)),
            Mat3::translation(Vec2::new(40.0, 25.0))
                * Mat3::rotation(0.7)
                * Mat3::scaling(Vec2::new(2.0, 0.5))
                * Mat3::translation(Vec2::new(-5.0, -5.0)),
            Mat3::rotation(-2.1) * Mat3::scaling(Vec2::new(-1.0, 3.0)),
        ];
        for t in transforms {
            let inv = invert_affine(&t).expect("invertible");
            assert_abs_diff_eq!(inv * t, Mat3::IDENTITY, epsilon = 1e-5);
            assert_abs_diff_eq!(t * inv, Mat3::IDENTITY, epsilon = 1e-5);
        }
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(invert_affine(&Mat3::scaling(Vec2::new(0.0, 1.0))).is_none());
    }
}
