use super::Vec2;

/// 2×3 affine transform.
///
/// Maps `(x, y)` to `(m00·x + m01·y + m02, m10·x + m11·y + m12)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine {
    pub m00: f32,
    pub m01: f32,
    pub m02: f32,
    pub m10: f32,
    pub m11: f32,
    pub m12: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0);

    #[inline]
    pub const fn new(m00: f32, m01: f32, m02: f32, m10: f32, m11: f32, m12: f32) -> Self {
        Self { m00, m01, m02, m10, m11, m12 }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.rows().iter().flatten().all(|v| v.is_finite())
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * p.x + self.m01 * p.y + self.m02,
            self.m10 * p.x + self.m11 * p.y + self.m12,
        )
    }

    /// Returns the inverse transform, or `None` when the linear part is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let m00 = self.m11 * inv;
        let m01 = -self.m01 * inv;
        let m10 = -self.m10 * inv;
        let m11 = self.m00 * inv;
        let inverse = Affine {
            m00,
            m01,
            m02: -(m00 * self.m02 + m01 * self.m12),
            m10,
            m11,
            m12: -(m10 * self.m02 + m11 * self.m12),
        };
        inverse.is_finite().then_some(inverse)
    }

    /// Rows padded to `vec4` for uniform upload.
    #[inline]
    pub fn rows(&self) -> [[f32; 4]; 2] {
        [
            [self.m00, self.m01, self.m02, 0.0],
            [self.m10, self.m11, self.m12, 0.0],
        ]
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn invert_round_trips_a_point() {
        let m = Affine::new(2.0, 0.5, 10.0, -0.25, 3.0, -4.0);
        let inv = m.invert().unwrap();
        let p = Vec2::new(7.0, -3.0);
        assert!(close(inv.apply(m.apply(p)), p));
    }

    #[test]
    fn singular_has_no_inverse() {
        let m = Affine::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0);
        assert!(m.invert().is_none());
    }

    #[test]
    fn non_finite_is_detected() {
        let m = Affine::new(f32::NAN, 0.0, 0.0, 0.0, 1.0, 0.0);
        assert!(!m.is_finite());
        assert!(Affine::IDENTITY.is_finite());
    }
}
