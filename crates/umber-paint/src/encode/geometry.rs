use crate::coords::{Affine, Vec2};
use crate::paint::RadialGradient;

/// Plane equation projecting device space onto the gradient axis:
/// `t = a·x + b·y + c`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearProjection {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl LinearProjection {
    /// Solves for the projection with `t(p0) = 0`, `t(p1) = 1` and `t` constant
    /// along `p0 → p3`.
    ///
    /// Returns `None` for collinear points, and when the determinant or any
    /// coefficient does not fit in `f32`.
    pub fn from_points(p0: Vec2, p1: Vec2, p3: Vec2) -> Option<Self> {
        let u = p1 - p0;
        let v = p3 - p0;
        let det = u.cross(v);
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let a = v.y / det;
        let b = -v.x / det;
        let c = -(a * p0.x + b * p0.y);
        (a.is_finite() && b.is_finite() && c.is_finite()).then_some(Self { a, b, c })
    }

    #[inline]
    pub fn eval(&self, p: Vec2) -> f32 {
        self.a * p.x + self.b * p.y + self.c
    }

    #[inline]
    pub fn to_vec4(self) -> [f32; 4] {
        [self.a, self.b, self.c, 0.0]
    }
}

/// Focus-dependent constants of the radial ramp.
///
/// `(focus_x, 1 - focus_x², 1 / (1 - focus_x²))`; finite because
/// `|focus_x| < 1` is enforced when the gradient is built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadialPrecalc {
    pub focus_x: f32,
    pub one_minus_fx2: f32,
    pub inv_one_minus_fx2: f32,
}

impl RadialPrecalc {
    pub fn new(g: &RadialGradient) -> Self {
        let fx = g.focus_x;
        let one_minus_fx2 = 1.0 - fx * fx;
        Self {
            focus_x: fx,
            one_minus_fx2,
            inv_one_minus_fx2: 1.0 / one_minus_fx2,
        }
    }

    /// Raw gradient fraction at device point `p`, before cycling.
    ///
    /// Distance from the focus to `p`, relative to the distance from the focus to
    /// the circle along the same ray.
    pub fn eval(&self, transform: &Affine, p: Vec2) -> f32 {
        let g = transform.apply(p);
        let xfx = g.x - self.focus_x;
        (self.focus_x * xfx + (xfx * xfx + g.y * g.y * self.one_minus_fx2).sqrt())
            * self.inv_one_minus_fx2
    }

    #[inline]
    pub fn to_vec4(self) -> [f32; 4] {
        [self.focus_x, self.one_minus_fx2, self.inv_one_minus_fx2, 0.0]
    }
}
