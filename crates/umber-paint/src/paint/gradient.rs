use core::fmt;

use crate::coords::{Affine, Vec2};
use crate::encode::LinearProjection;
use crate::error::{PaintError, Result};

use super::Pixel;

/// Maximum number of stops a gradient may carry.
///
/// Stop tables are uploaded as a fixed-size uniform block; see
/// [`StopTable`](crate::encode::StopTable).
pub const MAX_STOPS: usize = 12;

/// Gradient behavior outside the [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CycleMethod {
    /// Clamp to the edge stops.
    NoCycle,
    /// Mirror-repeat the gradient pattern.
    Reflect,
    /// Repeat the gradient pattern.
    Repeat,
}

/// Color space in which stop colors are interpolated.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ColorSpace {
    /// Interpolate the encoded sRGB values directly.
    #[default]
    Srgb,
    /// Interpolate in linear light and re-encode to sRGB per fragment.
    LinearRgb,
}

impl ColorSpace {
    #[inline]
    pub fn from_linear_flag(linear: bool) -> Self {
        if linear { Self::LinearRgb } else { Self::Srgb }
    }
}

/// A single gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GradientStop {
    pub fraction: f32,
    pub pixel: Pixel,
}

/// Validated stop list.
///
/// Invariants (checked by [`GradientStops::new`]):
/// - `2 <= len <= MAX_STOPS`
/// - fractions are finite and strictly increasing
/// - the first fraction is 0 and the last is 1
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStops {
    stops: Vec<GradientStop>,
}

impl GradientStops {
    /// Zips `fractions` with `pixels`; both slices must have the same length.
    pub fn new(fractions: &[f32], pixels: &[Pixel]) -> Result<Self> {
        if fractions.len() != pixels.len() {
            return Err(PaintError::param(format!(
                "stop arrays differ in length ({} fractions, {} pixels)",
                fractions.len(),
                pixels.len()
            )));
        }
        let n = fractions.len();
        if n < 2 {
            return Err(PaintError::param(format!("gradient needs at least 2 stops, got {n}")));
        }
        if n > MAX_STOPS {
            return Err(PaintError::param(format!(
                "gradient has {n} stops, at most {MAX_STOPS} are supported"
            )));
        }
        if let Some(f) = fractions.iter().find(|f| !f.is_finite()) {
            return Err(PaintError::param(format!("stop fraction {f} is not finite")));
        }
        if fractions[0] != 0.0 || fractions[n - 1] != 1.0 {
            return Err(PaintError::param(format!(
                "stop fractions must start at 0 and end at 1 (got {} .. {})",
                fractions[0],
                fractions[n - 1]
            )));
        }
        if let Some(w) = fractions.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PaintError::param(format!(
                "stop fractions must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }

        let stops = fractions
            .iter()
            .zip(pixels)
            .map(|(&fraction, &pixel)| GradientStop { fraction, pixel })
            .collect();
        Ok(Self { stops })
    }

    /// Stops for the two-color shortcut: `(0, c0), (1, c1)`.
    pub fn two_color(c0: Pixel, c1: Pixel) -> Self {
        Self {
            stops: vec![
                GradientStop { fraction: 0.0, pixel: c0 },
                GradientStop { fraction: 1.0, pixel: c1 },
            ],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[GradientStop] {
        &self.stops
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)] // never empty by construction
    pub fn len(&self) -> usize {
        self.stops.len()
    }
}

/// Linear gradient in device space.
///
/// Semantics:
/// - `p0` maps to fraction 0 and `p1` to fraction 1.
/// - `p3` fixes the isoline direction: points along `p0 → p3` share fraction 0.
///   For an ordinary (unskewed) gradient `p3` is `p0` plus the perpendicular of `p1 - p0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p3: Vec2,
    pub stops: GradientStops,
    pub cycle: CycleMethod,
    pub color_space: ColorSpace,
    projection: LinearProjection,
}

impl LinearGradient {
    pub fn new(
        p0: Vec2,
        p1: Vec2,
        p3: Vec2,
        stops: GradientStops,
        cycle: CycleMethod,
        color_space: ColorSpace,
    ) -> Result<Self> {
        if !(p0.is_finite() && p1.is_finite() && p3.is_finite()) {
            return Err(PaintError::param("linear gradient points must be finite"));
        }
        if p0 == p1 {
            return Err(PaintError::param("linear gradient direction is degenerate (p0 == p1)"));
        }
        let Some(projection) = LinearProjection::from_points(p0, p1, p3) else {
            return Err(PaintError::param(
                "linear gradient reference point p3 is collinear with p0 and p1, \
                 or the points are too far apart to project",
            ));
        };
        Ok(Self { p0, p1, p3, stops, cycle, color_space, projection })
    }

    /// Device-space projection onto the gradient axis.
    #[inline]
    pub fn projection(&self) -> LinearProjection {
        self.projection
    }

    /// Two-color shortcut.
    ///
    /// `cyclic` selects reflect cycling; otherwise colors clamp at the ends.
    /// Interpolation happens in sRGB.
    pub fn two_color(
        cyclic: bool,
        p0: Vec2,
        p1: Vec2,
        p3: Vec2,
        pixel1: Pixel,
        pixel2: Pixel,
    ) -> Result<Self> {
        let cycle = if cyclic { CycleMethod::Reflect } else { CycleMethod::NoCycle };
        Self::new(
            p0,
            p1,
            p3,
            GradientStops::two_color(pixel1, pixel2),
            cycle,
            ColorSpace::Srgb,
        )
    }

    /// Returns the `p3` an unskewed gradient from `p0` to `p1` would use.
    #[inline]
    pub fn perpendicular_reference(p0: Vec2, p1: Vec2) -> Vec2 {
        let d = p1 - p0;
        p0 + Vec2::new(-d.y, d.x)
    }
}

/// Radial gradient.
///
/// `transform` maps device space into gradient space, where the gradient is the
/// unit circle centered at the origin. The focal point sits at `(focus_x, 0)` in
/// gradient space and must lie strictly inside the circle.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub transform: Affine,
    pub focus_x: f32,
    pub stops: GradientStops,
    pub cycle: CycleMethod,
    pub color_space: ColorSpace,
}

impl RadialGradient {
    pub fn new(
        transform: Affine,
        focus_x: f32,
        stops: GradientStops,
        cycle: CycleMethod,
        color_space: ColorSpace,
    ) -> Result<Self> {
        if !transform.is_finite() {
            return Err(PaintError::param("radial gradient transform must be finite"));
        }
        if transform.invert().is_none() {
            return Err(PaintError::param("radial gradient transform is not invertible"));
        }
        if !focus_x.is_finite() || focus_x.abs() >= 1.0 {
            return Err(PaintError::param(format!(
                "radial gradient focus_x must satisfy |focus_x| < 1 (got {focus_x})"
            )));
        }
        Ok(Self { transform, focus_x, stops, cycle, color_space })
    }

    /// Gradient → device transform.
    pub fn inverse_transform(&self) -> Affine {
        // Invertibility is checked on construction.
        self.transform.invert().unwrap_or_default()
    }

    /// Circle center in device space.
    pub fn center(&self) -> Vec2 {
        self.inverse_transform().apply(Vec2::zero())
    }

    /// Focal point in device space.
    pub fn focus_point(&self) -> Vec2 {
        self.inverse_transform().apply(Vec2::new(self.focus_x, 0.0))
    }
}

impl fmt::Display for CycleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoCycle => "no-cycle",
            Self::Reflect => "reflect",
            Self::Repeat => "repeat",
        })
    }
}
