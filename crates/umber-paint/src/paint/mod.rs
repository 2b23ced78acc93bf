//! Paint model: what fills the geometry of the next draw.
//!
//! Scope:
//! - packed and float color representations
//! - paint sources (solid, linear/radial gradients, texture)
//! - the per-context [`PaintState`] holder
//!
//! Every variant is built by a validating constructor, so an invalid paint never
//! reaches pipeline selection.

pub mod color;
pub mod gradient;
mod state;
pub mod texture;

use core::fmt;

use crate::coords::{Affine, Vec2};
use crate::error::Result;
use crate::surface::SurfaceHandle;

pub use color::{Color, Pixel};
pub use gradient::{
    ColorSpace, CycleMethod, GradientStop, GradientStops, LinearGradient, RadialGradient, MAX_STOPS,
};
pub use state::PaintState;
pub use texture::{TextureFilter, TextureFootprint, TexturePaint};

/// Variant class of a paint, as seen by pipeline selection.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PaintKind {
    Color,
    LinearGradient,
    RadialGradient,
    Texture,
}

/// Paint source for filling geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Paint {
    /// No paint configured; nothing can be drawn.
    #[default]
    Undefined,
    Color(Pixel),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
    Texture(TexturePaint),
}

impl Paint {
    #[inline]
    pub fn color(pixel: Pixel) -> Self {
        Paint::Color(pixel)
    }

    /// Two-color linear gradient shortcut; see [`LinearGradient::two_color`].
    pub fn two_color_gradient(
        cyclic: bool,
        p0: Vec2,
        p1: Vec2,
        p3: Vec2,
        pixel1: Pixel,
        pixel2: Pixel,
    ) -> Result<Self> {
        LinearGradient::two_color(cyclic, p0, p1, p3, pixel1, pixel2).map(Paint::LinearGradient)
    }

    /// Multi-stop linear gradient. `linear` selects linear-RGB interpolation.
    pub fn linear_gradient(
        linear: bool,
        cycle: CycleMethod,
        p0: Vec2,
        p1: Vec2,
        p3: Vec2,
        fractions: &[f32],
        pixels: &[Pixel],
    ) -> Result<Self> {
        let stops = GradientStops::new(fractions, pixels)?;
        LinearGradient::new(p0, p1, p3, stops, cycle, ColorSpace::from_linear_flag(linear))
            .map(Paint::LinearGradient)
    }

    /// Multi-stop radial gradient. `transform` maps device space to the unit circle.
    pub fn radial_gradient(
        linear: bool,
        cycle: CycleMethod,
        transform: Affine,
        focus_x: f32,
        fractions: &[f32],
        pixels: &[Pixel],
    ) -> Result<Self> {
        let stops = GradientStops::new(fractions, pixels)?;
        RadialGradient::new(transform, focus_x, stops, cycle, ColorSpace::from_linear_flag(linear))
            .map(Paint::RadialGradient)
    }

    pub fn texture(
        surface: SurfaceHandle,
        filter: TextureFilter,
        footprint: TextureFootprint,
    ) -> Result<Self> {
        TexturePaint::new(surface, filter, footprint).map(Paint::Texture)
    }

    /// Variant class, or `None` for [`Paint::Undefined`].
    pub fn kind(&self) -> Option<PaintKind> {
        match self {
            Paint::Undefined => None,
            Paint::Color(_) => Some(PaintKind::Color),
            Paint::LinearGradient(_) => Some(PaintKind::LinearGradient),
            Paint::RadialGradient(_) => Some(PaintKind::RadialGradient),
            Paint::Texture(_) => Some(PaintKind::Texture),
        }
    }

    /// Cycle method for gradient paints.
    pub fn cycle(&self) -> Option<CycleMethod> {
        match self {
            Paint::LinearGradient(g) => Some(g.cycle),
            Paint::RadialGradient(g) => Some(g.cycle),
            _ => None,
        }
    }

    /// Sampling filter for texture paints.
    pub fn texture_filter(&self) -> Option<TextureFilter> {
        match self {
            Paint::Texture(t) => Some(t.filter),
            _ => None,
        }
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Paint::Undefined)
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Undefined => f.write_str("undefined"),
            Paint::Color(p) => write!(f, "color {:#010x}", p.0),
            Paint::LinearGradient(g) => write!(
                f,
                "linear gradient ({} stops, {}, {:?}) p0=({}, {}) p1=({}, {})",
                g.stops.len(),
                g.cycle,
                g.color_space,
                g.p0.x,
                g.p0.y,
                g.p1.x,
                g.p1.y
            ),
            Paint::RadialGradient(g) => {
                let focus = g.focus_point();
                write!(
                    f,
                    "radial gradient ({} stops, {}, {:?}) focus_x={} at ({}, {})",
                    g.stops.len(),
                    g.cycle,
                    g.color_space,
                    g.focus_x,
                    focus.x,
                    focus.y
                )
            }
            Paint::Texture(t) => match t.surface.id() {
                Some(id) => write!(f, "texture surface #{} ({:?})", id.get(), t.filter),
                None => write!(f, "texture <null> ({:?})", t.filter),
            },
        }
    }
}
