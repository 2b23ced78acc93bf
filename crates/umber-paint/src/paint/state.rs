use core::fmt;

use crate::coords::{Affine, Vec2};
use crate::error::{PaintError, Result};
use crate::surface::SurfaceHandle;

use super::{CycleMethod, Paint, Pixel, TextureFilter, TextureFootprint};

/// The fill currently in effect for one rendering context.
///
/// Ownership:
/// - one instance per context, mutated in place between draws
/// - never shared across threads
///
/// Every setter replaces the whole paint. A failed setter leaves the previous
/// state untouched, so the caller can abort a single draw without side effects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintState {
    paint: Paint,
    use_mask: bool,
}

impl PaintState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    /// Whether the fill is applied through a coverage mask.
    #[inline]
    pub fn use_mask(&self) -> bool {
        self.use_mask
    }

    /// Clears to [`Paint::Undefined`].
    pub fn reset(&mut self) {
        self.paint = Paint::Undefined;
        self.use_mask = false;
    }

    /// Installs a prebuilt paint.
    pub fn set(&mut self, use_mask: bool, paint: Paint) {
        self.paint = paint;
        self.use_mask = use_mask;
    }

    /// Solid color, never masked.
    ///
    /// Fails with `InvalidState` when the active texture paint refers to a surface
    /// that has since been released; `reset` first.
    pub fn set_color(&mut self, pixel: Pixel) -> Result<()> {
        if let Paint::Texture(t) = &self.paint {
            if !t.surface.is_live() {
                return Err(PaintError::InvalidState(
                    "active texture paint holds a released surface handle; reset before reuse".into(),
                ));
            }
        }
        self.set(false, Paint::color(pixel));
        Ok(())
    }

    /// Two-color gradient shortcut.
    #[allow(clippy::too_many_arguments)]
    pub fn set_gradient(
        &mut self,
        use_mask: bool,
        cyclic: bool,
        p0: Vec2,
        p1: Vec2,
        p3: Vec2,
        pixel1: Pixel,
        pixel2: Pixel,
    ) -> Result<()> {
        let paint = Paint::two_color_gradient(cyclic, p0, p1, p3, pixel1, pixel2)?;
        self.set(use_mask, paint);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_linear_gradient(
        &mut self,
        use_mask: bool,
        linear: bool,
        cycle: CycleMethod,
        p0: Vec2,
        p1: Vec2,
        p3: Vec2,
        fractions: &[f32],
        pixels: &[Pixel],
    ) -> Result<()> {
        let paint = Paint::linear_gradient(linear, cycle, p0, p1, p3, fractions, pixels)?;
        self.set(use_mask, paint);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_radial_gradient(
        &mut self,
        use_mask: bool,
        linear: bool,
        cycle: CycleMethod,
        transform: Affine,
        focus_x: f32,
        fractions: &[f32],
        pixels: &[Pixel],
    ) -> Result<()> {
        let paint = Paint::radial_gradient(linear, cycle, transform, focus_x, fractions, pixels)?;
        self.set(use_mask, paint);
        Ok(())
    }

    pub fn set_texture(
        &mut self,
        use_mask: bool,
        surface: SurfaceHandle,
        filter: TextureFilter,
        footprint: TextureFootprint,
    ) -> Result<()> {
        let paint = Paint::texture(surface, filter, footprint)?;
        self.set(use_mask, paint);
        Ok(())
    }
}

impl fmt::Display for PaintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.paint)?;
        if self.use_mask {
            f.write_str(" [masked]")?;
        }
        Ok(())
    }
}
