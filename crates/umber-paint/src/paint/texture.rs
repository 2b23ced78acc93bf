use crate::coords::{Affine, Vec2};
use crate::error::{PaintError, Result};
use crate::surface::SurfaceHandle;

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Bilinear,
}

/// Device → texture-space mapping of a texture paint.
///
/// Normalized texture coordinates of device point `(x, y)` are
/// `u = xp0·x + xp1·y + xp3` and `v = yp0·x + yp1·y + yp3`.
/// The image of the device unit square is a parallelogram in texture space:
/// three of its corners fix the fourth by affine extension.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureFootprint {
    pub xp0: f32,
    pub xp1: f32,
    pub xp3: f32,
    pub yp0: f32,
    pub yp1: f32,
    pub yp3: f32,
}

impl TextureFootprint {
    pub fn new(xp0: f32, xp1: f32, xp3: f32, yp0: f32, yp1: f32, yp3: f32) -> Result<Self> {
        let fp = Self { xp0, xp1, xp3, yp0, yp1, yp3 };
        if !fp.as_affine().is_finite() {
            return Err(PaintError::param("texture footprint coefficients must be finite"));
        }
        Ok(fp)
    }

    #[inline]
    pub fn as_affine(&self) -> Affine {
        Affine::new(self.xp0, self.xp1, self.xp3, self.yp0, self.yp1, self.yp3)
    }

    /// Texture-space corners for device `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)`.
    pub fn corners(&self) -> [Vec2; 4] {
        let m = self.as_affine();
        let c0 = m.apply(Vec2::new(0.0, 0.0));
        let c1 = m.apply(Vec2::new(1.0, 0.0));
        let c3 = m.apply(Vec2::new(0.0, 1.0));
        [c0, c1, c1 + c3 - c0, c3]
    }
}

/// Texture paint: samples a borrowed source surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TexturePaint {
    pub surface: SurfaceHandle,
    pub filter: TextureFilter,
    pub footprint: TextureFootprint,
}

impl TexturePaint {
    /// Fails with `InvalidHandle` if the surface is null or already released.
    pub fn new(surface: SurfaceHandle, filter: TextureFilter, footprint: TextureFootprint) -> Result<Self> {
        if surface.is_null() || !surface.is_live() {
            return Err(PaintError::InvalidHandle);
        }
        Ok(Self { surface, filter, footprint })
    }
}
