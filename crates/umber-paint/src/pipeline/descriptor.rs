use core::fmt;

use crate::composite::CompositeRule;
use crate::error::{PaintError, Result};
use crate::paint::{CycleMethod, PaintKind, PaintState, TextureFilter};
use crate::surface::RasterFlags;

/// Cache key identifying the pipeline shape a draw needs.
///
/// Two descriptors with identical fields are interchangeable and always map to
/// the same pipeline object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PipelineDescriptor {
    pub kind: PaintKind,
    pub use_mask: bool,
    /// Gradient paints only.
    pub cycle: Option<CycleMethod>,
    /// Texture paints only.
    pub filter: Option<TextureFilter>,
    /// The draw samples a source texture in addition to the paint.
    pub is_texture: bool,
    pub rule: CompositeRule,
    pub src_flags: RasterFlags,
    pub dst_flags: RasterFlags,
}

impl PipelineDescriptor {
    /// Derives the descriptor for the active paint.
    ///
    /// Only fields of the active variant contribute, so a descriptor never carries
    /// state from an earlier paint. Fails with `NoActivePaint` when undefined.
    pub fn derive(
        state: &PaintState,
        rule: CompositeRule,
        is_texture: bool,
        src_flags: RasterFlags,
        dst_flags: RasterFlags,
    ) -> Result<Self> {
        let paint = state.paint();
        let kind = paint.kind().ok_or(PaintError::NoActivePaint)?;
        Ok(Self {
            kind,
            use_mask: state.use_mask(),
            cycle: paint.cycle(),
            filter: paint.texture_filter(),
            is_texture,
            rule,
            src_flags,
            dst_flags,
        })
    }

    /// Whether the pipeline binds a sampler.
    #[inline]
    pub fn needs_sampler(&self) -> bool {
        self.kind == PaintKind::Texture || self.is_texture || self.use_mask
    }
}

impl fmt::Display for PipelineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(cycle) = self.cycle {
            write!(f, "/{cycle}")?;
        }
        if let Some(filter) = self.filter {
            write!(f, "/{filter:?}")?;
        }
        if self.use_mask {
            f.write_str("+mask")?;
        }
        if self.is_texture {
            f.write_str("+tex")?;
        }
        write!(
            f,
            " {} src[{}{}] dst[{}{}]",
            self.rule,
            if self.src_flags.is_opaque { "o" } else { "-" },
            if self.src_flags.is_premultiplied { "p" } else { "-" },
            if self.dst_flags.is_opaque { "o" } else { "-" },
            if self.dst_flags.is_premultiplied { "p" } else { "-" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::paint::{Pixel, TextureFootprint};
    use crate::surface::SourceSurface;

    const RED: Pixel = Pixel(0xffff0000);
    const BLUE: Pixel = Pixel(0xff0000ff);

    fn derive(state: &PaintState) -> Result<PipelineDescriptor> {
        PipelineDescriptor::derive(
            state,
            CompositeRule::SrcOver,
            false,
            RasterFlags::PREMULTIPLIED,
            RasterFlags::PREMULTIPLIED,
        )
    }

    fn footprint() -> TextureFootprint {
        TextureFootprint::new(0.1, 0.0, 0.0, 0.0, 0.1, 0.0).unwrap()
    }

    #[test]
    fn undefined_has_no_descriptor() {
        assert_eq!(derive(&PaintState::new()).unwrap_err(), PaintError::NoActivePaint);
    }

    #[test]
    fn color_descriptor_has_no_variant_extras() {
        let mut s = PaintState::new();
        s.set_color(RED).unwrap();
        let d = derive(&s).unwrap();
        assert_eq!(d.kind, PaintKind::Color);
        assert_eq!(d.cycle, None);
        assert_eq!(d.filter, None);
        assert!(!d.needs_sampler());
    }

    #[test]
    fn texture_after_reset_depends_only_on_texture_fields() {
        let surface = SourceSurface::new(16, 16, RasterFlags::OPAQUE);

        let mut dirty = PaintState::new();
        dirty.set_color(RED).unwrap();
        dirty.set_gradient(true, true, Vec2::zero(), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0), RED, BLUE)
            .unwrap();
        dirty.reset();
        dirty.set_texture(false, surface.handle(), TextureFilter::Bilinear, footprint()).unwrap();

        let mut clean = PaintState::new();
        clean.set_texture(false, surface.handle(), TextureFilter::Bilinear, footprint()).unwrap();

        let d = derive(&dirty).unwrap();
        assert_eq!(d, derive(&clean).unwrap());
        assert_eq!(d.cycle, None);
        assert!(!d.use_mask);
        assert_eq!(d.filter, Some(TextureFilter::Bilinear));
    }

    #[test]
    fn gradient_descriptor_ignores_stop_values() {
        let mut a = PaintState::new();
        let mut b = PaintState::new();
        let (p0, p1, p3) = (Vec2::zero(), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0));
        a.set_gradient(false, false, p0, p1, p3, RED, BLUE).unwrap();
        b.set_gradient(false, false, p0, p1 * 2.0, p3, BLUE, RED).unwrap();
        assert_ne!(a, b);
        assert_eq!(derive(&a).unwrap(), derive(&b).unwrap());
    }

    #[test]
    fn display_is_compact() {
        let mut s = PaintState::new();
        s.set_color(RED).unwrap();
        assert_eq!(derive(&s).unwrap().to_string(), "Color SrcOver src[-p] dst[-p]");
    }
}
