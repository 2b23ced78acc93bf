//! Compositing rules and their fixed-function blend configuration.
//!
//! All rules operate on premultiplied colors. Extra alpha is a per-draw value
//! applied in the fragment shader; only the rule shapes the pipeline.

use core::fmt;

use crate::error::{PaintError, Result};
use crate::surface::RasterFlags;

/// Porter-Duff compositing rule.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CompositeRule {
    Clear,
    Src,
    #[default]
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    Dst,
    SrcAtop,
    DstAtop,
    Xor,
}

/// Blend factor in Porter-Duff terms, before mapping to wgpu.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Factor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

impl CompositeRule {
    pub const ALL: [CompositeRule; 12] = [
        Self::Clear,
        Self::Src,
        Self::SrcOver,
        Self::DstOver,
        Self::SrcIn,
        Self::DstIn,
        Self::SrcOut,
        Self::DstOut,
        Self::Dst,
        Self::SrcAtop,
        Self::DstAtop,
        Self::Xor,
    ];

    // (Fs, Fd): result = src·Fs + dst·Fd
    fn factors(self) -> (Factor, Factor) {
        use Factor::*;
        match self {
            Self::Clear => (Zero, Zero),
            Self::Src => (One, Zero),
            Self::SrcOver => (One, OneMinusSrcAlpha),
            Self::DstOver => (OneMinusDstAlpha, One),
            Self::SrcIn => (DstAlpha, Zero),
            Self::DstIn => (Zero, SrcAlpha),
            Self::SrcOut => (OneMinusDstAlpha, Zero),
            Self::DstOut => (Zero, OneMinusSrcAlpha),
            Self::Dst => (Zero, One),
            Self::SrcAtop => (DstAlpha, OneMinusSrcAlpha),
            Self::DstAtop => (OneMinusDstAlpha, SrcAlpha),
            Self::Xor => (OneMinusDstAlpha, OneMinusSrcAlpha),
        }
    }

    /// Fixed-function blend state for this rule.
    ///
    /// An opaque destination has an implicit alpha of 1, whatever the stored
    /// alpha channel holds, so destination-alpha factors are folded to constants.
    pub fn blend_state(self, dst: RasterFlags) -> wgpu::BlendState {
        let (fs, fd) = self.factors();
        let map = |f: Factor| -> wgpu::BlendFactor {
            match (f, dst.is_opaque) {
                (Factor::Zero, _) => wgpu::BlendFactor::Zero,
                (Factor::One, _) => wgpu::BlendFactor::One,
                (Factor::SrcAlpha, _) => wgpu::BlendFactor::SrcAlpha,
                (Factor::OneMinusSrcAlpha, _) => wgpu::BlendFactor::OneMinusSrcAlpha,
                (Factor::DstAlpha, true) => wgpu::BlendFactor::One,
                (Factor::DstAlpha, false) => wgpu::BlendFactor::DstAlpha,
                (Factor::OneMinusDstAlpha, true) => wgpu::BlendFactor::Zero,
                (Factor::OneMinusDstAlpha, false) => wgpu::BlendFactor::OneMinusDstAlpha,
            }
        };
        let component = wgpu::BlendComponent {
            src_factor: map(fs),
            dst_factor: map(fd),
            operation: wgpu::BlendOperation::Add,
        };
        wgpu::BlendState { color: component, alpha: component }
    }
}

impl fmt::Display for CompositeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Compositing state of a draw: rule plus extra alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Composite {
    pub rule: CompositeRule,
    extra_alpha: f32,
}

impl Composite {
    /// Fails with `InvalidParameter` if `extra_alpha` is outside [0, 1].
    pub fn new(rule: CompositeRule, extra_alpha: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&extra_alpha) {
            return Err(PaintError::param(format!(
                "extra alpha must lie in [0, 1] (got {extra_alpha})"
            )));
        }
        Ok(Self { rule, extra_alpha })
    }

    #[inline]
    pub const fn rule(rule: CompositeRule) -> Self {
        Self { rule, extra_alpha: 1.0 }
    }

    #[inline]
    pub fn extra_alpha(&self) -> f32 {
        self.extra_alpha
    }
}

impl Default for Composite {
    fn default() -> Self {
        Self::rule(CompositeRule::SrcOver)
    }
}
