use bytemuck::{Pod, Zeroable};

use crate::composite::Composite;
use crate::error::{PaintError, Result};
use crate::paint::{Paint, PaintState, MAX_STOPS};

use super::{RadialPrecalc, StopTable};

/// Per-draw dynamic values of a paint, laid out to match `PaintUniforms` in
/// `paint.wgsl`.
///
/// Only the fields relevant to the active paint are meaningful; the rest stay
/// zeroed. The pipeline decides which fields are read.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PaintUniforms {
    pub viewport: [f32; 2],
    pub extra_alpha: f32,
    pub num_stops: u32,

    pub linear_rgb: u32,
    pub _pad: [u32; 3], // 16-byte alignment

    pub color: [f32; 4],

    /// `(a, b, c, 0)`: `t = a·x + b·y + c`.
    pub linear: [f32; 4],

    /// Device → gradient transform rows.
    pub radial_m0: [f32; 4],
    pub radial_m1: [f32; 4],
    /// `(focus_x, 1 - fx², 1 / (1 - fx²), 0)`.
    pub radial_precalc: [f32; 4],

    /// Device → normalized texture coordinate rows.
    pub tex_x: [f32; 4],
    pub tex_y: [f32; 4],

    pub fractions: [[f32; 4]; MAX_STOPS / 4],
    pub scale_factors: [[f32; 4]; MAX_STOPS / 4],
    pub colors: [[f32; 4]; MAX_STOPS],
}

impl PaintUniforms {
    /// Encodes the active paint.
    ///
    /// `viewport` is the destination size in device pixels.
    /// Fails with `NoActivePaint` when the state is undefined.
    pub fn encode(state: &PaintState, composite: &Composite, viewport: [f32; 2]) -> Result<Self> {
        let mut u = Self::zeroed();
        u.viewport = [viewport[0].max(1.0), viewport[1].max(1.0)];
        u.extra_alpha = composite.extra_alpha();

        match state.paint() {
            Paint::Undefined => return Err(PaintError::NoActivePaint),
            Paint::Color(pixel) => {
                u.color = pixel.to_color().to_array();
            }
            Paint::LinearGradient(g) => {
                u.linear = g.projection().to_vec4();
                u.set_stops(&StopTable::from_stops(&g.stops, g.color_space));
            }
            Paint::RadialGradient(g) => {
                let [m0, m1] = g.transform.rows();
                u.radial_m0 = m0;
                u.radial_m1 = m1;
                u.radial_precalc = RadialPrecalc::new(g).to_vec4();
                u.set_stops(&StopTable::from_stops(&g.stops, g.color_space));
            }
            Paint::Texture(t) => {
                let [x, y] = t.footprint.as_affine().rows();
                u.tex_x = x;
                u.tex_y = y;
            }
        }
        Ok(u)
    }

    fn set_stops(&mut self, table: &StopTable) {
        self.num_stops = table.num_stops;
        self.linear_rgb = table.linear_rgb as u32;
        self.fractions = table.packed_fractions();
        self.scale_factors = table.packed_scale_factors();
        self.colors = table.colors;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
