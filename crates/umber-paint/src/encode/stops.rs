use crate::paint::{Color, ColorSpace, CycleMethod, GradientStops, MAX_STOPS};

/// Default width of a debug ramp produced by [`make_ramp`].
pub const RAMP_SAMPLES: usize = 256;

/// Maps a raw gradient fraction into [0, 1] according to the cycle method.
#[inline]
pub fn cycle_fraction(t: f32, cycle: CycleMethod) -> f32 {
    match cycle {
        CycleMethod::NoCycle => t.clamp(0.0, 1.0),
        CycleMethod::Repeat => t - t.floor(),
        CycleMethod::Reflect => {
            let m = t - 2.0 * (t * 0.5).floor();
            if m > 1.0 { 2.0 - m } else { m }
        }
    }
}

/// Fixed-size stop table, as uploaded to the shader.
///
/// Layout:
/// - `fractions[..num_stops]` are the stop fractions; the tail is padded with 1.0,
///   so the whole array is non-decreasing.
/// - `scale_factors[i] = 1 / (fractions[i + 1] - fractions[i])` for real segments, 0 elsewhere.
/// - `colors` are premultiplied, in the interpolation color space; the tail repeats
///   the last stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StopTable {
    pub num_stops: u32,
    pub linear_rgb: bool,
    pub fractions: [f32; MAX_STOPS],
    pub scale_factors: [f32; MAX_STOPS],
    pub colors: [[f32; 4]; MAX_STOPS],
}

impl StopTable {
    pub fn from_stops(stops: &GradientStops, space: ColorSpace) -> Self {
        let src = stops.as_slice();
        let n = src.len().min(MAX_STOPS);
        let linear_rgb = space == ColorSpace::LinearRgb;

        let mut fractions = [1.0f32; MAX_STOPS];
        let mut scale_factors = [0.0f32; MAX_STOPS];
        let mut colors = [[0.0f32; 4]; MAX_STOPS];

        for (i, stop) in src.iter().take(n).enumerate() {
            fractions[i] = stop.fraction;
            let c = stop.pixel.to_color();
            let c = if linear_rgb { c.to_linear_rgb() } else { c };
            colors[i] = c.to_array();
        }
        for i in 0..n.saturating_sub(1) {
            // Strictly increasing fractions make every segment non-empty.
            scale_factors[i] = 1.0 / (fractions[i + 1] - fractions[i]);
        }
        if n > 0 {
            let last = colors[n - 1];
            colors[n..].fill(last);
        }

        Self { num_stops: n as u32, linear_rgb, fractions, scale_factors, colors }
    }

    /// Evaluates the ramp at raw fraction `t`, returning an sRGB premultiplied color.
    pub fn sample(&self, t: f32, cycle: CycleMethod) -> Color {
        let t = cycle_fraction(t, cycle);
        let n = self.num_stops as usize;
        let last = n.saturating_sub(1);

        let mut i = 0;
        while i + 1 < last && t >= self.fractions[i + 1] {
            i += 1;
        }
        let local = ((t - self.fractions[i]) * self.scale_factors[i]).clamp(0.0, 1.0);

        let c0 = self.color(i);
        let c1 = self.color((i + 1).min(last));
        let c = c0.lerp(c1, local);
        if self.linear_rgb { c.to_srgb() } else { c }
    }

    #[inline]
    fn color(&self, i: usize) -> Color {
        let [r, g, b, a] = self.colors[i];
        Color::from_premul(r, g, b, a)
    }

    /// Fractions packed four per `vec4`.
    pub fn packed_fractions(&self) -> [[f32; 4]; MAX_STOPS / 4] {
        pack4(&self.fractions)
    }

    /// Scale factors packed four per `vec4`.
    pub fn packed_scale_factors(&self) -> [[f32; 4]; MAX_STOPS / 4] {
        pack4(&self.scale_factors)
    }
}

fn pack4(values: &[f32; MAX_STOPS]) -> [[f32; 4]; MAX_STOPS / 4] {
    let mut out = [[0.0f32; 4]; MAX_STOPS / 4];
    for (dst, chunk) in out.iter_mut().zip(values.chunks_exact(4)) {
        dst.copy_from_slice(chunk);
    }
    out
}

/// Samples the table over [0, 1] into packed premultiplied RGBA8 texels.
///
/// Used for readback comparisons against rendered output.
pub fn make_ramp(table: &StopTable, samples: usize) -> Vec<u32> {
    let denom = samples.saturating_sub(1).max(1) as f32;
    (0..samples)
        .map(|i| table.sample(i as f32 / denom, CycleMethod::NoCycle).to_rgba8_u32())
        .collect()
}
