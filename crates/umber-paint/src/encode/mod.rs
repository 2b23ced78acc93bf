//! Gradient and paint normalization.
//!
//! Converts validated paints into the fixed-size uniform layout the paint
//! shader expects. Everything here is a pure function of its inputs, so the same
//! paint always encodes to the same bytes.
//!
//! The CPU evaluators (`StopTable::sample`, `LinearProjection::eval`,
//! `RadialPrecalc::eval`) follow the WGSL in `pipeline/shaders/paint.wgsl` step for step.

mod geometry;
mod stops;
mod uniforms;

pub use geometry::{LinearProjection, RadialPrecalc};
pub use stops::{cycle_fraction, make_ramp, StopTable, RAMP_SAMPLES};
pub use uniforms::PaintUniforms;
