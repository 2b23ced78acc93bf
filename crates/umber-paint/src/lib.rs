//! GPU paint encoding and pipeline selection.
//!
//! A rendering context holds a [`PaintState`] (the fill in effect) and a
//! [`PipelineSelector`]. Before each draw the selector derives a
//! [`PipelineDescriptor`] from the paint, the composite rule and the raster
//! flags of source and destination, and fetches the matching pipeline from a
//! [`PipelineStateStorage`] shared by every context on the device. Per-draw
//! values (colors, gradient geometry, stop tables) travel as
//! [`PaintUniforms`](encode::PaintUniforms) and never affect pipeline identity.

pub mod composite;
pub mod coords;
pub mod device;
pub mod encode;
mod error;
pub mod logging;
pub mod paint;
pub mod pipeline;
pub mod render;
pub mod surface;

pub use composite::{Composite, CompositeRule};
pub use coords::{Affine, Vec2};
pub use error::{ErrorKind, PaintError, Result};
pub use paint::{CycleMethod, Paint, PaintKind, PaintState, Pixel, TextureFilter, TextureFootprint};
pub use pipeline::{
    PaintPipeline, PipelineBuilder, PipelineDescriptor, PipelineHandle, PipelineInit,
    PipelineSelector, PipelineStateStorage, WgpuPipelineBuilder,
};
pub use surface::{RasterFlags, SourceSurface, SurfaceHandle, SurfaceProvider};
