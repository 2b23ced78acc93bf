//! Render-pipeline selection.
//!
//! Pipelines encode the *shape* of a draw (shader variant plus fixed-function
//! state); per-draw values travel separately as uniforms. Shapes are keyed by
//! [`PipelineDescriptor`] and built at most once per shared
//! [`PipelineStateStorage`].
//!
//! Layers, leaves first:
//! - `descriptor`: cache-key derivation
//! - `storage`: shared single-flight cache + the [`PipelineBuilder`] seam
//! - `selector`: per-context orchestration
//! - `wgpu_builder`: the wgpu backend

mod config;
mod descriptor;
mod selector;
mod shader;
mod storage;
mod wgpu_builder;

pub use config::PipelineInit;
pub use descriptor::PipelineDescriptor;
pub use selector::PipelineSelector;
pub use storage::{PipelineBuilder, PipelineHandle, PipelineStateStorage};
pub use wgpu_builder::{PaintPipeline, PaintVertex, WgpuPipelineBuilder};

pub(crate) use wgpu_builder::binding;
