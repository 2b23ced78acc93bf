//! GPU device management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue used to build and run paint
//! pipelines offscreen.

mod gpu;

pub use gpu::{HeadlessGpu, HeadlessInit};
