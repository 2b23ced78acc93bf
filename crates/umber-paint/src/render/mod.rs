//! Binding selected pipelines for drawing.
//!
//! Convention:
//! - geometry is in device pixels (top-left origin, +Y down)
//! - the vertex shader converts to NDC using the viewport uniform

mod binder;
mod ctx;

pub use binder::{BindSources, PaintBinder};
pub use ctx::{RenderCtx, RenderTarget};
