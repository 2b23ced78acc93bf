//! Geometry types used by paint configuration and encoding.
//!
//! Canonical space:
//! - Device pixels of the destination surface
//! - Origin top-left
//! - +X right, +Y down

mod affine;
mod vec2;

pub use affine::Affine;
pub use vec2::Vec2;
