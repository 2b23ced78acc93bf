//! Source surfaces and borrowed surface handles.
//!
//! Surfaces are owned by an external provider. Paint state only ever holds a
//! [`SurfaceHandle`]: a borrowed reference carrying a liveness token. The handle
//! never keeps the surface alive; once the owning [`SourceSurface`] is dropped
//! the handle reports itself expired.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Raster metadata of a surface, used to pick format-correct shader variants.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct RasterFlags {
    /// Alpha is known to be 1 everywhere.
    pub is_opaque: bool,
    /// Color channels are stored premultiplied by alpha.
    pub is_premultiplied: bool,
}

impl RasterFlags {
    pub const OPAQUE: RasterFlags = RasterFlags { is_opaque: true, is_premultiplied: true };
    pub const PREMULTIPLIED: RasterFlags = RasterFlags { is_opaque: false, is_premultiplied: true };

    #[inline]
    pub const fn new(is_opaque: bool, is_premultiplied: bool) -> Self {
        Self { is_opaque, is_premultiplied }
    }
}

/// Process-unique surface identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct SurfaceInfo {
    id: SurfaceId,
    width: u32,
    height: u32,
    flags: RasterFlags,
}

/// Owner-side record of a sampleable surface.
///
/// Dropping it expires every [`SurfaceHandle`] derived from it.
#[derive(Debug)]
pub struct SourceSurface {
    info: Arc<SurfaceInfo>,
}

impl SourceSurface {
    pub fn new(width: u32, height: u32, flags: RasterFlags) -> Self {
        Self {
            info: Arc::new(SurfaceInfo { id: SurfaceId::next(), width, height, flags }),
        }
    }

    #[inline]
    pub fn id(&self) -> SurfaceId {
        self.info.id
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    #[inline]
    pub fn raster_flags(&self) -> RasterFlags {
        self.info.flags
    }

    /// Returns a borrowed handle for use in paint state.
    pub fn handle(&self) -> SurfaceHandle {
        SurfaceHandle {
            id: Some(self.info.id),
            token: Arc::downgrade(&self.info),
        }
    }
}

/// Borrowed reference to a [`SourceSurface`].
///
/// Lifetime contract: the caller that owns the surface guarantees it outlives
/// every draw that samples it. The handle only checks liveness at the boundary
/// where it is installed into paint state; a surface released between
/// configuration and binding is a caller contract violation.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    id: Option<SurfaceId>,
    token: Weak<SurfaceInfo>,
}

impl SurfaceHandle {
    /// A handle that refers to nothing.
    pub fn null() -> Self {
        Self { id: None, token: Weak::new() }
    }

    #[inline]
    pub fn id(&self) -> Option<SurfaceId> {
        self.id
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.id.is_none()
    }

    /// True while the owning surface is alive.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.token.strong_count() > 0
    }

    /// Raster flags of the surface, if it is still alive.
    pub fn raster_flags(&self) -> Option<RasterFlags> {
        self.token.upgrade().map(|info| info.flags)
    }

    /// Surface size in pixels, if it is still alive.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.token.upgrade().map(|info| (info.width, info.height))
    }
}

impl Default for SurfaceHandle {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for SurfaceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SurfaceHandle {}

/// Resolves surface handles to GPU views.
///
/// Implemented by whoever owns the textures; the paint core only reads through it.
pub trait SurfaceProvider {
    fn texture_view(&self, handle: &SurfaceHandle) -> Option<&wgpu::TextureView>;
}

impl SurfaceProvider for HashMap<SurfaceId, wgpu::TextureView> {
    fn texture_view(&self, handle: &SurfaceHandle) -> Option<&wgpu::TextureView> {
        if !handle.is_live() {
            return None;
        }
        self.get(&handle.id()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_expires_with_surface() {
        let surface = SourceSurface::new(4, 4, RasterFlags::OPAQUE);
        let handle = surface.handle();
        assert!(handle.is_live());
        assert_eq!(handle.raster_flags(), Some(RasterFlags::OPAQUE));
        drop(surface);
        assert!(!handle.is_live());
        assert!(!handle.is_null());
        assert_eq!(handle.size(), None);
    }

    #[test]
    fn null_handle_is_never_live() {
        let h = SurfaceHandle::null();
        assert!(h.is_null());
        assert!(!h.is_live());
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = SourceSurface::new(1, 1, RasterFlags::default());
        let b = SourceSurface::new(1, 1, RasterFlags::default());
        assert_eq!(a.handle(), a.handle());
        assert_ne!(a.handle(), b.handle());
        assert_ne!(a.id(), b.id());
    }
}
