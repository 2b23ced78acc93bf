use crate::composite::CompositeRule;
use crate::error::Result;
use crate::paint::PaintState;
use crate::surface::RasterFlags;

use super::{PipelineBuilder, PipelineDescriptor, PipelineHandle, PipelineStateStorage};

struct Selected<P> {
    storage_id: u64,
    generation: u64,
    descriptor: PipelineDescriptor,
    handle: PipelineHandle<P>,
}

/// Per-context pipeline selection.
///
/// Remembers the pipeline picked for the previous draw. Consecutive draws with
/// the same shape skip the shared cache entirely, which is the common case when
/// many primitives are filled with one paint.
pub struct PipelineSelector<P> {
    last: Option<Selected<P>>,
}

impl<P> Default for PipelineSelector<P> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<P> PipelineSelector<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the pipeline for the next draw.
    ///
    /// Steps:
    /// 1) fail with `NoActivePaint` if the paint is undefined
    /// 2) derive the descriptor from paint, rule, texture flag and raster flags
    /// 3) reuse the previous selection if the descriptor and storage state match
    /// 4) otherwise look up or build through `storage`
    ///
    /// Per-draw values (colors, stop tables, matrices) are not part of the
    /// pipeline; bind them separately, see [`PaintBinder`](crate::render::PaintBinder).
    /// A failure leaves the previous selection and the shared cache untouched.
    pub fn select<B>(
        &mut self,
        state: &PaintState,
        rule: CompositeRule,
        is_texture: bool,
        src_flags: RasterFlags,
        dst_flags: RasterFlags,
        storage: &PipelineStateStorage<B>,
    ) -> Result<PipelineHandle<P>>
    where
        B: PipelineBuilder<Pipeline = P>,
    {
        let descriptor = PipelineDescriptor::derive(state, rule, is_texture, src_flags, dst_flags)?;
        let generation = storage.generation();

        if let Some(last) = &self.last {
            if last.descriptor == descriptor
                && last.storage_id == storage.id()
                && last.generation == generation
            {
                return Ok(last.handle.clone());
            }
        }

        let handle = storage.lookup_or_build(&descriptor)?;
        self.last = Some(Selected {
            storage_id: storage.id(),
            generation,
            descriptor,
            handle: handle.clone(),
        });
        Ok(handle)
    }

    /// Descriptor of the most recent successful selection.
    pub fn last_descriptor(&self) -> Option<&PipelineDescriptor> {
        self.last.as_ref().map(|s| &s.descriptor)
    }

    /// Forgets the previous selection.
    pub fn clear(&mut self) {
        self.last = None;
    }
}
