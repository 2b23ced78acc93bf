use wgpu::util::DeviceExt;

use crate::composite::Composite;
use crate::encode::PaintUniforms;
use crate::error::{PaintError, Result};
use crate::paint::{Paint, PaintState};
use crate::pipeline::{binding, PaintPipeline, PipelineDescriptor, PipelineHandle};
use crate::surface::SurfaceProvider;

use super::RenderCtx;

/// Textures a draw may sample besides its uniforms.
#[derive(Default, Clone, Copy)]
pub struct BindSources<'a> {
    /// Resolves the surface of a texture paint.
    pub surfaces: Option<&'a dyn SurfaceProvider>,
    /// Source image of a texture draw (`is_texture`).
    pub source: Option<&'a wgpu::TextureView>,
    /// Single-channel coverage mask (`use_mask`).
    pub mask: Option<&'a wgpu::TextureView>,
}

/// Binds a selected pipeline and the paint's dynamic values to a render pass.
///
/// One binder per rendering context. The uniform buffer is reused for as long
/// as the encoded paint, composite and viewport stay the same; any change
/// allocates a fresh buffer so draws already recorded keep their values.
#[derive(Default)]
pub struct PaintBinder {
    uniforms: Option<(PaintUniforms, wgpu::Buffer)>,
    uploads: u64,
}

impl PaintBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uniform uploads so far.
    #[inline]
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Sets `pipeline` and its bind group on `rpass`.
    ///
    /// Errors:
    /// - `NoActivePaint` when `state` is undefined
    /// - `InvalidState` when `pipeline` was selected for a different paint shape
    ///   or target format, or a texture the pipeline samples is missing from `sources`
    /// - `InvalidHandle` when the texture paint's surface cannot be resolved
    pub fn bind(
        &mut self,
        ctx: &RenderCtx<'_>,
        rpass: &mut wgpu::RenderPass<'_>,
        pipeline: &PipelineHandle<PaintPipeline>,
        state: &PaintState,
        composite: &Composite,
        sources: &BindSources<'_>,
    ) -> Result<()> {
        let d = pipeline.descriptor();
        check_matches(d, state, composite)?;
        if pipeline.target_format() != ctx.target_format {
            return Err(PaintError::InvalidState(format!(
                "pipeline [{d}] renders to {:?} but the target is {:?}",
                pipeline.target_format(),
                ctx.target_format
            )));
        }

        let encoded = PaintUniforms::encode(state, composite, ctx.viewport)?;
        let uniform_buffer = self.uniform_buffer(ctx, &encoded);

        let paint_view = match state.paint() {
            Paint::Texture(t) => Some(
                sources
                    .surfaces
                    .and_then(|p| p.texture_view(&t.surface))
                    .ok_or(PaintError::InvalidHandle)?,
            ),
            _ => None,
        };

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: binding::UNIFORMS,
            resource: uniform_buffer.as_entire_binding(),
        }];
        if d.needs_sampler() {
            let sampler = pipeline
                .sampler()
                .ok_or_else(|| PaintError::InvalidState(format!("pipeline [{d}] has no sampler")))?;
            entries.push(wgpu::BindGroupEntry {
                binding: binding::SAMPLER,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }
        if let Some(view) = paint_view {
            entries.push(wgpu::BindGroupEntry {
                binding: binding::PAINT_TEXTURE,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        if d.is_texture {
            let view = sources.source.ok_or_else(|| missing("source texture", d))?;
            entries.push(wgpu::BindGroupEntry {
                binding: binding::SOURCE_TEXTURE,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        if d.use_mask {
            let view = sources.mask.ok_or_else(|| missing("coverage mask", d))?;
            entries.push(wgpu::BindGroupEntry {
                binding: binding::MASK,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umber paint bind group"),
            layout: pipeline.bind_group_layout(),
            entries: &entries,
        });

        rpass.set_pipeline(pipeline.render_pipeline());
        rpass.set_bind_group(0, &bind_group, &[]);
        Ok(())
    }

    fn uniform_buffer(&mut self, ctx: &RenderCtx<'_>, encoded: &PaintUniforms) -> wgpu::Buffer {
        if let Some((last, buffer)) = &self.uniforms {
            if last == encoded {
                return buffer.clone();
            }
        }

        let buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("umber paint uniforms"),
            contents: encoded.as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        self.uploads += 1;
        log::trace!("paint uniforms uploaded ({} total)", self.uploads);
        self.uniforms = Some((*encoded, buffer.clone()));
        buffer
    }
}

/// Checks that `d` was derived from a paint of the same shape as `state`.
fn check_matches(d: &PipelineDescriptor, state: &PaintState, composite: &Composite) -> Result<()> {
    let paint = state.paint();
    let kind = paint.kind().ok_or(PaintError::NoActivePaint)?;
    if kind != d.kind
        || state.use_mask() != d.use_mask
        || paint.cycle() != d.cycle
        || paint.texture_filter() != d.filter
        || composite.rule != d.rule
    {
        return Err(PaintError::InvalidState(format!(
            "pipeline [{d}] does not match paint `{state}` with {}",
            composite.rule
        )));
    }
    Ok(())
}

fn missing(what: &str, d: &PipelineDescriptor) -> PaintError {
    PaintError::InvalidState(format!("pipeline [{d}] samples a {what} but none was provided"))
}
