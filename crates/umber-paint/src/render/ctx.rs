/// Renderer-facing context (device + target format + viewport).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    /// Format of the color attachment draws land in.
    pub target_format: wgpu::TextureFormat,
    /// Destination size in device pixels.
    pub viewport: [f32; 2],
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, target_format: wgpu::TextureFormat, viewport: [f32; 2]) -> Self {
        Self {
            device,
            target_format,
            viewport,
        }
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    /// Begins a single-attachment pass. `clear` of `None` keeps existing contents.
    pub fn begin_pass(&mut self, clear: Option<wgpu::Color>) -> wgpu::RenderPass<'_> {
        let load = match clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umber paint pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
