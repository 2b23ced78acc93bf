use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};

use crate::encode::PaintUniforms;
use crate::paint::{PaintKind, TextureFilter};

use super::{shader, PipelineBuilder, PipelineDescriptor, PipelineInit};

/// Binding slots of the paint bind group (group 0).
pub(crate) mod binding {
    pub const UNIFORMS: u32 = 0;
    pub const SAMPLER: u32 = 1;
    pub const PAINT_TEXTURE: u32 = 2;
    pub const SOURCE_TEXTURE: u32 = 3;
    pub const MASK: u32 = 4;
}

/// Vertex consumed by every paint pipeline.
///
/// `pos` is in device pixels. `uv` addresses the source texture of texture
/// draws and `mask_uv` the coverage mask; both are ignored by pipelines that
/// do not bind them.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PaintVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub mask_uv: [f32; 2],
}

impl PaintVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x2  // mask_uv
    ];

    #[inline]
    pub const fn new(pos: [f32; 2]) -> Self {
        Self { pos, uv: [0.0; 2], mask_uv: [0.0; 2] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PaintVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// A built paint pipeline plus the objects needed to bind it.
#[derive(Debug)]
pub struct PaintPipeline {
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: Option<wgpu::Sampler>,
    descriptor: PipelineDescriptor,
    target_format: wgpu::TextureFormat,
}

impl PaintPipeline {
    #[inline]
    pub fn render_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.render_pipeline
    }

    #[inline]
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Present iff the descriptor needs a sampler.
    #[inline]
    pub fn sampler(&self) -> Option<&wgpu::Sampler> {
        self.sampler.as_ref()
    }

    #[inline]
    pub fn descriptor(&self) -> &PipelineDescriptor {
        &self.descriptor
    }

    /// Color attachment format the pipeline was compiled for.
    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }
}

/// Compiles paint pipelines on a wgpu device.
///
/// Validation errors raised while building are captured in an error scope and
/// reported as build failures instead of reaching the device's uncaptured
/// error handler.
pub struct WgpuPipelineBuilder {
    device: wgpu::Device,
    init: PipelineInit,
}

impl WgpuPipelineBuilder {
    pub fn new(device: wgpu::Device, init: PipelineInit) -> Self {
        Self { device, init }
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn init(&self) -> &PipelineInit {
        &self.init
    }

    fn label(&self, what: &str, d: &PipelineDescriptor) -> String {
        format!("{} paint {what} [{d}]", self.init.label_prefix)
    }

    fn create_objects(&self, d: &PipelineDescriptor, source: String) -> PaintPipeline {
        let device = &self.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label("shader", d)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let entries = layout_entries(d);
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&self.label("bgl", d)),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&self.label("pipeline layout", d)),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&self.label("pipeline", d)),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PaintVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.init.target_format,
                    blend: Some(d.rule.blend_state(d.dst_flags)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: self.init.sample_count.max(1),
                ..Default::default()
            },

            multiview_mask: None,
            cache: None,
        });

        let sampler = d.needs_sampler().then(|| {
            let filter = match d.filter.unwrap_or_default() {
                TextureFilter::Nearest => wgpu::FilterMode::Nearest,
                TextureFilter::Bilinear => wgpu::FilterMode::Linear,
            };
            // Texture paints tile; masks and source textures never leave [0, 1].
            let address_mode = if d.kind == PaintKind::Texture {
                wgpu::AddressMode::Repeat
            } else {
                wgpu::AddressMode::ClampToEdge
            };
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(&self.label("sampler", d)),
                address_mode_u: address_mode,
                address_mode_v: address_mode,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        PaintPipeline {
            render_pipeline,
            bind_group_layout,
            sampler,
            descriptor: *d,
            target_format: self.init.target_format,
        }
    }
}

impl PipelineBuilder for WgpuPipelineBuilder {
    type Pipeline = PaintPipeline;

    fn build(&self, descriptor: &PipelineDescriptor) -> Result<PaintPipeline> {
        let source = shader::specialize(descriptor)
            .with_context(|| format!("failed to specialize paint shader for {descriptor}"))?;

        // The scope guard is not Send; it must be popped on this thread.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.create_objects(descriptor, source);
        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(anyhow!("wgpu validation failed: {err}"));
        }

        log::debug!("compiled paint pipeline {descriptor} ({:?})", self.init.target_format);
        Ok(pipeline)
    }
}

fn layout_entries(d: &PipelineDescriptor) -> Vec<wgpu::BindGroupLayoutEntry> {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: binding::UNIFORMS,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<PaintUniforms>() as u64),
        },
        count: None,
    }];

    if d.needs_sampler() {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: binding::SAMPLER,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    if d.kind == PaintKind::Texture {
        entries.push(texture(binding::PAINT_TEXTURE));
    }
    if d.is_texture {
        entries.push(texture(binding::SOURCE_TEXTURE));
    }
    if d.use_mask {
        entries.push(texture(binding::MASK));
    }
    entries
}
