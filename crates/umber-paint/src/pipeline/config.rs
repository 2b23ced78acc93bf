/// Initialization parameters for the wgpu pipeline backend.
///
/// Keep this structure small. Anything that changes the shape of a pipeline per
/// draw belongs in [`PipelineDescriptor`](super::PipelineDescriptor) instead.
#[derive(Debug, Clone)]
pub struct PipelineInit {
    /// Color format of the render targets the pipelines draw into.
    pub target_format: wgpu::TextureFormat,

    /// MSAA sample count of the render targets.
    pub sample_count: u32,

    /// Prefix for wgpu debug labels.
    pub label_prefix: String,
}

impl Default for PipelineInit {
    fn default() -> Self {
        Self {
            target_format: wgpu::TextureFormat::Rgba8Unorm,
            sample_count: 1,
            label_prefix: "umber".to_owned(),
        }
    }
}
