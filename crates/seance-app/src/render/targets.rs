use super::helpers;
use wgpu;

/// Offscreen color targets: a full-resolution HDR scene texture and two
/// half-resolution bloom ping-pong buffers, all Rgba16Float.
pub(crate) struct RenderTargets {
    pub(crate) hdr_view: wgpu::TextureView,
    pub(crate) bloom_a_view: wgpu::TextureView,
    pub(crate) bloom_b_view: wgpu::TextureView,
}

impl RenderTargets {
    pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let (_, hdr_view) =
            helpers::create_color_texture(device, "hdr_tex", width, height, Self::HDR_FORMAT, usage);
        let bw = (width.max(1) / 2).max(1);
        let bh = (height.max(1) / 2).max(1);
        let (_, bloom_a_view) =
            helpers::create_color_texture(device, "bloom_a", bw, bh, Self::HDR_FORMAT, usage);
        let (_, bloom_b_view) =
            helpers::create_color_texture(device, "bloom_b", bw, bh, Self::HDR_FORMAT, usage);
        Self {
            hdr_view,
            bloom_a_view,
            bloom_b_view,
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }
}
