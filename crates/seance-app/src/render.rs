//! GPU state and the per-frame pass sequence: static noise and particle
//! fields into an HDR target, bright/blur bloom, then a composite pass that
//! applies the analog-decay treatment and presents.

mod helpers;
mod particles;
mod post;
mod statik;
mod targets;

pub(crate) use particles::FieldGpu;
pub(crate) use post::AnalogParams;
pub(crate) use statik::StaticUniforms;

use anyhow::anyhow;
use post::{PostResources, PostUniforms};
use seance_core::constants::{RASTER_HEIGHT, RASTER_WIDTH};
use seance_core::FieldModel;
use winit::window::Window;

/// Everything the composite pass needs for one frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PostFrame {
    pub time: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub crt: f32,
    pub bass: f32,
}

pub struct GpuState<'w> {
    pub(crate) window: &'w Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    targets: targets::RenderTargets,
    linear_sampler: wgpu::Sampler,
    post: PostResources,
    bg_bright: wgpu::BindGroup,
    bg_blur_h: wgpu::BindGroup,
    bg_blur_v: wgpu::BindGroup,
    bg_composite: wgpu::BindGroup,
    bg_bloom_only: wgpu::BindGroup,

    statik: statik::StaticPipeline,
    particles: particles::ParticleRenderer,
    analog: AnalogParams,

    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'w> GpuState<'w> {
    pub async fn new(window: &'w Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .unwrap_or(caps.formats[0]);
        let width = size.width.max(1);
        let height = size.height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let targets = targets::RenderTargets::new(&device, width, height);
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let post = post::create_post_resources(&device, targets::RenderTargets::HDR_FORMAT, format);
        let statik = statik::StaticPipeline::new(&device, targets::RenderTargets::HDR_FORMAT);
        let particles =
            particles::ParticleRenderer::new(&device, targets::RenderTargets::HDR_FORMAT);

        let (bg_bright, bg_blur_h, bg_blur_v, bg_composite, bg_bloom_only) =
            Self::build_post_bind_groups(&device, &post, &targets, &linear_sampler);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            targets,
            linear_sampler,
            post,
            bg_bright,
            bg_blur_h,
            bg_blur_v,
            bg_composite,
            bg_bloom_only,
            statik,
            particles,
            analog: AnalogParams::default(),
            width,
            height,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.005,
                a: 1.0,
            },
        })
    }

    fn build_post_bind_groups(
        device: &wgpu::Device,
        post: &PostResources,
        targets: &targets::RenderTargets,
        sampler: &wgpu::Sampler,
    ) -> (
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
    ) {
        let bg0 = |label: &str, view: &wgpu::TextureView, buf: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &post.bgl0,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buf.as_entire_binding(),
                    },
                ],
            })
        };
        let bg_bright = bg0("bg_bright", &targets.hdr_view, &post.bright_buf);
        let bg_blur_h = bg0("bg_blur_h", &targets.bloom_a_view, &post.blur_h_buf);
        let bg_blur_v = bg0("bg_blur_v", &targets.bloom_b_view, &post.blur_v_buf);
        let bg_composite = bg0("bg_composite", &targets.hdr_view, &post.composite_buf);
        let bg_bloom_only = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg_bloom_only"),
            layout: &post.bgl1,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        (bg_bright, bg_blur_h, bg_blur_v, bg_composite, bg_bloom_only)
    }

    #[inline]
    pub(crate) fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    #[inline]
    pub(crate) fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Allocate GPU resources for a freshly built field model.
    pub(crate) fn create_field(&self, model: &FieldModel) -> FieldGpu {
        FieldGpu::new(
            &self.device,
            &self.particles,
            model,
            (RASTER_WIDTH, RASTER_HEIGHT),
        )
    }

    /// Re-acquire the swapchain at the current size after a lost surface.
    pub(crate) fn reconfigure_surface(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Swapchain resize; applied immediately so presentation never goes
    /// stale. The offscreen targets are re-laid-out separately (debounced by
    /// the frame loop) since they are sampled with normalized coordinates.
    pub(crate) fn resize_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Recreate the HDR/bloom targets and their bind groups at the current
    /// surface size.
    pub(crate) fn relayout_targets(&mut self) {
        self.targets.recreate(&self.device, self.width, self.height);
        let (bg_bright, bg_blur_h, bg_blur_v, bg_composite, bg_bloom_only) =
            Self::build_post_bind_groups(&self.device, &self.post, &self.targets, &self.linear_sampler);
        self.bg_bright = bg_bright;
        self.bg_blur_h = bg_blur_h;
        self.bg_blur_v = bg_blur_v;
        self.bg_composite = bg_composite;
        self.bg_bloom_only = bg_bloom_only;
    }

    /// Encode and present one frame.
    pub(crate) fn render(
        &mut self,
        statik_u: &StaticUniforms,
        fields: &[&FieldGpu],
        post_frame: &PostFrame,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.statik.write(&self.queue, statik_u);
        self.write_post_uniforms(post_frame);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.statik.draw(&mut rpass);
            for field in fields {
                field.draw(&mut rpass, &self.particles);
            }
        }

        post::blit(
            &mut encoder,
            "bright_pass",
            &self.targets.bloom_a_view,
            wgpu::Color::BLACK,
            &self.post.bright_pipeline,
            &self.bg_bright,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_h",
            &self.targets.bloom_b_view,
            wgpu::Color::BLACK,
            &self.post.blur_pipeline,
            &self.bg_blur_h,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_v",
            &self.targets.bloom_a_view,
            wgpu::Color::BLACK,
            &self.post.blur_pipeline,
            &self.bg_blur_v,
            None,
        );
        post::blit(
            &mut encoder,
            "composite",
            &view,
            wgpu::Color::BLACK,
            &self.post.composite_pipeline,
            &self.bg_composite,
            Some(&self.bg_bloom_only),
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn write_post_uniforms(&self, pf: &PostFrame) {
        let a = self.analog;
        let analog_a = [a.intensity, a.grain, a.bleeding, a.scanlines];
        let analog_b = [a.vignette, a.jitter, a.vsync, pf.bass];
        let base = PostUniforms {
            resolution: [self.width as f32 / 2.0, self.height as f32 / 2.0],
            time: pf.time,
            bloom_strength: pf.bloom_strength,
            blur_dir: [0.0, 0.0],
            threshold: pf.bloom_threshold,
            crt: pf.crt,
            analog_a,
            analog_b,
        };
        let write = |buf: &wgpu::Buffer, u: PostUniforms| {
            self.queue.write_buffer(buf, 0, bytemuck::bytes_of(&u));
        };
        write(&self.post.bright_buf, base);
        // The radius scales the separable blur's tap spacing.
        write(
            &self.post.blur_h_buf,
            PostUniforms {
                blur_dir: [pf.bloom_radius, 0.0],
                ..base
            },
        );
        write(
            &self.post.blur_v_buf,
            PostUniforms {
                blur_dir: [0.0, pf.bloom_radius],
                ..base
            },
        );
        write(
            &self.post.composite_buf,
            PostUniforms {
                resolution: [self.width as f32, self.height as f32],
                ..base
            },
        );
    }
}
