use std::sync::Arc;
use winit::window::Window;

use crate::config::TunnelConfig;
use crate::render::mesh::build_tube_mesh;
use crate::render::pipeline::{TunnelPipeline, TunnelUniforms};
use crate::ui::Overlay;

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub window: Arc<Window>,
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("request adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tubeloop device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .expect("request device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
            window,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// Owns all GPU rendering state: device, tunnel pipeline, overlay.
/// Created once on window open, used each frame for drawing.
pub struct RenderEngine {
    pub gpu: GpuState,
    pub tunnel: TunnelPipeline,
    pub overlay: Overlay,
}

impl RenderEngine {
    pub fn new(window: Arc<Window>, tunnel_cfg: &TunnelConfig) -> Self {
        let gpu = GpuState::new(window.clone());

        let (vertices, indices) = build_tube_mesh(
            tunnel_cfg.tube_radius,
            tunnel_cfg.radial_segments,
            tunnel_cfg.height_segments,
        );
        let tunnel = TunnelPipeline::new(
            &gpu.device,
            gpu.config.format,
            gpu.config.width,
            gpu.config.height,
            &vertices,
            &indices,
            tunnel_cfg.rings,
            tunnel_cfg.segments,
        );

        let overlay = Overlay::new(&gpu.device, gpu.config.format, window);

        Self {
            gpu,
            tunnel,
            overlay,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.tunnel
            .resize_depth(&self.gpu.device, width, height);
    }

    /// Upload this frame's uniforms, record the tunnel pass and the
    /// overlay pass, submit. The caller presents the returned texture.
    pub fn draw_and_submit(
        &mut self,
        uniforms: &TunnelUniforms,
        clear: glam::Vec3,
        egui_output: &egui::FullOutput,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.tunnel.upload_uniforms(&self.gpu.queue, uniforms);

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: self.gpu.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });

        let paint_jobs = self.overlay.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &screen,
            egui_output,
        );

        // Tunnel pass: clear to the palette background (the same color
        // the fragment stage fades into) and draw all tubes at once.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tunnel pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x as f64,
                            g: clear.y as f64,
                            b: clear.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.tunnel.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.tunnel.instance_count > 0 {
                pass.set_pipeline(&self.tunnel.pipeline);
                pass.set_bind_group(0, &self.tunnel.bind_group, &[]);
                pass.set_vertex_buffer(0, self.tunnel.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.tunnel.instance_buffer.slice(..));
                pass.set_index_buffer(
                    self.tunnel.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                pass.draw_indexed(0..self.tunnel.num_indices, 0, 0..self.tunnel.instance_count);
            }
        }

        // Overlay pass.
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                })
                .forget_lifetime();
            self.overlay.renderer.render(&mut pass, &paint_jobs, &screen);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.overlay.cleanup(egui_output);
        Ok(output)
    }

    pub fn aspect(&self) -> f32 {
        self.gpu.config.width as f32 / self.gpu.config.height.max(1) as f32
    }
}
