use wgpu::util::DeviceExt;

use super::instances::{tube_instances, TubeInstance};
use super::mesh::Vertex;
use crate::palette::Palette;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The one uniform block shared by both shader stages: camera matrix,
/// active palette, and the per-frame time. 160 bytes, rewritten whole
/// every frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TunnelUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub background: [f32; 4],
    pub palette0: [f32; 4],
    pub palette1: [f32; 4],
    pub palette2: [f32; 4],
    pub palette3: [f32; 4],
    /// x = time in seconds, y = palette offset.
    pub params: [f32; 4],
}

impl TunnelUniforms {
    pub fn new(view_proj: glam::Mat4, palette: &Palette, time: f32) -> Self {
        let v4 = |v: glam::Vec3| [v.x, v.y, v.z, 0.0];
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            background: v4(palette.background),
            palette0: v4(palette.coeffs[0]),
            palette1: v4(palette.coeffs[1]),
            palette2: v4(palette.coeffs[2]),
            palette3: v4(palette.coeffs[3]),
            params: [time, palette.offset, 0.0, 0.0],
        }
    }
}

/// Pipeline plus every GPU buffer the tunnel needs. The vertex, index,
/// and instance buffers are filled once here and never written again;
/// only the uniform buffer changes after startup.
pub struct TunnelPipeline {
    pub pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub instance_buffer: wgpu::Buffer,
    pub instance_count: u32,
    pub depth_view: wgpu::TextureView,
}

impl TunnelPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        vertices: &[Vertex],
        indices: &[u16],
        rings: u32,
        segments: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tunnel shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tunnel uniforms"),
            size: std::mem::size_of::<TunnelUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tunnel bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TunnelUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tunnel bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tunnel pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tunnel pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), TubeInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The camera lives inside the tunnel; both faces matter.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tube vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tube indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let grid = tube_instances(rings, segments);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tube instances"),
            contents: bytemuck::cast_slice(&grid),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_view = Self::create_depth_view(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
            instance_buffer,
            instance_count: grid.len() as u32,
            depth_view,
        }
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize_depth(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = Self::create_depth_view(device, width, height);
    }

    /// The frame driver's single write: the whole block goes up fresh.
    pub fn upload_uniforms(&self, queue: &wgpu::Queue, uniforms: &TunnelUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    #[test]
    fn uniform_block_is_tightly_packed_vec4s() {
        // mat4 + 6 vec4s; anything else means the WGSL struct drifted.
        assert_eq!(std::mem::size_of::<TunnelUniforms>(), 64 + 6 * 16);
    }

    #[test]
    fn uniforms_carry_palette_and_time() {
        let palette = Palette::get("blue").unwrap();
        let u = TunnelUniforms::new(glam::Mat4::IDENTITY, &palette, 3.5);
        assert_eq!(u.params[0], 3.5);
        assert_eq!(u.params[1], palette.offset);
        assert_eq!(u.background[..3], palette.background.to_array());
        assert_eq!(u.palette2[..3], palette.coeffs[2].to_array());
        assert_eq!(u.view_proj, glam::Mat4::IDENTITY.to_cols_array_2d());
    }
}
