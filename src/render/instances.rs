//! Per-instance data for the instanced tunnel draw.
//!
//! One 8-byte record per tube segment, generated once at startup and
//! uploaded as an instance-rate vertex buffer; nothing touches it again
//! for the rest of the session.

/// Per-tube instance data: where the segment sits on its ring and which
/// ring it belongs to. Everything else the shader derives from these
/// two scalars plus time.
///
/// 8 bytes (2 floats). Shader location 3 (per-vertex attributes occupy
/// 0–2).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TubeInstance {
    /// Fraction of a full turn around the ring, in [0, 1).
    pub angle_fraction: f32,
    /// Which ring along the tunnel, 0-based, stored as f32 for the GPU.
    pub ring_index: f32,
}

impl TubeInstance {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TubeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

/// Lay out the full grid of ring × segment instances, ring-major.
/// Deterministic; slot `ring * segments + segment` always maps to the
/// same (ring, segment) pair. Zero dimensions yield an empty buffer;
/// accepted, not rejected.
pub fn tube_instances(rings: u32, segments: u32) -> Vec<TubeInstance> {
    let mut out = Vec::with_capacity((rings * segments) as usize);
    for ring in 0..rings {
        for segment in 0..segments {
            out.push(TubeInstance {
                angle_fraction: segment as f32 / segments as f32,
                ring_index: ring as f32,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_two_packed_floats() {
        assert_eq!(std::mem::size_of::<TubeInstance>(), 8);
    }

    #[test]
    fn grid_is_ring_major_with_unit_angle_fractions() {
        let rings = 40;
        let segments = 32;
        let grid = tube_instances(rings, segments);
        assert_eq!(grid.len(), (rings * segments) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let inst = grid[(ring * segments + segment) as usize];
                assert_eq!(inst.ring_index, ring as f32);
                assert_eq!(inst.angle_fraction, segment as f32 / segments as f32);
                assert!((0.0..1.0).contains(&inst.angle_fraction));
            }
        }
    }

    #[test]
    fn two_by_four_grid_packs_exactly() {
        let grid = tube_instances(2, 4);
        let flat: Vec<f32> = bytemuck::cast_slice(&grid).to_vec();
        assert_eq!(
            flat,
            vec![
                0.0, 0.0, 0.25, 0.0, 0.5, 0.0, 0.75, 0.0, //
                0.0, 1.0, 0.25, 1.0, 0.5, 1.0, 0.75, 1.0,
            ]
        );
    }

    #[test]
    fn zero_dimensions_yield_empty_grids() {
        assert!(tube_instances(0, 32).is_empty());
        assert!(tube_instances(40, 0).is_empty());
    }
}
