/// 32-byte vertex: position (12), normal (12), uv (8).
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 24,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Build the shared tube template: a unit-height capped cylinder
/// centered on the origin, length along Y, `radial_segments` around and
/// `height_segments` along. The seam column is duplicated so uv.x runs
/// a clean 0..1; side uv.y runs 0 at the bottom rim to 1 at the top.
///
/// Every instance of the tunnel renders this one mesh; the vertex
/// shader does all per-instance placement and deformation.
pub fn build_tube_mesh(
    radius: f32,
    radial_segments: u32,
    height_segments: u32,
) -> (Vec<Vertex>, Vec<u16>) {
    let cols = radial_segments + 1;
    let mut verts = Vec::new();
    let mut indices = Vec::new();

    // Side wall rows, bottom to top.
    for row in 0..=height_segments {
        let v = row as f32 / height_segments as f32;
        let y = v - 0.5;
        for col in 0..cols {
            let u = col as f32 / radial_segments as f32;
            let theta = u * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            verts.push(Vertex {
                position: [cos * radius, y, sin * radius],
                normal: [cos, 0.0, sin],
                uv: [u, v],
            });
        }
    }

    for row in 0..height_segments {
        let below = row * cols;
        let above = below + cols;
        for col in 0..radial_segments {
            let a = (below + col) as u16;
            let b = a + 1;
            let c = (above + col) as u16;
            let d = c + 1;
            indices.extend_from_slice(&[a, b, d, a, d, c]);
        }
    }

    // End caps: center plus a rim ring each, fanned out. Cap uv.y sits
    // at the gradient extreme for its end; the shader forces the same
    // value from the cap's y position, so the two agree.
    for (y, normal_y, v) in [(0.5_f32, 1.0_f32, 1.0_f32), (-0.5, -1.0, 0.0)] {
        let center = verts.len() as u16;
        verts.push(Vertex {
            position: [0.0, y, 0.0],
            normal: [0.0, normal_y, 0.0],
            uv: [0.5, v],
        });
        let rim = verts.len() as u16;
        for col in 0..cols {
            let u = col as f32 / radial_segments as f32;
            let theta = u * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            verts.push(Vertex {
                position: [cos * radius, y, sin * radius],
                normal: [0.0, normal_y, 0.0],
                uv: [u, v],
            });
        }
        for col in 0..radial_segments {
            let i = rim + col as u16;
            if normal_y > 0.0 {
                indices.extend_from_slice(&[center, i, i + 1]);
            } else {
                indices.extend_from_slice(&[center, i + 1, i]);
            }
        }
    }

    (verts, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_counts_match_subdivisions() {
        let (verts, indices) = build_tube_mesh(2.0 / 3.0, 8, 2);
        // side rows + two caps (center + duplicated-seam rim each)
        assert_eq!(verts.len(), (2 + 1) * (8 + 1) + 2 * (8 + 2));
        // side quads + cap fans
        assert_eq!(indices.len(), (2 * 8 * 6) + (2 * 8 * 3));
    }

    #[test]
    fn template_spans_unit_height() {
        let (verts, _) = build_tube_mesh(2.0 / 3.0, 8, 2);
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (-0.5..=0.5).contains(y)));
        assert!(ys.contains(&0.5));
        assert!(ys.contains(&-0.5));
    }

    #[test]
    fn wall_vertices_sit_on_the_radius() {
        let radius = 2.0 / 3.0;
        let (verts, _) = build_tube_mesh(radius, 8, 2);
        for v in verts.iter().filter(|v| v.normal[1] == 0.0) {
            let r = (v.position[0].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - radius).abs() < 1e-5, "wall vertex off-radius: {r}");
        }
    }

    #[test]
    fn side_uv_runs_bottom_to_top() {
        let (verts, _) = build_tube_mesh(2.0 / 3.0, 8, 2);
        for v in verts.iter().filter(|v| v.normal[1] == 0.0) {
            let expected = v.position[1] + 0.5;
            assert!((v.uv[1] - expected).abs() < 1e-6);
            assert!((0.0..=1.0).contains(&v.uv[0]));
        }
    }

    #[test]
    fn indices_stay_in_bounds() {
        let (verts, indices) = build_tube_mesh(2.0 / 3.0, 8, 2);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
        assert_eq!(indices.len() % 3, 0);
    }
}
