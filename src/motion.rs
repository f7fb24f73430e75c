//! CPU mirror of the tunnel shader, stage by stage.
//!
//! `shader.wgsl` is the copy the GPU runs; these are the same pure
//! functions over f32 so the animation math can be exercised off-GPU.
//! Constants here and in the WGSL must stay in lockstep.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Vec2, Vec3};

use crate::palette::Palette;

/// Period of the repeating depth axis, in world units. Instances cycle
/// from the far end back to the mouth every `DEPTH_LOOP / 15` seconds.
pub const DEPTH_LOOP: f32 = 80.0;

/// Everything the vertex stage hands to the fragment stage, plus the
/// world-space position (the GPU applies view-projection after this).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexOutput {
    pub world: Vec3,
    pub uv: Vec2,
    pub depth: f32,
    pub angle: f32,
}

/// Instance position along the repeating depth axis. Floor-mod, not
/// truncation: the argument goes negative as soon as `time * 15`
/// overtakes `ring_index * 2`.
pub fn z_pos(ring_index: f32, time: f32) -> f32 {
    (ring_index * 2.0 - time * 15.0).rem_euclid(DEPTH_LOOP)
}

/// Ring azimuth as a fraction of a turn, wrapped into [0, 1): the
/// static per-instance offset plus a slow global spin and a
/// depth-dependent twist.
pub fn azimuth(angle_fraction: f32, time: f32, z: f32) -> f32 {
    (angle_fraction + time * 0.1 + z * 0.01).rem_euclid(1.0)
}

/// Distance of the ring from the tunnel axis; breathes ±2 around 10.
pub fn ring_radius(z: f32, angle: f32, time: f32) -> f32 {
    10.0 + (z * 0.1 + angle * TAU + time).sin() * 2.0
}

/// Placement of the instance in the plane perpendicular to the tunnel
/// axis.
pub fn ring_pos(angle: f32, radius: f32) -> Vec2 {
    Vec2::new((angle * TAU).cos(), (angle * TAU).sin()) * radius
}

/// The tube's lengthwise deformation: an undulating stretch about the
/// template midline, then a fixed remap to roughly double length. Two
/// separate affine passes on purpose; the constants must not be folded
/// together.
pub fn stretch_y(y: f32, angle: f32, z: f32) -> f32 {
    let wobble = 1.2 + (angle * PI * 12.0 + z * 0.08).sin() * 0.4;
    let y = (y - 0.5) * wobble + 0.5;
    (y + 0.5) * 2.0 - 0.5
}

/// Axis-angle rotation matching the shader's `rotate` helper. The WGSL
/// builds its matrix column-major from row-major entries, so it applies
/// the transpose of the textbook rotation, i.e. rotation by `-angle`.
fn rotate(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    Mat3::from_axis_angle(axis.normalize(), -angle) * v
}

/// Vertex stage: template vertex + instance attributes + time to world
/// position and varyings. No validation anywhere in this pipeline;
/// degenerate input propagates as-is.
pub fn vertex_stage(
    position: Vec3,
    uv: Vec2,
    angle_fraction: f32,
    ring_index: f32,
    time: f32,
) -> VertexOutput {
    let z = z_pos(ring_index, time);
    let angle = azimuth(angle_fraction, time, z);
    let radius = ring_radius(z, angle, time);
    let placement = ring_pos(angle, radius);

    let stretched = Vec3::new(position.x, stretch_y(position.y, angle, z), position.z);

    // Lay the tube over (90° off its template axis), then swing it
    // around the tunnel so every instance faces the center.
    let oriented = rotate(stretched, Vec3::Z, PI * 0.5);
    let oriented = rotate(oriented, Vec3::Y, angle * TAU);

    let world = Vec3::new(
        oriented.x + placement.x,
        oriented.y - z,
        oriented.z + placement.y,
    );

    // End caps get the gradient extremes rather than an interpolated
    // template value.
    let mut uv = uv;
    if position.y > 0.49999 {
        uv.y = 1.0;
    }
    if position.y < -0.49999 {
        uv.y = 0.0;
    }

    VertexOutput {
        world,
        uv,
        depth: z / DEPTH_LOOP,
        angle,
    }
}

/// The classic 4-vector cosine palette: `a + b*cos(2π*(c*t + d))`
/// component-wise.
pub fn cosine_palette(t: f32, coeffs: &[Vec3; 4]) -> Vec3 {
    let [a, b, c, d] = *coeffs;
    let phase = (c * t + d) * TAU;
    a + b * Vec3::new(phase.x.cos(), phase.y.cos(), phase.z.cos())
}

/// GLSL-style mix: `x*(1-t) + y*t`, extrapolating outside [0, 1].
fn mix(x: Vec3, y: Vec3, t: f32) -> Vec3 {
    x * (1.0 - t) + y * t
}

/// Fragment stage: palette sample, banding pulse toward the background,
/// then a linear depth fade into it. Alpha is always 1.
pub fn fragment_stage(uv: Vec2, depth: f32, angle: f32, time: f32, palette: &Palette) -> Vec3 {
    let sample = cosine_palette(
        uv.y + depth * 4.0 + palette.offset + time,
        &palette.coeffs,
    );
    let band = ((depth + angle) * PI * 4.0 + time * 2.0).cos();
    let color = mix(sample, palette.background, band);
    mix(color, palette.background, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Palette, PALETTE_KEYS};

    fn assert_close(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "{a} vs {b}");
    }

    #[test]
    fn z_pos_cycles_with_the_depth_loop() {
        let period = DEPTH_LOOP / 15.0;
        for ring in [0.0, 7.0, 39.0] {
            for t in [0.0, 0.37, 12.5, 100.0] {
                assert_close(z_pos(ring, t), z_pos(ring, t + period), 1e-2);
            }
        }
    }

    #[test]
    fn z_pos_stays_in_range_once_time_overtakes() {
        for t in [0.0, 1.0, 33.3, 1234.5] {
            for ring in 0..40 {
                let z = z_pos(ring as f32, t);
                assert!((0.0..DEPTH_LOOP).contains(&z), "z={z} at t={t}");
            }
        }
    }

    #[test]
    fn azimuth_always_wraps_to_unit_range() {
        for t in [0.0, 9.9, 505.0] {
            for z in [0.0, 79.9] {
                for frac in [0.0, 0.5, 0.96875] {
                    let a = azimuth(frac, t, z);
                    assert!((0.0..1.0).contains(&a), "angle={a}");
                }
            }
        }
    }

    #[test]
    fn ring_radius_breathes_within_two_units() {
        for t in [0.0, 3.7, 88.0] {
            for z in [0.0, 11.0, 79.0] {
                for a in [0.0, 0.25, 0.7] {
                    let r = ring_radius(z, a, t);
                    assert!((8.0..=12.0).contains(&r), "radius={r}");
                }
            }
        }
    }

    #[test]
    fn first_instance_at_time_zero() {
        // angle_fraction = 0, ring_index = 0, t = 0.
        assert_eq!(z_pos(0.0, 0.0), 0.0);
        assert_eq!(azimuth(0.0, 0.0, 0.0), 0.0);
        assert_eq!(ring_radius(0.0, 0.0, 0.0), 10.0);
        let p = ring_pos(0.0, 10.0);
        assert_close(p.x, 10.0, 1e-6);
        assert_close(p.y, 0.0, 1e-6);
    }

    #[test]
    fn stretch_doubles_the_tube_around_its_anchor() {
        // At angle 0, depth 0 the wobble term is sin(0), so the scale is
        // exactly 1.2 and the remap doubles it.
        assert_close(stretch_y(0.5, 0.0, 0.0), 1.5, 1e-6);
        assert_close(stretch_y(-0.5, 0.0, 0.0), -0.9, 1e-6);
        let len = stretch_y(0.5, 0.0, 0.0) - stretch_y(-0.5, 0.0, 0.0);
        assert_close(len, 2.0 * 1.2, 1e-6);
    }

    #[test]
    fn cap_vertices_get_forced_uv_extremes() {
        let out = vertex_stage(Vec3::new(0.1, 0.5, 0.0), Vec2::new(0.3, 0.7), 0.2, 5.0, 1.0);
        assert_eq!(out.uv.y, 1.0);
        let out = vertex_stage(Vec3::new(0.1, -0.5, 0.0), Vec2::new(0.3, 0.7), 0.2, 5.0, 1.0);
        assert_eq!(out.uv.y, 0.0);
        // Interior vertices pass the template value through.
        let out = vertex_stage(Vec3::new(0.1, 0.0, 0.0), Vec2::new(0.3, 0.7), 0.2, 5.0, 1.0);
        assert_eq!(out.uv.y, 0.7);
        assert_eq!(out.uv.x, 0.3);
    }

    #[test]
    fn top_center_vertex_lands_radially_outward() {
        // Instance (0, 0) at t = 0 sits at ring_pos (10, 0) with z = 0;
        // the tube's top center stretches to local y = 1.5 and the two
        // rotations point it along +X.
        let out = vertex_stage(Vec3::new(0.0, 0.5, 0.0), Vec2::ZERO, 0.0, 0.0, 0.0);
        assert_close(out.world.x, 11.5, 1e-4);
        assert_close(out.world.y, 0.0, 1e-4);
        assert_close(out.world.z, 0.0, 1e-4);
        assert_eq!(out.depth, 0.0);
        assert_eq!(out.angle, 0.0);
    }

    #[test]
    fn varyings_track_depth_and_angle() {
        let out = vertex_stage(Vec3::ZERO, Vec2::ZERO, 0.25, 12.0, 0.0);
        assert_close(out.depth, z_pos(12.0, 0.0) / DEPTH_LOOP, 1e-6);
        assert_close(out.angle, azimuth(0.25, 0.0, z_pos(12.0, 0.0)), 1e-6);
    }

    #[test]
    fn cosine_palette_has_unit_period() {
        for key in PALETTE_KEYS {
            let p = Palette::get(key).unwrap();
            for t in [0.0, 0.3, 2.71] {
                let a = cosine_palette(t, &p.coeffs);
                let b = cosine_palette(t + 1.0, &p.coeffs);
                assert!((a - b).abs().max_element() < 1e-4, "{key} at t={t}");
            }
        }
    }

    #[test]
    fn cosine_palette_at_zero_is_bias_plus_phased_amplitude() {
        let p = Palette::get("blue").unwrap();
        let [a, b, _, d] = p.coeffs;
        let got = cosine_palette(0.0, &p.coeffs);
        let want = a + b * Vec3::new(
            (d.x * TAU).cos(),
            (d.y * TAU).cos(),
            (d.z * TAU).cos(),
        );
        assert!((got - want).abs().max_element() < 1e-6);
    }

    #[test]
    fn full_depth_fades_exactly_to_background() {
        let p = Palette::get("blue").unwrap();
        for angle in [0.0, 0.33, 0.9] {
            for t in [0.0, 5.5, 42.0] {
                let c = fragment_stage(Vec2::new(0.0, 0.5), 1.0, angle, t, &p);
                assert_eq!(c, p.background);
            }
        }
    }

    #[test]
    fn band_mix_extrapolates_like_glsl() {
        // cos() factors outside [0, 1] must extrapolate, not clamp, or
        // the pulsing loses its overshoot.
        let x = Vec3::new(0.2, 0.4, 0.6);
        let y = Vec3::new(1.0, 1.0, 1.0);
        let out = mix(x, y, -1.0);
        assert!((out - (x * 2.0 - y)).abs().max_element() < 1e-6);
    }
}
