use glam::{Quat, Vec3};

use splat_engine::scene::{Gaussian, SH_C0};

const ARMS: u32 = 3;
const RADIUS: f32 = 4.0;
const CORE_COLOR: Vec3 = Vec3::new(1.0, 0.82, 0.55);
const ARM_COLOR: Vec3 = Vec3::new(0.35, 0.55, 1.0);

/// Deterministic value in [0, 1) for point `i` and channel `salt`.
fn hash01(i: u32, salt: u32) -> f32 {
    let mut x = i.wrapping_mul(0x9e37_79b9) ^ salt.wrapping_mul(0x85eb_ca6b);
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

/// Spiral galaxy of `count` Gaussians centered on the origin.
///
/// Colors carry a degree-1 SH term so view-dependent shading is visible when
/// orbiting.
pub fn spiral_galaxy(count: u32) -> Vec<Gaussian> {
    (0..count)
        .map(|i| {
            let h = |salt| hash01(i, salt);

            let arm = (i % ARMS) as f32;
            let r = RADIUS * h(0).sqrt();
            let falloff = 1.0 - r / RADIUS;
            let angle = arm * std::f32::consts::TAU / ARMS as f32 + r * 1.3 + (h(1) - 0.5) * 0.6;
            let thickness = (h(2) - 0.5) * (0.05 + 0.5 * falloff * falloff);
            let position = Vec3::new(r * angle.cos(), thickness, r * angle.sin());

            let color = ARM_COLOR.lerp(CORE_COLOR, falloff * falloff) * (0.7 + 0.3 * h(3));
            let size = 0.01 + 0.04 * h(4);
            let scale = Vec3::new(size, size * (0.3 + 0.7 * h(5)), size);
            let rotation = Quat::from_euler(
                glam::EulerRot::YXZ,
                h(6) * std::f32::consts::TAU,
                h(7) * std::f32::consts::PI,
                0.0,
            );

            let mut g = Gaussian::solid(position, scale, 0.25 + 0.7 * h(8), color);
            g.rotation = rotation;
            // Slight tint that depends on the viewing direction.
            g.sh[1] = Vec3::new(0.0, 0.0, 0.15) / SH_C0;
            g.sh[3] = Vec3::new(0.15, 0.0, 0.0) / SH_C0;
            g
        })
        .collect()
}
