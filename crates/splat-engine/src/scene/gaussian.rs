use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

/// Number of SH coefficients per color channel (degree 3).
pub const SH_COEFFICIENTS: usize = 16;

/// Highest supported SH degree.
pub const MAX_SH_DEGREE: u32 = 3;

/// Zeroth-order SH basis constant.
pub const SH_C0: f32 = 0.282_094_8;

/// One 3D Gaussian, CPU side.
///
/// `scale` is linear (not log) and `opacity` already activated to [0, 1].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Gaussian {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub opacity: f32,
    /// RGB coefficients, band-major: `sh[0]` is the DC term.
    pub sh: [Vec3; SH_COEFFICIENTS],
}

impl Gaussian {
    /// View-independent Gaussian of the given color.
    pub fn solid(position: Vec3, scale: Vec3, opacity: f32, color: Vec3) -> Self {
        let mut sh = [Vec3::ZERO; SH_COEFFICIENTS];
        sh[0] = (color - Vec3::splat(0.5)) / SH_C0;
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale,
            opacity: opacity.clamp(0.0, 1.0),
            sh,
        }
    }

    /// Color seen along any direction when only the DC term is set.
    pub fn base_color(&self) -> Vec3 {
        (self.sh[0] * SH_C0 + Vec3::splat(0.5)).max(Vec3::ZERO)
    }
}

/// Core attributes as read by `preprocess.wgsl` (48 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GaussianGpu {
    pub pos_opacity: [f32; 4],
    /// Quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    /// Linear scale; `w` unused.
    pub scale: [f32; 4],
}

impl From<&Gaussian> for GaussianGpu {
    fn from(g: &Gaussian) -> Self {
        Self {
            pos_opacity: g.position.extend(g.opacity).to_array(),
            rotation: g.rotation.to_array(),
            scale: g.scale.extend(0.0).to_array(),
        }
    }
}

/// SH coefficients as read by `preprocess.wgsl` (192 bytes).
///
/// The 48 floats are tightly packed, flat index `coefficient * 3 + channel`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShGpu {
    pub coefficients: [[f32; 4]; 12],
}

impl ShGpu {
    pub fn get(&self, coefficient: usize, channel: usize) -> f32 {
        let flat = coefficient * 3 + channel;
        self.coefficients[flat / 4][flat % 4]
    }
}

impl From<&Gaussian> for ShGpu {
    fn from(g: &Gaussian) -> Self {
        let mut out = Self::zeroed();
        for (c, rgb) in g.sh.iter().enumerate() {
            for (ch, value) in rgb.to_array().into_iter().enumerate() {
                let flat = c * 3 + ch;
                out.coefficients[flat / 4][flat % 4] = value;
            }
        }
        out
    }
}
