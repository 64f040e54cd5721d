use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::render::BuildError;

use super::gaussian::{Gaussian, GaussianGpu, ShGpu, MAX_SH_DEGREE};

/// Gaussians uploaded to the GPU. Read-only after construction.
pub struct PointCloud {
    num_points: u32,
    sh_degree: u32,
    bounds: (Vec3, Vec3),

    gaussians: wgpu::Buffer,
    sh_coefficients: wgpu::Buffer,
}

impl PointCloud {
    /// Uploads `gaussians`. `sh_degree` is clamped to [`MAX_SH_DEGREE`].
    pub fn new(
        device: &wgpu::Device,
        gaussians: &[Gaussian],
        sh_degree: u32,
    ) -> Result<Self, BuildError> {
        if gaussians.is_empty() {
            return Err(BuildError::EmptyPointCloud);
        }

        let num_points = u32::try_from(gaussians.len()).map_err(|_| BuildError::BufferTooLarge {
            what: "point cloud",
            size: gaussians.len() as u64,
            limit: u64::from(u32::MAX),
        })?;

        let limits = device.limits();
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        for (what, stride) in [
            ("gaussian buffer", std::mem::size_of::<GaussianGpu>()),
            ("sh buffer", std::mem::size_of::<ShGpu>()),
        ] {
            let size = u64::from(num_points) * stride as u64;
            if size > limit {
                return Err(BuildError::BufferTooLarge { what, size, limit });
            }
        }

        let core: Vec<GaussianGpu> = gaussians.iter().map(GaussianGpu::from).collect();
        let sh: Vec<ShGpu> = gaussians.iter().map(ShGpu::from).collect();

        let gaussians_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gaussians"),
            contents: bytemuck::cast_slice(&core),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let sh_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gaussian sh coefficients"),
            contents: bytemuck::cast_slice(&sh),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let bounds = bounds(gaussians);
        let sh_degree = sh_degree.min(MAX_SH_DEGREE);
        log::info!("uploaded {num_points} gaussians (sh degree {sh_degree})");

        Ok(Self {
            num_points,
            sh_degree,
            bounds,
            gaussians: gaussians_buffer,
            sh_coefficients: sh_buffer,
        })
    }

    pub fn num_points(&self) -> u32 {
        self.num_points
    }

    pub fn sh_degree(&self) -> u32 {
        self.sh_degree
    }

    /// Axis-aligned bounds of the Gaussian centers (min, max).
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.bounds
    }

    pub fn gaussian_buffer(&self) -> &wgpu::Buffer {
        &self.gaussians
    }

    pub fn sh_buffer(&self) -> &wgpu::Buffer {
        &self.sh_coefficients
    }
}

fn bounds(gaussians: &[Gaussian]) -> (Vec3, Vec3) {
    gaussians.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), g| (lo.min(g.position), hi.max(g.position)),
    )
}
