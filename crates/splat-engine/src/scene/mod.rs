//! Scene data: Gaussians on the CPU and their GPU upload.

mod gaussian;
mod point_cloud;

pub use gaussian::{Gaussian, GaussianGpu, ShGpu, MAX_SH_DEGREE, SH_C0, SH_COEFFICIENTS};
pub use point_cloud::PointCloud;
