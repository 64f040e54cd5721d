use thiserror::Error;

/// Renderer construction failures.
///
/// All of them are fatal: no partially built renderer is ever returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("point cloud is empty")]
    EmptyPointCloud,

    #[error("{what} needs {size} bytes, device limit is {limit}")]
    BufferTooLarge {
        what: &'static str,
        size: u64,
        limit: u64,
    },

    #[error("{what} needs {groups} workgroups, device limit is {limit} per dimension")]
    TooManyWorkgroups {
        what: &'static str,
        groups: u32,
        limit: u32,
    },

    #[error("sorter holds {capacity} keys but the point cloud has {points}")]
    SorterTooSmall { capacity: u32, points: u32 },
}

/// Per-frame failures reported by `GaussianRenderer::frame`.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("GPU device lost: {0}")]
    DeviceLost(String),

    #[error("waiting for the previous frame failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
