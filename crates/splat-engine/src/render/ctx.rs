use crate::device::{DeviceStatus, Gpu};

use super::FrameError;

/// Shared GPU handles a renderer needs while building or recording.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Color target format pipelines are built for.
    pub surface_format: wgpu::TextureFormat,
    pub status: &'a DeviceStatus,
}

impl<'a> RenderCtx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        status: &'a DeviceStatus,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            status,
        }
    }

    /// Context drawing into `gpu`'s window surface.
    pub fn from_gpu(gpu: &'a Gpu<'_>) -> Self {
        Self::new(gpu.device(), gpu.queue(), gpu.surface_format(), gpu.status())
    }

    /// Fails once the device has been lost.
    pub fn ensure_device(&self) -> Result<(), FrameError> {
        match self.status.lost_reason() {
            Some(reason) => Err(FrameError::DeviceLost(reason)),
            None => Ok(()),
        }
    }
}

/// Where a frame is recorded: an encoder and the color attachment it draws to.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    /// Background the splats are composited over.
    pub clear: wgpu::Color,
}

impl<'a> RenderTarget<'a> {
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self {
            encoder,
            color_view,
            clear: wgpu::Color::BLACK,
        }
    }

    pub fn with_clear(mut self, clear: wgpu::Color) -> Self {
        self.clear = clear;
        self
    }
}

