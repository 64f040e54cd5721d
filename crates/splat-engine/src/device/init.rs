use anyhow::{Context, Result};

use super::DeviceStatus;

/// GPU setup options.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when one exists.
    ///
    /// Splat colors come out of the shaders in linear space, so an sRGB target
    /// does the encoding.
    pub prefer_srgb: bool,

    pub present_mode: wgpu::PresentMode,

    /// Requested alpha mode; replaced by a supported one if needed.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// `None` requests the adapter's own limits, which lifts the default
    /// storage-binding size cap for large clouds.
    pub required_limits: Option<wgpu::Limits>,

    /// Swapchain depth. The renderer reuses one set of buffers, so its frame
    /// gate serializes GPU work whatever this is set to.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits: None,
            desired_maximum_frame_latency: 1,
        }
    }
}

impl GpuInit {
    /// Instance over every backend the platform offers.
    pub fn instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Finds an adapter able to present to `surface` (any adapter when `None`).
    pub async fn request_adapter(
        &self,
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<wgpu::Adapter> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: self.power_preference,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);
        Ok(adapter)
    }

    /// Opens the device and installs its loss record.
    ///
    /// The splat pipelines need no optional features; storage buffers, compute
    /// and indirect draws are core.
    pub async fn request_device(
        &self,
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue, DeviceStatus)> {
        let required_limits = self
            .required_limits
            .clone()
            .unwrap_or_else(|| adapter.limits());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("splat-engine device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let status = DeviceStatus::install(&device);
        Ok((device, queue, status))
    }
}
