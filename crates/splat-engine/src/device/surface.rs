use winit::dpi::PhysicalSize;

use crate::render::RenderTarget;

// ── error policy ─────────────────────────────────────────────────────────

/// What to do after the surface refused to hand out a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    /// Transient; skip this frame.
    SkipFrame,
    /// Unrecoverable (out of memory).
    Fatal,
}

impl SurfaceErrorAction {
    /// Policy for `err`, before any reconfiguration is attempted.
    pub fn for_error(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }

    pub fn is_fatal(self) -> bool {
        self == Self::Fatal
    }
}

// ── format selection ─────────────────────────────────────────────────────

/// First sRGB format when `prefer_srgb`, otherwise the surface's preferred one.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let preferred = formats.first().copied()?;
    if !prefer_srgb {
        return Some(preferred);
    }
    formats.iter().copied().find(|f| f.is_srgb()).or(Some(preferred))
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

// ── frame ────────────────────────────────────────────────────────────────

/// A surface texture acquired for one frame, plus the encoder recording it.
///
/// Holding it blocks acquisition of the next texture; hand it back to
/// [`Gpu::submit`](super::Gpu::submit) promptly.
pub struct GpuFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Borrows the frame as a draw target.
    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(&mut self.encoder, &self.view)
    }

    pub(crate) fn present(self, queue: &wgpu::Queue) {
        let Self {
            texture,
            view,
            encoder,
        } = self;
        queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }
}

// ── window surface ───────────────────────────────────────────────────────

/// Swapchain bound to a window, with its configuration and drawable size.
pub(crate) struct WindowSurface<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> WindowSurface<'w> {
    pub(crate) fn new(
        surface: wgpu::Surface<'w>,
        device: &wgpu::Device,
        config: wgpu::SurfaceConfiguration,
        size: PhysicalSize<u32>,
    ) -> Self {
        surface.configure(device, &config);
        log::debug!(
            "surface configured: {:?} {}x{} ({:?})",
            config.format,
            config.width,
            config.height,
            config.present_mode
        );
        Self {
            surface,
            config,
            size,
        }
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Records the new size; configuration waits for a non-zero one, since
    /// wgpu rejects 0x0 surfaces (minimized windows).
    pub(crate) fn resize(&mut self, device: &wgpu::Device, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if !self.drawable() {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(device, &self.config);
    }

    pub(crate) fn acquire(&self, device: &wgpu::Device) -> Result<GpuFrame, wgpu::SurfaceError> {
        let texture = self.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("splat frame encoder"),
        });
        Ok(GpuFrame {
            texture,
            view,
            encoder,
        })
    }

    /// Applies the error policy, reconfiguring when the swapchain went stale.
    pub(crate) fn recover(
        &mut self,
        device: &wgpu::Device,
        err: &wgpu::SurfaceError,
    ) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::for_error(err);
        match action {
            SurfaceErrorAction::Reconfigured if self.drawable() => {
                log::debug!(
                    "surface {err:?}; reconfiguring at {}x{}",
                    self.size.width,
                    self.size.height
                );
                self.surface.configure(device, &self.config);
            }
            SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
            _ => {}
        }
        action
    }
}
