use winit::dpi::PhysicalSize;
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::device::{DeviceStatus, Gpu, SurfaceErrorAction};
use crate::input::InputFrame;
use crate::render::{FrameError, RenderCtx, RenderTarget};

/// The window being driven.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn physical_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Captures or releases the pointer.
    ///
    /// Capture locks the cursor in place where the platform supports it and
    /// confines it to the window otherwise; the cursor is hidden while captured.
    /// Relative motion keeps arriving as `InputEvent::PointerMotion`.
    pub fn set_pointer_capture(&self, capture: bool) {
        if capture {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("pointer capture unavailable: {e}");
            }
            self.window.set_cursor_visible(false);
        } else {
            if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                log::debug!("pointer release failed: {e}");
            }
            self.window.set_cursor_visible(true);
        }
    }
}

/// Result of [`FrameCtx::render`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// Commands were submitted and the frame presented.
    Presented,
    /// No surface texture this time (resize, timeout); nothing was submitted.
    Skipped,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input_frame: &'a InputFrame,
    /// Frames driven for this window so far.
    pub frame_index: u64,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the next surface texture, calls `draw` with a ready
    /// [`RenderCtx`] and [`RenderTarget`], then submits and presents.
    ///
    /// Recoverable surface errors skip the frame unless the device is gone,
    /// which is reported as [`FrameError::DeviceLost`]. If `draw` fails nothing
    /// is submitted and the error is returned.
    pub fn render<F>(&mut self, draw: F) -> Result<FrameOutcome, FrameError>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> Result<(), FrameError>,
    {
        ensure_device(self.gpu.status())?;

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let gpu = &mut *self.gpu;
                let status = gpu.status().clone();
                return acquire_failed(&status, err, |err| gpu.handle_surface_error(err));
            }
        };

        draw(&RenderCtx::from_gpu(self.gpu), &mut frame.target())?;

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        Ok(FrameOutcome::Presented)
    }
}

fn ensure_device(status: &DeviceStatus) -> Result<(), FrameError> {
    match status.lost_reason() {
        Some(reason) => Err(FrameError::DeviceLost(reason)),
        None => Ok(()),
    }
}

/// Outcome of a frame whose surface texture could not be acquired.
///
/// A lost device fails acquisition with errors that otherwise read as
/// recoverable, so loss is checked before `recover` runs.
fn acquire_failed(
    status: &DeviceStatus,
    err: wgpu::SurfaceError,
    recover: impl FnOnce(&wgpu::SurfaceError) -> SurfaceErrorAction,
) -> Result<FrameOutcome, FrameError> {
    ensure_device(status)?;
    if recover(&err).is_fatal() {
        return Err(FrameError::Surface(err));
    }
    Ok(FrameOutcome::Skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::SurfaceError;

    #[test]
    fn lost_device_is_reported_instead_of_skipping() {
        for err in [
            SurfaceError::Lost,
            SurfaceError::Outdated,
            SurfaceError::Timeout,
            SurfaceError::Other,
        ] {
            let status = DeviceStatus::new();
            status.mark_lost("Destroyed: ");
            let outcome =
                acquire_failed(&status, err, |_| panic!("surface recovered on a lost device"));
            assert!(
                matches!(&outcome, Err(FrameError::DeviceLost(reason)) if reason == "Destroyed: "),
                "{outcome:?}"
            );
        }
    }

    #[test]
    fn healthy_device_skips_recoverable_errors() {
        let status = DeviceStatus::new();
        for err in [SurfaceError::Outdated, SurfaceError::Timeout] {
            let outcome = acquire_failed(&status, err, SurfaceErrorAction::for_error);
            assert_eq!(outcome.ok(), Some(FrameOutcome::Skipped));
        }
    }

    #[test]
    fn out_of_memory_fails_the_frame() {
        let outcome = acquire_failed(
            &DeviceStatus::new(),
            SurfaceError::OutOfMemory,
            SurfaceErrorAction::for_error,
        );
        assert!(matches!(outcome, Err(FrameError::Surface(SurfaceError::OutOfMemory))));
    }

    #[test]
    fn render_checks_the_device_first() {
        let status = DeviceStatus::new();
        assert!(ensure_device(&status).is_ok());
        status.mark_lost("Unknown: reset");
        assert!(matches!(ensure_device(&status), Err(FrameError::DeviceLost(_))));
    }
}
