use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::{translate_device_event, translate_window_event};
use crate::input::{InputEvent, InputFrame, InputState};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "splat viewer".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Single-window event loop driving an [`App`].
pub struct Runtime;

impl Runtime {
    /// Opens the window, drives `app` until it exits or the window closes.
    ///
    /// Startup failures (window, adapter, device) are returned once the loop
    /// has shut down.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host {
            config,
            gpu_init,
            app,
            window: None,
            fatal: None,
        };

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        match host.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ── window entry ─────────────────────────────────────────────────────────

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    frame_index: u64,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl WindowEntry {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let size = window.inner_size();
        log::info!("window opened at {}x{}", size.width, size.height);

        let input_state = InputState {
            focused: window.has_focus(),
            ..InputState::default()
        };

        WindowEntryTryBuilder {
            input_state,
            input_frame: InputFrame::default(),
            frame_index: 0,
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }

    fn id(&self) -> WindowId {
        self.with_window(|w| w.id())
    }

    fn request_redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }

    fn is_focused(&self) -> bool {
        self.with_input_state(|s| s.focused)
    }

    fn record(&mut self, ev: InputEvent) {
        self.with_mut(|fields| fields.input_state.apply_event(fields.input_frame, ev));
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.request_redraw();
    }

    /// Runs `f` against a frame context built from this entry.
    fn drive<F>(&mut self, f: F) -> AppControl
    where
        F: FnOnce(&mut FrameCtx<'_, '_>) -> AppControl,
    {
        self.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                input_frame: fields.input_frame,
                frame_index: *fields.frame_index,
            };
            f(&mut ctx)
        })
    }

    /// Drops the consumed input and advances the frame counter.
    fn end_frame(&mut self) {
        self.with_mut(|fields| {
            fields.input_frame.clear();
            *fields.frame_index += 1;
        });
    }
}

// ── host ─────────────────────────────────────────────────────────────────

struct Host<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    window: Option<WindowEntry>,
    /// Startup failure reported from `Runtime::run` once the loop exits.
    fatal: Option<anyhow::Error>,
}

impl<A: App> Host<A> {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(entry) = self.window.take() {
            log::info!("closing window after {} frames", entry.borrow_frame_index());
            self.app.on_exit();
        }
        event_loop.exit();
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut entry = match WindowEntry::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
                return;
            }
        };

        let app = &mut self.app;
        let control = entry.drive(|ctx| app.on_start(ctx));
        entry.request_redraw();
        self.window = Some(entry);

        if control == AppControl::Exit {
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: one tick per display refresh.
        if let Some(entry) = &self.window {
            entry.request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        // Raw device input has no window; only a focused one receives it.
        if !entry.is_focused() {
            return;
        }
        if let Some(ev) = translate_device_event(&event) {
            entry.record(ev);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if entry.id() != window_id {
            return;
        }

        let translated = entry.with(|fields| {
            translate_window_event(fields.window, fields.input_state, &event)
        });
        if let Some(ev) = translated {
            entry.record(ev);
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => entry.resize(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                entry.resize(size);
            }

            WindowEvent::RedrawRequested => {
                let app = &mut self.app;
                let control = entry.drive(|ctx| app.on_frame(ctx));
                entry.end_frame();

                if control == AppControl::Exit {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }
}
