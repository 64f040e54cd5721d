use anyhow::{Context, Result};
use glam::{Mat3, Vec2, Vec3};

use splat_engine::camera::{Camera, CameraControl, CaptureRequest, ControlMode};
use splat_engine::core::{App, AppControl, FrameCtx, FrameOutcome, WindowCtx};
use splat_engine::input::{InputEvent, Key, KeyState};
use splat_engine::render::{GaussianRenderer, RenderCtx};
use splat_engine::scene::PointCloud;

use crate::config::ViewerConfig;
use crate::scene;

const SCALE_STEP: f32 = 1.1;
const MIN_SCALE: f32 = 0.05;
const MAX_SCALE: f32 = 20.0;

/// Viewer-level action bound to a key press.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Action {
    Quit,
    ToggleMode,
    SetMode(ControlMode),
    ScaleUp,
    ScaleDown,
    ResetCamera,
}

fn action_for(event: &InputEvent) -> Option<Action> {
    let InputEvent::Key {
        key,
        state: KeyState::Pressed,
        repeat,
        ..
    } = event
    else {
        return None;
    };

    match (key, repeat) {
        (Key::Escape, false) => Some(Action::Quit),
        (Key::Tab, false) => Some(Action::ToggleMode),
        (Key::Digit1, false) => Some(Action::SetMode(ControlMode::Orbit)),
        (Key::Digit2, false) => Some(Action::SetMode(ControlMode::Fps)),
        (Key::R, false) => Some(Action::ResetCamera),
        // Scale follows key repeat.
        (Key::Equal, _) => Some(Action::ScaleUp),
        (Key::Minus, _) => Some(Action::ScaleDown),
        _ => None,
    }
}

/// Initial camera pose: above the disc plane, looking at the origin.
struct HomePose {
    position: Vec3,
    rotation: Mat3,
}

struct Scene {
    camera: Camera,
    control: CameraControl,
    renderer: GaussianRenderer,
    home: HomePose,
}

impl Scene {
    fn build(ctx: &RenderCtx<'_>, config: &ViewerConfig, viewport: Vec2) -> Result<Self> {
        let gaussians = scene::spiral_galaxy(config.points);
        let cloud = PointCloud::new(ctx.device, &gaussians, config.sh_degree)
            .context("failed to upload point cloud")?;

        let (lo, hi) = cloud.bounds();
        let radius = ((hi - lo).length() * 0.5).max(1.0);
        let eye = Vec3::new(0.0, radius * 0.6, radius * 1.8);

        let mut camera = Camera::looking_at(eye, Vec3::ZERO, viewport);
        let camera_buffer = camera.attach(ctx.device, ctx.queue);

        let mut renderer = GaussianRenderer::with_bitonic(ctx, &cloud, &camera_buffer)
            .context("failed to build gaussian renderer")?;
        renderer.set_scale(config.scale);

        let mut control = CameraControl::new(&camera);
        control.set_mode(&camera, config.mode);

        Ok(Self {
            home: HomePose {
                position: camera.position,
                rotation: camera.rotation(),
            },
            camera,
            control,
            renderer,
        })
    }

    fn apply(&mut self, window: &WindowCtx<'_>, action: Action) -> AppControl {
        match action {
            Action::Quit => return AppControl::Exit,
            Action::ToggleMode => self.set_mode(window, self.control.mode().toggled()),
            Action::SetMode(mode) => self.set_mode(window, mode),
            Action::ScaleUp => self.scale_by(SCALE_STEP),
            Action::ScaleDown => self.scale_by(1.0 / SCALE_STEP),
            Action::ResetCamera => self.reset_camera(window),
        }
        AppControl::Continue
    }

    fn set_mode(&mut self, window: &WindowCtx<'_>, mode: ControlMode) {
        self.control.set_mode(&self.camera, mode);
        window.set_title(&title(mode));
    }

    fn scale_by(&mut self, factor: f32) {
        let scale = (self.renderer.scale() * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.renderer.set_scale(scale);
    }

    fn reset_camera(&mut self, window: &WindowCtx<'_>) {
        let mode = self.control.mode();

        // Drop any drag (and capture) before the controller is replaced.
        self.control.pointer_up();
        self.apply_capture(window);

        self.camera.position = self.home.position;
        self.camera.set_rotation(self.home.rotation);
        self.camera.update_buffer();

        self.control = CameraControl::new(&self.camera);
        self.control.set_mode(&self.camera, mode);
        log::info!("camera reset");
    }

    fn apply_capture(&mut self, window: &WindowCtx<'_>) {
        if let Some(request) = self.control.take_capture_request() {
            window.set_pointer_capture(request == CaptureRequest::Capture);
        }
    }

    fn sync_viewport(&mut self, window: &WindowCtx<'_>) {
        let size = window.physical_size();
        let viewport = Vec2::new(size.width as f32, size.height as f32);
        if size.width > 0 && size.height > 0 && self.camera.viewport() != viewport {
            self.camera.set_viewport(size.width, size.height);
            self.camera.update_buffer();
        }
    }
}

fn title(mode: ControlMode) -> String {
    let mode = match mode {
        ControlMode::Orbit => "orbit",
        ControlMode::Fps => "fps",
    };
    format!("splat viewer [{mode}]")
}

/// The viewer application: one window, one point cloud.
pub struct Viewer {
    config: ViewerConfig,
    scene: Option<Scene>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            scene: None,
        }
    }
}

impl App for Viewer {
    fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.gpu.size();
        let viewport = Vec2::new(size.width as f32, size.height as f32);

        match Scene::build(&RenderCtx::from_gpu(ctx.gpu), &self.config, viewport) {
            Ok(scene) => {
                ctx.window.set_title(&title(scene.control.mode()));
                self.scene = Some(scene);
                AppControl::Continue
            }
            Err(e) => {
                log::error!("{e:#}");
                AppControl::Exit
            }
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        scene.sync_viewport(&ctx.window);

        // Input in delivery order, then one tick.
        for event in ctx.input_frame {
            if let Some(action) = action_for(event) {
                if scene.apply(&ctx.window, action) == AppControl::Exit {
                    return AppControl::Exit;
                }
                continue;
            }
            scene.control.handle_event(&mut scene.camera, event);
        }
        scene.apply_capture(&ctx.window);
        scene.control.update(&mut scene.camera);

        let renderer = &mut scene.renderer;
        match ctx.render(|rctx, target| renderer.frame(rctx, target)) {
            Ok(FrameOutcome::Presented) => {
                renderer.frame_submitted(ctx.gpu.queue());
                AppControl::Continue
            }
            Ok(FrameOutcome::Skipped) => AppControl::Continue,
            Err(e) => {
                log::error!("frame {} failed: {e}", ctx.frame_index);
                AppControl::Exit
            }
        }
    }

    fn on_exit(&mut self) {
        // GPU objects go before the device does.
        self.scene = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splat_engine::input::Modifiers;

    fn press(key: Key, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat,
        }
    }

    #[test]
    fn bindings() {
        assert_eq!(action_for(&press(Key::Tab, false)), Some(Action::ToggleMode));
        assert_eq!(action_for(&press(Key::Escape, false)), Some(Action::Quit));
        assert_eq!(action_for(&press(Key::R, false)), Some(Action::ResetCamera));
        assert_eq!(
            action_for(&press(Key::Digit2, false)),
            Some(Action::SetMode(ControlMode::Fps))
        );
        assert_eq!(action_for(&press(Key::W, false)), None);
    }

    #[test]
    fn repeats_only_drive_scale() {
        assert_eq!(action_for(&press(Key::Tab, true)), None);
        assert_eq!(action_for(&press(Key::Equal, true)), Some(Action::ScaleUp));
        assert_eq!(action_for(&press(Key::Minus, true)), Some(Action::ScaleDown));
    }

    #[test]
    fn releases_are_not_actions() {
        let release = InputEvent::Key {
            key: Key::Tab,
            state: KeyState::Released,
            modifiers: Modifiers::default(),
            repeat: false,
        };
        assert_eq!(action_for(&release), None);
    }

    #[test]
    fn title_names_the_mode() {
        assert_eq!(title(ControlMode::Fps), "splat viewer [fps]");
    }
}
