use glam::{Mat3, Quat, Vec2, Vec3};

use crate::input::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
};

use super::view::{basis_from_look, Camera, WORLD_UP};

const ORBIT_ROTATE_SENSITIVITY: f32 = 0.005;
const FPS_ROTATE_SENSITIVITY: f32 = 0.002;

const MOVE_SPEED: f32 = 0.1;
const FAST_MOVE_SPEED: f32 = 0.3;

const ORBIT_PAN_PER_DISTANCE: f32 = 0.001;
const FPS_PAN_SPEED: f32 = 0.01;

const ZOOM_PER_PIXEL: f32 = 0.001;

pub const MIN_DISTANCE: f32 = 0.1;
pub const MAX_DISTANCE: f32 = 1000.0;

/// |dot| above which a direction counts as parallel to the world up axis.
const PARALLEL_EPS: f32 = 1e-6;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ControlMode {
    /// Rotate, pan and zoom around a target point.
    #[default]
    Orbit,
    /// Free look with keyboard translation.
    Fps,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Orbit => ControlMode::Fps,
            ControlMode::Fps => ControlMode::Orbit,
        }
    }
}

/// Pointer capture change the host should apply.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CaptureRequest {
    Capture,
    Release,
}

/// Held movement keys.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
    /// Shift modifier held.
    pub fast: bool,
}

impl MovementKeys {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.down || self.up
    }

    /// Records a key transition. Returns false for keys that are not bound.
    fn set(&mut self, key: Key, down: bool) -> bool {
        let slot = match key {
            Key::W => &mut self.forward,
            Key::S => &mut self.backward,
            Key::A => &mut self.left,
            Key::D => &mut self.right,
            Key::Q => &mut self.down,
            Key::E => &mut self.up,
            _ => return false,
        };
        *slot = down;
        true
    }

    /// Unnormalized translation direction in the camera's basis.
    fn direction(&self, look: Vec3, right: Vec3, up: Vec3) -> Vec3 {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        look * axis(self.forward, self.backward)
            + right * axis(self.right, self.left)
            + up * axis(self.up, self.down)
    }
}

#[derive(Debug, Default)]
struct DragState {
    rotating: bool,
    panning: bool,
    captured: bool,
    last: Option<Vec2>,
}

impl DragState {
    fn active(&self) -> bool {
        self.rotating || self.panning
    }
}

enum DragKind {
    Rotate,
    Pan,
}

fn drag_kind(button: MouseButton, modifiers: Modifiers) -> Option<DragKind> {
    match (button, modifiers.shift) {
        (MouseButton::Right, false) => Some(DragKind::Rotate),
        (MouseButton::Right, true) | (MouseButton::Left, true) | (MouseButton::Middle, _) => {
            Some(DragKind::Pan)
        }
        _ => None,
    }
}

/// Camera input state machine.
///
/// Feed it input events in delivery order and call [`CameraControl::update`]
/// once per frame. Every mutation of the camera is followed by
/// `Camera::update_buffer`.
#[derive(Debug)]
pub struct CameraControl {
    mode: ControlMode,
    target: Vec3,
    distance: f32,

    keys: MovementKeys,
    drag: DragState,
    capture_request: Option<CaptureRequest>,
}

impl CameraControl {
    /// Controller in orbit mode around the origin.
    pub fn new(camera: &Camera) -> Self {
        Self {
            mode: ControlMode::Orbit,
            target: Vec3::ZERO,
            distance: camera.position.length().clamp(MIN_DISTANCE, MAX_DISTANCE),
            keys: MovementKeys::default(),
            drag: DragState::default(),
            capture_request: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn keys(&self) -> MovementKeys {
        self.keys
    }

    pub fn is_rotating(&self) -> bool {
        self.drag.rotating
    }

    pub fn is_panning(&self) -> bool {
        self.drag.panning
    }

    /// Takes the pending capture change, if any.
    pub fn take_capture_request(&mut self) -> Option<CaptureRequest> {
        self.capture_request.take()
    }

    /// Switches navigation mode. The camera itself is never moved.
    pub fn set_mode(&mut self, camera: &Camera, mode: ControlMode) {
        if mode == ControlMode::Orbit {
            self.release_capture();
            self.target = camera.position + camera.look() * self.distance;
        }
        if mode != self.mode {
            log::info!("camera mode: {:?} -> {:?}", self.mode, mode);
        }

        self.mode = mode;
        self.keys = MovementKeys::default();
        self.drag.rotating = false;
        self.drag.panning = false;
        self.drag.last = None;
    }

    /// Applies one input event.
    pub fn handle_event(&mut self, camera: &mut Camera, event: &InputEvent) {
        match event {
            InputEvent::Key {
                key,
                state,
                repeat: false,
                ..
            } => {
                if self.mode == ControlMode::Fps {
                    self.keys.set(*key, *state == KeyState::Pressed);
                }
            }
            InputEvent::ModifiersChanged(m) => {
                if self.mode == ControlMode::Fps {
                    self.keys.fast = m.shift;
                }
            }
            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                x,
                y,
                modifiers,
            }) => match state {
                MouseButtonState::Pressed => {
                    self.pointer_down(*button, *modifiers, Vec2::new(*x, *y))
                }
                MouseButtonState::Released => self.pointer_up(),
            },
            InputEvent::PointerMoved(p) => self.pointer_move(camera, Vec2::new(p.x, p.y)),
            InputEvent::PointerMotion(m) => self.pointer_motion(camera, Vec2::new(m.dx, m.dy)),
            InputEvent::MouseWheel { delta, .. } => self.wheel(camera, delta.scroll_y_pixels()),
            InputEvent::Focused(false) => {
                self.keys = MovementKeys::default();
                self.pointer_up();
            }
            InputEvent::PointerLeft if !self.drag.captured => self.pointer_up(),
            _ => {}
        }
    }

    /// Per-frame tick: keyboard translation in fps mode.
    pub fn update(&mut self, camera: &mut Camera) {
        if self.mode != ControlMode::Fps || !self.keys.any() {
            return;
        }

        let speed = if self.keys.fast { FAST_MOVE_SPEED } else { MOVE_SPEED };
        let dir = self
            .keys
            .direction(camera.look(), camera.right(), camera.up());
        camera.position += dir * speed;
        camera.update_buffer();
    }

    // ── pointer ───────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, button: MouseButton, modifiers: Modifiers, pos: Vec2) {
        let Some(kind) = drag_kind(button, modifiers) else {
            return;
        };

        self.drag.last = Some(pos);
        match kind {
            DragKind::Rotate => {
                self.drag.rotating = true;
                self.drag.panning = false;
                if self.mode == ControlMode::Fps && !self.drag.captured {
                    self.drag.captured = true;
                    self.capture_request = Some(CaptureRequest::Capture);
                }
            }
            DragKind::Pan => {
                self.drag.panning = true;
                self.drag.rotating = false;
            }
        }
    }

    /// Absolute pointer position.
    pub fn pointer_move(&mut self, camera: &mut Camera, pos: Vec2) {
        let (true, Some(last)) = (self.drag.active(), self.drag.last) else {
            return;
        };
        self.drag.last = Some(pos);

        // Captured fps rotation is driven by raw motion only.
        if self.mode == ControlMode::Fps && self.drag.rotating {
            return;
        }

        let delta = pos - last;
        self.apply_drag(camera, delta);
    }

    /// Raw relative pointer motion.
    pub fn pointer_motion(&mut self, camera: &mut Camera, delta: Vec2) {
        if self.mode == ControlMode::Fps && self.drag.rotating {
            self.rotate_fps(camera, delta.x, delta.y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag.rotating = false;
        self.drag.panning = false;
        self.drag.last = None;
        self.release_capture();
    }

    /// Vertical scroll in pixels, positive toward the user.
    pub fn wheel(&mut self, camera: &mut Camera, delta_y: f32) {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return;
        }

        match self.mode {
            ControlMode::Orbit => {
                self.distance = (self.distance * (1.0 + delta_y * ZOOM_PER_PIXEL))
                    .clamp(MIN_DISTANCE, MAX_DISTANCE);

                let dir = (camera.position - self.target)
                    .try_normalize()
                    .unwrap_or(-camera.look());
                camera.position = self.target + dir * self.distance;
            }
            ControlMode::Fps => {
                camera.position += camera.look() * (-delta_y * ZOOM_PER_PIXEL);
            }
        }
        camera.update_buffer();
    }

    fn apply_drag(&mut self, camera: &mut Camera, delta: Vec2) {
        match (self.mode, self.drag.rotating, self.drag.panning) {
            (ControlMode::Orbit, true, _) => self.rotate_around_target(camera, delta.x, delta.y),
            (ControlMode::Orbit, _, true) => self.pan_orbit(camera, delta.x, delta.y),
            (ControlMode::Fps, _, true) => self.pan_fps(camera, delta.x, delta.y),
            _ => {}
        }
    }

    fn release_capture(&mut self) {
        if self.drag.captured {
            self.drag.captured = false;
            self.capture_request = Some(CaptureRequest::Release);
        }
    }

    // ── navigation ────────────────────────────────────────────────────────────

    /// Orbits the camera around the target, keeping the distance.
    ///
    /// The orientation is rebuilt from the new position, so it never drifts.
    pub fn rotate_around_target(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        let to_camera = camera.position - self.target;
        let radius = to_camera.length();
        if radius <= f32::EPSILON {
            return;
        }

        let yaw = Quat::from_axis_angle(WORLD_UP, -dx * ORBIT_ROTATE_SENSITIVITY);
        let yawed = yaw * to_camera;

        // Right axis of the yawed camera: look x up.
        let rotated = match (-yawed).cross(WORLD_UP).try_normalize() {
            Some(axis) => {
                let pitch = Quat::from_axis_angle(axis, -dy * ORBIT_ROTATE_SENSITIVITY);
                let pitched = pitch * yawed;
                let parallel = pitched.normalize().dot(WORLD_UP).abs() > 1.0 - PARALLEL_EPS;
                if parallel { yawed } else { pitched }
            }
            None => yawed,
        };

        // Renormalize to the pre-rotation radius.
        let rotated = rotated.normalize() * radius;
        let Some(rotation) = basis_from_look(-rotated) else {
            return;
        };

        camera.position = self.target + rotated;
        camera.set_rotation(rotation);
        camera.update_buffer();
    }

    /// Free-look rotation, composed onto the current orientation.
    pub fn rotate_fps(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let yaw = Quat::from_axis_angle(WORLD_UP, -dx * FPS_ROTATE_SENSITIVITY);
        let pitch = Quat::from_axis_angle(camera.right(), -dy * FPS_ROTATE_SENSITIVITY);

        let rotation = Mat3::from_quat((yaw * pitch).normalize()) * camera.rotation();
        camera.set_rotation(orthonormalize(rotation));
        camera.update_buffer();
    }

    pub fn pan_orbit(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        let speed = self.distance * ORBIT_PAN_PER_DISTANCE;
        let offset = pan_offset(camera, dx, dy, speed);
        camera.position += offset;
        self.target += offset;
        camera.update_buffer();
    }

    pub fn pan_fps(&mut self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.position += pan_offset(camera, dx, dy, FPS_PAN_SPEED);
        camera.update_buffer();
    }
}

fn pan_offset(camera: &Camera, dx: f32, dy: f32, speed: f32) -> Vec3 {
    -(camera.right() * dx + camera.up() * dy) * speed
}

/// Gram-Schmidt on the right/up columns; back is rebuilt from them.
fn orthonormalize(m: Mat3) -> Mat3 {
    let right = m.x_axis.normalize();
    let up = (m.y_axis - right * right.dot(m.y_axis)).normalize();
    let back = right.cross(up);
    Mat3::from_cols(right, up, back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseWheelDelta, PointerMotionEvent, PointerMoveEvent};

    const EPS: f32 = 1e-4;

    fn setup() -> (Camera, CameraControl) {
        let camera = Camera::looking_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec2::new(800.0, 600.0),
        );
        let control = CameraControl::new(&camera);
        (camera, control)
    }

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    fn button(button: MouseButton, state: MouseButtonState, mods: Modifiers) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state,
            x: 100.0,
            y: 100.0,
            modifiers: mods,
        })
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    fn assert_orthonormal(camera: &Camera) {
        let (l, r, u) = (camera.look(), camera.right(), camera.up());
        for v in [l, r, u] {
            assert!(v.is_finite());
            assert!((v.length() - 1.0).abs() < EPS, "not unit: {v:?}");
        }
        assert!(l.dot(r).abs() < EPS);
        assert!(l.dot(u).abs() < EPS);
        assert!(r.dot(u).abs() < EPS);
    }

    // ── orbit ─────────────────────────────────────────────────────────────────

    #[test]
    fn initial_state_targets_origin() {
        let (_, control) = setup();
        assert_eq!(control.mode(), ControlMode::Orbit);
        assert_eq!(control.target(), Vec3::ZERO);
        assert!((control.distance() - 5.0).abs() < EPS);
    }

    #[test]
    fn zero_rotation_changes_nothing() {
        let (mut camera, mut control) = setup();
        let before = (camera.position, camera.rotation());
        control.rotate_around_target(&mut camera, 0.0, 0.0);
        assert!(camera.position.abs_diff_eq(before.0, EPS));
        assert!(camera.rotation().abs_diff_eq(before.1, EPS));
    }

    #[test]
    fn rotate_around_target_preserves_distance() {
        let (mut camera, mut control) = setup();
        for dx in [-400.0, -37.0, 0.0, 12.5, 250.0] {
            for dy in [-300.0, -5.0, 0.0, 9.0, 180.0] {
                control.rotate_around_target(&mut camera, dx, dy);
                let d = (camera.position - control.target()).length();
                assert!((d - 5.0).abs() < 1e-3, "dx={dx} dy={dy} d={d}");
                assert_orthonormal(&camera);
            }
        }
    }

    #[test]
    fn orbit_keeps_looking_at_target() {
        let (mut camera, mut control) = setup();
        control.rotate_around_target(&mut camera, 120.0, -40.0);
        let to_target = (control.target() - camera.position).normalize();
        assert!(camera.look().abs_diff_eq(to_target, EPS));
    }

    #[test]
    fn pitch_through_the_pole_is_skipped() {
        let (mut camera, mut control) = setup();
        // Far more pitch than a quarter turn, in both directions.
        for dy in [10_000.0, -10_000.0, 314.159_27, -314.159_27] {
            control.rotate_around_target(&mut camera, 0.0, dy);
            assert_orthonormal(&camera);
            let d = (camera.position - control.target()).length();
            assert!((d - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn rotation_at_target_is_skipped() {
        let (mut camera, mut control) = setup();
        camera.position = control.target();
        let rotation = camera.rotation();
        control.rotate_around_target(&mut camera, 50.0, 50.0);
        assert_eq!(camera.position, control.target());
        assert_eq!(camera.rotation(), rotation);
    }

    #[test]
    fn pan_orbit_moves_target_and_camera_together() {
        let (mut camera, mut control) = setup();
        for (dx, dy) in [(10.0, 0.0), (0.0, -7.0), (33.0, 21.0)] {
            let p0 = camera.position;
            let t0 = control.target();
            control.pan_orbit(&mut camera, dx, dy);
            let dp = camera.position - p0;
            let dt = control.target() - t0;
            assert!(dp.abs_diff_eq(dt, 1e-6));
            assert!(dp.length() > 0.0);
            assert!(((camera.position - control.target()).length() - 5.0).abs() < EPS);
        }
    }

    #[test]
    fn pan_moves_against_pointer_horizontally() {
        let (mut camera, mut control) = setup();
        control.pan_orbit(&mut camera, 100.0, 0.0);
        assert!(camera.position.x < 0.0);
    }

    #[test]
    fn orbit_scroll_scales_and_clamps_distance() {
        for dy in [-5000.0, -900.0, -1.0, 1.0, 120.0, 1000.0, 1e6] {
            let (mut camera, mut control) = setup();
            let expected = (5.0 * (1.0 + dy * ZOOM_PER_PIXEL)).clamp(MIN_DISTANCE, MAX_DISTANCE);
            control.wheel(&mut camera, dy);
            assert!((control.distance() - expected).abs() < EPS, "dy={dy}");
            assert_eq!(control.target(), Vec3::ZERO);
            let d = (camera.position - control.target()).length();
            assert!((d - expected).abs() < 1e-3);
            // Direction from target preserved.
            assert!(camera.position.normalize().abs_diff_eq(Vec3::Z, EPS));
        }
    }

    #[test]
    fn wheel_event_converts_lines_to_pixels() {
        let (mut camera, mut control) = setup();
        control.handle_event(
            &mut camera,
            &InputEvent::MouseWheel {
                delta: MouseWheelDelta::Line { x: 0.0, y: -1.0 },
                modifiers: Modifiers::default(),
            },
        );
        // One notch toward the user zooms out by 10 %.
        assert!((control.distance() - 5.5).abs() < EPS);
    }

    #[test]
    fn set_mode_orbit_is_idempotent() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        control.set_mode(&camera, ControlMode::Orbit);
        let once = control.target();
        control.set_mode(&camera, ControlMode::Orbit);
        assert!(control.target().abs_diff_eq(once, 1e-6));
    }

    #[test]
    fn set_mode_never_moves_camera() {
        let (mut camera, mut control) = setup();
        control.rotate_around_target(&mut camera, 40.0, 20.0);
        let before = (camera.position, camera.rotation());
        control.set_mode(&camera, ControlMode::Fps);
        control.set_mode(&camera, ControlMode::Orbit);
        assert_eq!(camera.position, before.0);
        assert_eq!(camera.rotation(), before.1);
    }

    // ── drag protocol ─────────────────────────────────────────────────────────

    #[test]
    fn stale_pointer_up_is_a_noop() {
        let (mut camera, mut control) = setup();
        let before = (camera.position, camera.rotation());
        control.handle_event(
            &mut camera,
            &button(MouseButton::Right, MouseButtonState::Released, Modifiers::default()),
        );
        control.handle_event(&mut camera, &moved(300.0, 300.0));
        assert!(!control.is_rotating());
        assert!(!control.is_panning());
        assert_eq!(camera.position, before.0);
        assert_eq!(camera.rotation(), before.1);
        assert_eq!(control.take_capture_request(), None);
    }

    #[test]
    fn secondary_drag_rotates_in_orbit() {
        let (mut camera, mut control) = setup();
        control.handle_event(
            &mut camera,
            &button(MouseButton::Right, MouseButtonState::Pressed, Modifiers::default()),
        );
        assert!(control.is_rotating());
        control.handle_event(&mut camera, &moved(140.0, 100.0));
        assert!(camera.position.x.abs() > 1e-3);
        assert!((camera.position.length() - 5.0).abs() < 1e-3);
        // Orbit never captures.
        assert_eq!(control.take_capture_request(), None);

        control.handle_event(
            &mut camera,
            &button(MouseButton::Right, MouseButtonState::Released, Modifiers::default()),
        );
        assert!(!control.is_rotating());
    }

    #[test]
    fn pan_bindings() {
        let cases = [
            (MouseButton::Right, Modifiers::SHIFT),
            (MouseButton::Left, Modifiers::SHIFT),
            (MouseButton::Middle, Modifiers::default()),
        ];
        for (b, mods) in cases {
            let (mut camera, mut control) = setup();
            control.handle_event(&mut camera, &button(b, MouseButtonState::Pressed, mods));
            assert!(control.is_panning(), "{b:?}");
            assert!(!control.is_rotating());
        }
    }

    #[test]
    fn unbound_buttons_are_ignored() {
        let (mut camera, mut control) = setup();
        for b in [MouseButton::Left, MouseButton::Back, MouseButton::Forward] {
            control.handle_event(
                &mut camera,
                &button(b, MouseButtonState::Pressed, Modifiers::default()),
            );
            assert!(!control.is_rotating() && !control.is_panning());
        }
    }

    #[test]
    fn fps_rotate_captures_and_uses_raw_motion() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.handle_event(
            &mut camera,
            &button(MouseButton::Right, MouseButtonState::Pressed, Modifiers::default()),
        );
        assert_eq!(control.take_capture_request(), Some(CaptureRequest::Capture));

        // Absolute motion does not rotate while captured.
        let before = camera.rotation();
        control.handle_event(&mut camera, &moved(400.0, 100.0));
        assert_eq!(camera.rotation(), before);

        control.handle_event(
            &mut camera,
            &InputEvent::PointerMotion(PointerMotionEvent { dx: 50.0, dy: 0.0 }),
        );
        // Moving right turns right.
        assert!(camera.look().x > 0.0);
        assert_orthonormal(&camera);

        control.handle_event(
            &mut camera,
            &button(MouseButton::Right, MouseButtonState::Released, Modifiers::default()),
        );
        assert_eq!(control.take_capture_request(), Some(CaptureRequest::Release));
    }

    #[test]
    fn fps_pan_does_not_capture() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.handle_event(
            &mut camera,
            &button(MouseButton::Middle, MouseButtonState::Pressed, Modifiers::default()),
        );
        assert_eq!(control.take_capture_request(), None);
        control.handle_event(&mut camera, &moved(110.0, 100.0));
        assert!((camera.position.x + 0.1).abs() < EPS);
    }

    #[test]
    fn entering_orbit_releases_capture() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.pointer_down(MouseButton::Right, Modifiers::default(), Vec2::ZERO);
        assert_eq!(control.take_capture_request(), Some(CaptureRequest::Capture));
        control.set_mode(&camera, ControlMode::Orbit);
        assert_eq!(control.take_capture_request(), Some(CaptureRequest::Release));
        assert!(!control.is_rotating());
    }

    #[test]
    fn raw_motion_is_ignored_in_orbit() {
        let (mut camera, mut control) = setup();
        control.pointer_down(MouseButton::Right, Modifiers::default(), Vec2::ZERO);
        let before = camera.position;
        control.pointer_motion(&mut camera, Vec2::new(30.0, 30.0));
        assert_eq!(camera.position, before);
    }

    #[test]
    fn rotate_fps_stays_orthonormal() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        for i in 0..500 {
            let t = i as f32;
            control.rotate_fps(&mut camera, (t * 0.7).sin() * 40.0, (t * 1.3).cos() * 25.0);
        }
        assert_orthonormal(&camera);
    }

    // ── keyboard ──────────────────────────────────────────────────────────────

    #[test]
    fn fps_keys_translate_per_tick() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.handle_event(&mut camera, &key(Key::W, KeyState::Pressed));
        control.update(&mut camera);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.9), EPS));

        control.handle_event(&mut camera, &InputEvent::ModifiersChanged(Modifiers::SHIFT));
        control.update(&mut camera);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.6), EPS));

        control.handle_event(&mut camera, &key(Key::W, KeyState::Released));
        control.update(&mut camera);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 4.6), EPS));
    }

    #[test]
    fn fast_follows_the_shift_modifier_not_shift_keys() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.handle_event(&mut camera, &InputEvent::ModifiersChanged(Modifiers::SHIFT));

        // One shift key released while the other is still held.
        control.handle_event(
            &mut camera,
            &InputEvent::Key {
                key: Key::Unknown(0),
                state: KeyState::Released,
                modifiers: Modifiers::SHIFT,
                repeat: false,
            },
        );
        assert!(control.keys().fast);

        control.handle_event(&mut camera, &InputEvent::ModifiersChanged(Modifiers::default()));
        assert!(!control.keys().fast);
    }

    #[test]
    fn movement_key_directions() {
        let cases = [
            (Key::S, Vec3::Z),
            (Key::A, Vec3::NEG_X),
            (Key::D, Vec3::X),
            (Key::Q, Vec3::NEG_Y),
            (Key::E, Vec3::Y),
        ];
        for (k, dir) in cases {
            let (mut camera, mut control) = setup();
            control.set_mode(&camera, ControlMode::Fps);
            let start = camera.position;
            control.handle_event(&mut camera, &key(k, KeyState::Pressed));
            control.update(&mut camera);
            assert!((camera.position - start).abs_diff_eq(dir * MOVE_SPEED, EPS), "{k:?}");
        }
    }

    #[test]
    fn orbit_ignores_movement_keys() {
        let (mut camera, mut control) = setup();
        control.handle_event(&mut camera, &key(Key::W, KeyState::Pressed));
        control.update(&mut camera);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0));
        assert!(!control.keys().any());
    }

    #[test]
    fn switching_to_orbit_stops_translation_next_tick() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.handle_event(&mut camera, &key(Key::W, KeyState::Pressed));
        control.update(&mut camera);
        control.set_mode(&camera, ControlMode::Orbit);
        let before = camera.position;
        control.update(&mut camera);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn focus_loss_releases_keys() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.handle_event(&mut camera, &key(Key::D, KeyState::Pressed));
        control.handle_event(&mut camera, &InputEvent::Focused(false));
        assert!(!control.keys().any());
    }

    #[test]
    fn fps_scroll_moves_along_look() {
        let (mut camera, mut control) = setup();
        control.set_mode(&camera, ControlMode::Fps);
        control.wheel(&mut camera, 100.0);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.1), EPS));
    }

    #[test]
    fn mutations_publish_the_camera() {
        let (mut camera, mut control) = setup();
        let r0 = camera.revision();
        control.rotate_around_target(&mut camera, 5.0, 0.0);
        control.pan_orbit(&mut camera, 1.0, 1.0);
        control.wheel(&mut camera, 10.0);
        assert_eq!(camera.revision(), r0 + 3);
    }
}
