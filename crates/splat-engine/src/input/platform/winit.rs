use winit::dpi::PhysicalPosition;
use winit::event::{
    DeviceEvent, ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::Window;

use crate::input::{
    InputEvent, InputState, Key, KeyState, Modifiers, MouseButton, MouseButtonState,
    MouseWheelDelta, PointerButtonEvent, PointerMotionEvent, PointerMoveEvent,
};

/// Window event to engine event; `None` when the engine has no use for it.
///
/// `state` supplies what winit leaves out of button and wheel events: the
/// cursor position and the current modifiers.
pub(crate) fn translate_window_event(
    window: &Window,
    state: &InputState,
    event: &WindowEvent,
) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => InputEvent::ModifiersChanged(m.state().into()),
        WindowEvent::Focused(focused) => InputEvent::Focused(*focused),
        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = logical(window, *position);
            InputEvent::PointerMoved(PointerMoveEvent { x, y })
        }

        WindowEvent::MouseInput {
            state: pressed,
            button,
            ..
        } => {
            let (x, y) = state.pointer_pos.unwrap_or_default();
            InputEvent::PointerButton(PointerButtonEvent {
                button: (*button).into(),
                state: (*pressed).into(),
                x,
                y,
                modifiers: state.modifiers,
            })
        }

        WindowEvent::MouseWheel { delta, .. } => InputEvent::MouseWheel {
            delta: match *delta {
                MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x, y },
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = logical(window, p);
                    MouseWheelDelta::Pixel { x, y }
                }
            },
            modifiers: state.modifiers,
        },

        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: event.physical_key.into(),
            state: event.state.into(),
            modifiers: state.modifiers,
            repeat: event.repeat,
        },

        _ => return None,
    };
    Some(ev)
}

/// Raw mouse motion as relative pointer motion. Other device events are dropped.
pub(crate) fn translate_device_event(event: &DeviceEvent) -> Option<InputEvent> {
    let DeviceEvent::MouseMotion { delta: (dx, dy) } = *event else {
        return None;
    };
    Some(InputEvent::PointerMotion(PointerMotionEvent {
        dx: dx as f32,
        dy: dy as f32,
    }))
}

fn logical(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let pos = pos.to_logical::<f64>(window.scale_factor());
    (pos.x as f32, pos.y as f32)
}

// ── conversions ──────────────────────────────────────────────────────────

impl From<ModifiersState> for Modifiers {
    fn from(m: ModifiersState) -> Self {
        Self {
            shift: m.shift_key(),
            ctrl: m.control_key(),
            alt: m.alt_key(),
            meta: m.super_key(),
        }
    }
}

impl From<ElementState> for KeyState {
    fn from(s: ElementState) -> Self {
        match s {
            ElementState::Pressed => KeyState::Pressed,
            ElementState::Released => KeyState::Released,
        }
    }
}

impl From<ElementState> for MouseButtonState {
    fn from(s: ElementState) -> Self {
        match s {
            ElementState::Pressed => MouseButtonState::Pressed,
            ElementState::Released => MouseButtonState::Released,
        }
    }
}

impl From<WinitMouseButton> for MouseButton {
    fn from(b: WinitMouseButton) -> Self {
        match b {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Back => MouseButton::Back,
            WinitMouseButton::Forward => MouseButton::Forward,
            WinitMouseButton::Other(id) => MouseButton::Other(id),
        }
    }
}

impl From<PhysicalKey> for Key {
    fn from(key: PhysicalKey) -> Self {
        let PhysicalKey::Code(code) = key else {
            return Key::Unknown(0);
        };
        match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Tab => Key::Tab,
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyQ => Key::Q,
            KeyCode::KeyE => Key::E,
            KeyCode::KeyR => Key::R,
            KeyCode::Equal | KeyCode::NumpadAdd => Key::Equal,
            KeyCode::Minus | KeyCode::NumpadSubtract => Key::Minus,
            KeyCode::Digit1 => Key::Digit1,
            KeyCode::Digit2 => Key::Digit2,
            other => Key::Unknown(other as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_plus_minus_adjust_scale_too() {
        assert_eq!(Key::from(PhysicalKey::Code(KeyCode::NumpadAdd)), Key::Equal);
        assert_eq!(Key::from(PhysicalKey::Code(KeyCode::NumpadSubtract)), Key::Minus);
    }

    #[test]
    fn unbound_keys_are_unknown() {
        // Shift reaches the camera as a modifier, never as a key.
        for code in [KeyCode::KeyZ, KeyCode::ShiftLeft, KeyCode::ShiftRight] {
            assert!(matches!(Key::from(PhysicalKey::Code(code)), Key::Unknown(_)));
        }
    }

    #[test]
    fn modifiers_follow_winit_state() {
        let m = Modifiers::from(ModifiersState::SHIFT | ModifiersState::CONTROL);
        assert!(m.shift && m.ctrl);
        assert!(!m.alt && !m.meta);
    }

    #[test]
    fn raw_motion_becomes_pointer_motion() {
        let ev = translate_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -4.0) });
        assert_eq!(
            ev,
            Some(InputEvent::PointerMotion(PointerMotionEvent { dx: 3.0, dy: -4.0 }))
        );
    }
}
