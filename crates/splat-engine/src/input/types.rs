/// Physical key, named only where the viewer binds it.
///
/// Everything else arrives as `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Tab,

    // fps movement
    W,
    A,
    S,
    D,
    Q,
    E,

    R,
    /// `=` or keypad `+`.
    Equal,
    /// `-` or keypad `-`.
    Minus,
    Digit1,
    Digit2,

    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// `Left` is the primary button, `Right` the secondary one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Wheel delta in the unit the device reports.
///
/// Notched wheels report lines, touchpads pixels. Positive `y` means the
/// content moves up/away, as winit reports it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Pixels per wheel notch.
    pub const LINE_HEIGHT_PX: f32 = 100.0;

    /// Vertical scroll in pixels, positive toward the user (page-scroll
    /// convention). Zoom and dolly are expressed in this unit.
    pub fn scroll_y_pixels(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } => -y * Self::LINE_HEIGHT_PX,
            MouseWheelDelta::Pixel { y, .. } => -y,
        }
    }
}

/// Cursor position in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Raw relative motion from the pointing device.
///
/// Keeps arriving while the cursor is locked, which is what fps look needs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMotionEvent {
    pub dx: f32,
    pub dy: f32,
}

/// Button change, stamped with the cursor position and modifiers at the time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

/// Platform-independent input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// Auto-repeat while held.
        repeat: bool,
    },

    PointerMoved(PointerMoveEvent),
    PointerMotion(PointerMotionEvent),
    PointerButton(PointerButtonEvent),

    MouseWheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },

    /// Cursor left the window.
    PointerLeft,

    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_notch_toward_user_is_positive() {
        let d = MouseWheelDelta::Line { x: 0.0, y: -1.0 };
        assert_eq!(d.scroll_y_pixels(), MouseWheelDelta::LINE_HEIGHT_PX);
    }

    #[test]
    fn touchpad_pixels_flip_sign() {
        let d = MouseWheelDelta::Pixel { x: 3.0, y: 12.5 };
        assert_eq!(d.scroll_y_pixels(), -12.5);
    }
}
