use super::frame::InputFrame;
use super::types::{InputEvent, Modifiers, PointerButtonEvent, PointerMoveEvent};

/// Platform-side input state for a single window.
///
/// winit does not attach modifiers or a cursor position to button events; the
/// runtime tracks them here and stamps them onto the events it emits.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    /// Applies an event to the tracked state and appends it to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,
            InputEvent::Focused(f) => self.focused = *f,
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }
            InputEvent::PointerLeft => self.pointer_pos = None,
            InputEvent::PointerButton(PointerButtonEvent { x, y, modifiers, .. }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;
            }
            InputEvent::Key { modifiers, .. } | InputEvent::MouseWheel { modifiers, .. } => {
                self.modifiers = *modifiers;
            }
            InputEvent::PointerMotion(_) => {}
        }

        frame.push(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, KeyState, MouseButton, MouseButtonState};

    #[test]
    fn button_event_updates_pointer_and_modifiers() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Right,
                state: MouseButtonState::Pressed,
                x: 4.0,
                y: 8.0,
                modifiers: Modifiers::SHIFT,
            }),
        );
        assert_eq!(state.pointer_pos, Some((4.0, 8.0)));
        assert!(state.modifiers.shift);
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn events_keep_arrival_order() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let key = InputEvent::Key {
            key: Key::Tab,
            state: KeyState::Pressed,
            modifiers: Modifiers::SHIFT,
            repeat: false,
        };
        let moved = InputEvent::PointerMoved(PointerMoveEvent { x: 2.0, y: 3.0 });
        state.apply_event(&mut frame, key.clone());
        state.apply_event(&mut frame, moved.clone());

        assert!(state.modifiers.shift);
        assert_eq!(frame.iter().cloned().collect::<Vec<_>>(), vec![key, moved]);

        frame.clear();
        assert!(frame.is_empty());
    }

    #[test]
    fn pointer_left_forgets_position() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved(PointerMoveEvent { x: 1.0, y: 1.0 }));
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }
}
