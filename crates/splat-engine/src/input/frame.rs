use super::types::InputEvent;

/// Input gathered between two frames, in arrival order.
///
/// Consumers must replay events in order: a press, a drag and a release inside
/// one frame only make sense as a sequence.
#[derive(Debug, Default)]
pub struct InputFrame {
    events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn iter(&self) -> std::slice::Iter<'_, InputEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn push(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}

impl<'a> IntoIterator for &'a InputFrame {
    type Item = &'a InputEvent;
    type IntoIter = std::slice::Iter<'a, InputEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
