use crate::tape::FrameInput;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerKey {
    Up,
    Down,
}

/// Tracks held steering keys as events arrive and resolves them latest-wins.
///
/// Holding both keys steers toward whichever was pressed last; releasing it
/// falls back to the one still held.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputLatch {
    up_held: bool,
    down_held: bool,
    last_pressed: Option<SteerKey>,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: SteerKey) {
        match key {
            SteerKey::Up => self.up_held = true,
            SteerKey::Down => self.down_held = true,
        }
        self.last_pressed = Some(key);
    }

    pub fn release(&mut self, key: SteerKey) {
        match key {
            SteerKey::Up => self.up_held = false,
            SteerKey::Down => self.down_held = false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Read once per tick; does not consume held state.
    pub fn resolve(&self) -> FrameInput {
        match (self.up_held, self.down_held) {
            (true, true) => match self.last_pressed {
                Some(SteerKey::Down) => FrameInput::Down,
                _ => FrameInput::Up,
            },
            (true, false) => FrameInput::Up,
            (false, true) => FrameInput::Down,
            (false, false) => FrameInput::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_held_is_neutral() {
        assert_eq!(InputLatch::new().resolve(), FrameInput::None);
    }

    #[test]
    fn latest_press_wins_while_both_held() {
        let mut latch = InputLatch::new();
        latch.press(SteerKey::Up);
        latch.press(SteerKey::Down);
        assert_eq!(latch.resolve(), FrameInput::Down);

        latch.press(SteerKey::Up);
        assert_eq!(latch.resolve(), FrameInput::Up);
    }

    #[test]
    fn release_falls_back_to_remaining_key() {
        let mut latch = InputLatch::new();
        latch.press(SteerKey::Down);
        latch.press(SteerKey::Up);
        latch.release(SteerKey::Up);
        assert_eq!(latch.resolve(), FrameInput::Down);

        latch.release(SteerKey::Down);
        assert_eq!(latch.resolve(), FrameInput::None);
    }

    #[test]
    fn resolve_does_not_consume() {
        let mut latch = InputLatch::new();
        latch.press(SteerKey::Up);
        assert_eq!(latch.resolve(), FrameInput::Up);
        assert_eq!(latch.resolve(), FrameInput::Up);
        latch.clear();
        assert_eq!(latch.resolve(), FrameInput::None);
    }
}
