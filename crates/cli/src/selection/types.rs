//! Type definitions for the selection prompts.

/// Direction to cycle through options in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Up,
    Down,
}

/// What a key press means to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(CycleDirection),
    Select,
    Cancel,
    Ignore,
}

/// Highlighted row of a list of `len` options.
///
/// Moving past either end wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    selected: usize,
    len: usize,
}

impl SelectionState {
    /// Starts at `initial`, or at the first option when `initial` is out of range.
    pub fn new(len: usize, initial: usize) -> Self {
        let selected = if initial < len { initial } else { 0 };
        Self { selected, len }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn moved(self, direction: CycleDirection) -> Self {
        if self.len == 0 {
            return self;
        }

        let selected = match direction {
            CycleDirection::Up if self.selected == 0 => self.len - 1,
            CycleDirection::Up => self.selected - 1,
            CycleDirection::Down => (self.selected + 1) % self.len,
        };

        Self { selected, ..self }
    }
}
