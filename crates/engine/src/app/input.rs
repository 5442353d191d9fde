use crate::grid::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
        }
    }
}

/// One frame of device-agnostic input: held movement keys plus the discrete
/// confirm edge. How keys map to actions is the input source's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    confirm_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// True on the frame the confirm key went down, never while held.
    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    /// Movement direction for this frame. Simultaneous holds resolve in a
    /// fixed order so ties are deterministic.
    pub fn held_direction(&self) -> Option<Direction> {
        if self.actions.is_down(InputAction::MoveUp) {
            Some(Direction::Up)
        } else if self.actions.is_down(InputAction::MoveDown) {
            Some(Direction::Down)
        } else if self.actions.is_down(InputAction::MoveLeft) {
            Some(Direction::Left)
        } else if self.actions.is_down(InputAction::MoveRight) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}
