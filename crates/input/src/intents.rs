use std::cell::Cell;
use std::rc::Rc;

use crate::action::{Action, MoveDirection};

/// The four held-direction flags the motion controller reads each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementIntents {
    pub fn set(&mut self, direction: MoveDirection, held: bool) {
        match direction {
            MoveDirection::Forward => self.forward = held,
            MoveDirection::Backward => self.backward = held,
            MoveDirection::Left => self.left = held,
            MoveDirection::Right => self.right = held,
        }
    }

    pub fn get(&self, direction: MoveDirection) -> bool {
        match direction {
            MoveDirection::Forward => self.forward,
            MoveDirection::Backward => self.backward,
            MoveDirection::Left => self.left,
            MoveDirection::Right => self.right,
        }
    }

    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
    }
}

/// Anything that can receive movement edge events.
///
/// Keyboard and touch sources are handed one of these instead of reaching
/// for a shared global.
pub trait IntentSink {
    fn move_start(&self, direction: MoveDirection);
    fn move_end(&self, direction: MoveDirection);
}

/// Cloneable handle onto one session's movement intents.
///
/// All clones share the same flags. The handle is deliberately `!Send`: input
/// callbacks and the frame loop run on the same thread.
#[derive(Debug, Clone, Default)]
pub struct IntentHandle {
    intents: Rc<Cell<MovementIntents>>,
}

impl IntentHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> MovementIntents {
        self.intents.get()
    }

    /// Release every direction, e.g. when the window loses focus.
    pub fn clear(&self) {
        self.intents.set(MovementIntents::default());
    }

    /// Apply a movement action. Returns `true` if the action was a movement edge.
    pub fn apply(&self, action: &Action) -> bool {
        match action {
            Action::MoveStart(d) => {
                self.move_start(*d);
                true
            }
            Action::MoveEnd(d) => {
                self.move_end(*d);
                true
            }
            _ => false,
        }
    }

    fn update(&self, direction: MoveDirection, held: bool) {
        let mut current = self.intents.get();
        current.set(direction, held);
        self.intents.set(current);
    }
}

impl IntentSink for IntentHandle {
    fn move_start(&self, direction: MoveDirection) {
        self.update(direction, true);
    }

    fn move_end(&self, direction: MoveDirection) {
        self.update(direction, false);
    }
}
