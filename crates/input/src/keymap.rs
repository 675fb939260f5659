use std::collections::HashMap;

use crate::action::{Action, MoveDirection};

/// Maps physical key codes (DOM `KeyboardEvent.code` names such as `KeyW`
/// or `ArrowUp`) to movement directions.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<String, MoveDirection>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind("KeyW", MoveDirection::Forward);
        b.bind("ArrowUp", MoveDirection::Forward);
        b.bind("KeyS", MoveDirection::Backward);
        b.bind("ArrowDown", MoveDirection::Backward);
        b.bind("KeyA", MoveDirection::Left);
        b.bind("ArrowLeft", MoveDirection::Left);
        b.bind("KeyD", MoveDirection::Right);
        b.bind("ArrowRight", MoveDirection::Right);
        b
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key code, replacing any previous binding for it.
    pub fn bind(&mut self, code: impl Into<String>, direction: MoveDirection) {
        self.bindings.insert(code.into(), direction);
    }

    pub fn direction(&self, code: &str) -> Option<MoveDirection> {
        self.bindings.get(code).copied()
    }

    /// Translate a key edge into an action. Unbound keys become `Action::Noop`.
    pub fn action_for(&self, code: &str, pressed: bool) -> Action {
        match self.direction(code) {
            Some(d) if pressed => Action::MoveStart(d),
            Some(d) => Action::MoveEnd(d),
            None => Action::Noop,
        }
    }
}
