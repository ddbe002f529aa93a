use std::{cell::RefCell, rc::Rc};

use super::{Decision, Policy, View};

/// The four logical paddle keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LeftUp,
    LeftDown,
    RightUp,
    RightDown,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::LeftUp,
        Action::LeftDown,
        Action::RightUp,
        Action::RightDown,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// "Is this key held right now?"
pub trait KeyQuery {
    fn is_down(&self, action: Action) -> bool;
}

impl<K: KeyQuery> KeyQuery for Rc<RefCell<K>> {
    fn is_down(&self, action: Action) -> bool {
        self.borrow().is_down(action)
    }
}

/// Human paddle driven by two keys.
pub struct KeyboardPolicy<K> {
    keys: K,
    up: Action,
    down: Action,
}

impl<K: KeyQuery> KeyboardPolicy<K> {
    pub fn new(keys: K, up: Action, down: Action) -> Self {
        Self { keys, up, down }
    }

    /// W/S
    pub fn left(keys: K) -> Self {
        Self::new(keys, Action::LeftUp, Action::LeftDown)
    }

    /// Up/Down arrows
    pub fn right(keys: K) -> Self {
        Self::new(keys, Action::RightUp, Action::RightDown)
    }
}

impl<K: KeyQuery> Policy for KeyboardPolicy<K> {
    fn decide(&mut self, _view: &View<'_>) -> Decision {
        match (self.keys.is_down(self.up), self.keys.is_down(self.down)) {
            (true, false) => Decision::Up,
            (false, true) => Decision::Down,
            _ => Decision::Hold,
        }
    }
}
