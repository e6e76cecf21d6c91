//! Per-frame input snapshot filled in by the host.
//!
//! Held state is level-triggered; `just_pressed` edges only live until
//! [`InputState::end_frame`].

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Jump straight to the interactive phase.
    Skip,
    ToggleHitboxes,
    /// Emergency exit.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Action>,
    just_pressed: HashSet<Action>,
    pointer_held: HashSet<PointerButton>,
    pointer_just_pressed: HashSet<PointerButton>,
    pub pointer: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn pointer_down(&mut self, button: PointerButton) {
        if self.pointer_held.insert(button) {
            self.pointer_just_pressed.insert(button);
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        self.pointer_held.remove(&button);
    }

    pub fn move_pointer(&mut self, position: Vec2) {
        self.pointer = position;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn clicked(&self) -> bool {
        self.pointer_just_pressed.contains(&PointerButton::Primary)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.pointer_just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_an_edge_until_end_of_frame() {
        let mut input = InputState::new();
        input.press(Action::Skip);
        assert!(input.is_just_pressed(Action::Skip));
        assert!(input.is_held(Action::Skip));

        input.end_frame();
        input.press(Action::Skip);
        assert!(!input.is_just_pressed(Action::Skip));
        assert!(input.is_held(Action::Skip));

        input.release(Action::Skip);
        input.press(Action::Skip);
        assert!(input.is_just_pressed(Action::Skip));
    }

    #[test]
    fn click_requires_a_fresh_press() {
        let mut input = InputState::new();
        input.pointer_down(PointerButton::Primary);
        assert!(input.clicked());
        input.end_frame();
        assert!(!input.clicked());
        input.pointer_down(PointerButton::Secondary);
        assert!(!input.clicked());
    }
}
