//! Keyboard and pointer mapping
//!
//! Raw browser events come in as key codes and screen coordinates; the
//! mapper keeps the held-key state and produces one [`TickInput`] per frame.

use crate::consts::PLAY_HALF_WIDTH;
use crate::sim::TickInput;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
}

impl Key {
    /// Map a `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            "Space" => Some(Key::Fire),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputMapper {
    left: bool,
    right: bool,
    fire_key: bool,
    pointer_down: bool,
    /// Latest pointer target, consumed by the next frame
    pending_target: Option<f32>,
    viewport_width: f32,
    margin: f32,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl InputMapper {
    /// `margin` keeps pointer targets this far inside the side walls
    pub fn new(margin: f32) -> Self {
        Self {
            left: false,
            right: false,
            fire_key: false,
            pointer_down: false,
            pending_target: None,
            viewport_width: 1.0,
            margin,
        }
    }

    /// Returns true if the key is one the game uses
    pub fn key_down(&mut self, code: &str) -> bool {
        self.set_key(code, true)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.set_key(code, false)
    }

    fn set_key(&mut self, code: &str, held: bool) -> bool {
        match Key::from_code(code) {
            Some(Key::Left) => self.left = held,
            Some(Key::Right) => self.right = held,
            Some(Key::Fire) => self.fire_key = held,
            None => return false,
        }
        true
    }

    pub fn resize(&mut self, width: f32) {
        if width > 0.0 {
            self.viewport_width = width;
        }
    }

    /// Map a pointer/touch x in CSS pixels onto the play field
    pub fn pointer_move(&mut self, screen_x: f32) {
        self.pending_target = Some(self.screen_to_field(screen_x));
    }

    pub fn pointer_down(&mut self, screen_x: f32) {
        self.pointer_down = true;
        self.pointer_move(screen_x);
    }

    pub fn pointer_up(&mut self) {
        self.pointer_down = false;
    }

    pub fn screen_to_field(&self, screen_x: f32) -> f32 {
        let pct = screen_x / self.viewport_width;
        let limit = PLAY_HALF_WIDTH - self.margin;
        (pct * PLAY_HALF_WIDTH * 2.0 - PLAY_HALF_WIDTH).clamp(-limit, limit)
    }

    /// Input for the coming frame
    pub fn tick_input(&mut self) -> TickInput {
        let steer = match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        TickInput {
            target_x: self.pending_target.take(),
            steer,
            fire: self.fire_key || self.pointer_down,
            autopilot: false,
        }
    }

    /// Drop held keys (window blur)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
        self.fire_key = false;
        self.pointer_down = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_code("KeyD"), Some(Key::Right));
        assert_eq!(Key::from_code("Space"), Some(Key::Fire));
        assert_eq!(Key::from_code("KeyQ"), None);
    }

    #[test]
    fn test_steer_from_held_keys() {
        let mut input = InputMapper::default();
        assert!(input.key_down("ArrowLeft"));
        assert_eq!(input.tick_input().steer, -1.0);
        input.key_down("ArrowRight");
        // Both held cancel out
        assert_eq!(input.tick_input().steer, 0.0);
        input.key_up("ArrowLeft");
        assert_eq!(input.tick_input().steer, 1.0);
        assert!(!input.key_down("Tab"));
    }

    #[test]
    fn test_pointer_target_is_consumed_once() {
        let mut input = InputMapper::default();
        input.resize(800.0);
        input.pointer_move(400.0);
        assert_eq!(input.tick_input().target_x, Some(0.0));
        assert_eq!(input.tick_input().target_x, None);
    }

    #[test]
    fn test_pointer_mapping_edges() {
        let mut input = InputMapper::default();
        input.resize(1000.0);
        assert_eq!(input.screen_to_field(0.0), -10.0);
        assert_eq!(input.screen_to_field(1000.0), 10.0);
        assert!((input.screen_to_field(750.0) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_release_all_on_blur() {
        let mut input = InputMapper::default();
        input.key_down("Space");
        input.pointer_down(10.0);
        assert!(input.tick_input().fire);
        input.release_all();
        assert!(!input.tick_input().fire);
    }

    proptest! {
        #[test]
        fn prop_pointer_stays_inside_margin(width in 1.0f32..4000.0, x in -500.0f32..5000.0) {
            let mut input = InputMapper::default();
            input.resize(width);
            let mapped = input.screen_to_field(x);
            prop_assert!(mapped.abs() <= 10.0);
        }
    }
}
