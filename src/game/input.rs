//! Per-Tick Player Input
//!
//! The record a host stages for a character before each tick. All fields
//! are small integers so the record can be logged and replayed verbatim.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;

/// Input sample for one character and one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal movement: -1 left, 0 none, 1 right
    pub direction: i32,
    /// Aim X relative to the character
    pub target_x: i32,
    /// Aim Y relative to the character
    pub target_y: i32,
    /// Jump held
    pub jump: bool,
    /// Fire press counter; odd while the button is held
    pub fire: i32,
    /// Hook held
    pub hook: bool,
    /// Weapon the player wants (clamped to the weapon range)
    pub wanted_weapon: i32,
    /// Kill and respawn
    pub kill: bool,
}

impl PlayerInput {
    /// Idle input aiming straight up.
    pub const fn new() -> Self {
        Self {
            direction: 0,
            target_x: 0,
            target_y: -1,
            jump: false,
            fire: 0,
            hook: false,
            wanted_weapon: 0,
            kill: false,
        }
    }

    /// Movement only.
    pub const fn moving(direction: i32) -> Self {
        let mut input = Self::new();
        input.direction = direction;
        input
    }

    /// Aim at `(x, y)` relative to the character.
    pub const fn aiming(mut self, x: i32, y: i32) -> Self {
        self.target_x = x;
        self.target_y = y;
        self
    }

    /// Aim vector as floats.
    #[inline]
    pub fn target(&self) -> Vec2 {
        Vec2::from_ints(self.target_x, self.target_y)
    }

    /// Fire button held this tick.
    #[inline]
    pub fn fire_held(&self) -> bool {
        self.fire & 1 != 0
    }

    /// Aim at the origin is replaced by straight up.
    pub(crate) fn sanitized(mut self) -> Self {
        if self.target_x == 0 && self.target_y == 0 {
            self.target_y = -1;
        }
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_aims_up() {
        let input = PlayerInput::new();
        assert_eq!(input.target(), Vec2::new(0.0, -1.0));
        assert!(!input.fire_held());
    }

    #[test]
    fn test_sanitize_zero_target() {
        let input = PlayerInput::moving(1).aiming(0, 0).sanitized();
        assert_eq!((input.target_x, input.target_y), (0, -1));
        let aimed = PlayerInput::moving(1).aiming(5, 0).sanitized();
        assert_eq!((aimed.target_x, aimed.target_y), (5, 0));
    }

    #[test]
    fn test_fire_counter_parity() {
        let mut input = PlayerInput::new();
        input.fire = 1;
        assert!(input.fire_held());
        input.fire = 2;
        assert!(!input.fire_held());
    }

    #[test]
    fn test_serde_round_trip() {
        let input = PlayerInput { direction: -1, jump: true, wanted_weapon: 3, ..PlayerInput::new() };
        let json = serde_json::to_string(&input).unwrap();
        let back: PlayerInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }
}
