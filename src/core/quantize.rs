//! Quantization Helpers
//!
//! Rounds simulation state to a fixed precision before it is persisted or
//! compared: positions to whole world units, velocities to 1/256 units.

use super::vec2::Vec2;

/// Velocity quantization steps per world unit.
pub const VELOCITY_STEPS: f32 = 256.0;

/// Round a position component to the nearest whole unit (halves round up).
#[inline]
pub fn quantize_position(value: f32) -> f32 {
    ((value + 0.5) as i32) as f32
}

/// Round a velocity component to the nearest 1/256 unit, halves away from zero.
#[inline]
pub fn quantize_velocity(value: f32) -> f32 {
    let scaled = value * VELOCITY_STEPS;
    let rounded = if scaled >= 0.0 { scaled + 0.5 } else { scaled - 0.5 };
    (rounded as i32) as f32 / VELOCITY_STEPS
}

/// Quantize both components of a position.
#[inline]
pub fn quantize_position_vec(v: Vec2) -> Vec2 {
    Vec2::new(quantize_position(v.x), quantize_position(v.y))
}

/// Quantize both components of a velocity.
#[inline]
pub fn quantize_velocity_vec(v: Vec2) -> Vec2 {
    Vec2::new(quantize_velocity(v.x), quantize_velocity(v.y))
}
