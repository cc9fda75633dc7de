//! Core deterministic primitives.
//!
//! Vector math, quantization, the jitter generator and state hashing.
//! Nothing in here knows about maps or characters.

pub mod vec2;
pub mod quantize;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::{Vec2, closest_point_on_line, saturated_add};
pub use quantize::{quantize_position_vec, quantize_velocity_vec};
pub use rng::FastRand;
pub use hash::{StateHash, StateHasher};
