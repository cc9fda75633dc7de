//! # Teecore
//!
//! Deterministic, tick-based character physics for tile-grid platformer
//! worlds: walking, jumping, grappling hooks, weapons and the tile effects
//! of race maps.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          TEECORE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - 2D float vector, zero-safe normalize      │
//! │  ├── quantize.rs - Wire-precision rounding                   │
//! │  ├── rng.rs      - Xorshift jitter source                    │
//! │  └── hash.rs     - SHA-256 state fingerprints                │
//! │                                                              │
//! │  map/            - Decoded map record and builder            │
//! │  collision/      - Immutable spatial queries (shared)        │
//! │  ├── restrictions.rs - Stopper and door move restrictions    │
//! │  ├── intersect.rs    - Line, hook and weapon ray casts       │
//! │  └── movement.rs     - Box and point movement                │
//! │                                                              │
//! │  game/           - Per-tick simulation                       │
//! │  ├── character.rs- Character physics and hook               │
//! │  ├── weapons.rs  - Firing, reload, pickups                   │
//! │  ├── tiles.rs    - Tile effects, switches, teleporters       │
//! │  ├── projectile.rs / laser.rs - Entity physics               │
//! │  ├── entity.rs   - Generational entity arena                 │
//! │  └── world.rs    - WorldCore and the tick loop               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same map, config, tuning and input sequence, two worlds (or a
//! world and a copy of it) produce bit-identical state:
//! - Characters and entities are visited in a fixed order
//! - No hash maps, no system time, no thread-dependent state
//! - Random jitter comes from a generator seeded by tick and ids
//!
//! Call [`WorldCore::quantize`] before comparing state across builds.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod map;
pub mod collision;
pub mod game;

// Re-export commonly used types
pub use crate::core::vec2::Vec2;
pub use crate::core::hash::StateHash;
pub use collision::{Collision, SwitchStateProvider};
pub use map::{MapBuilder, MapData, MapError};
pub use game::{Character, CharacterId, HookState, PlayerInput, TuningTable, WorldConfig, WorldCore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation ticks per second.
pub const TICK_SPEED: i32 = 50;
