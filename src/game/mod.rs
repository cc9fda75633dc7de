//! Game Simulation
//!
//! Everything that changes from tick to tick. Deterministic given the map,
//! config, tuning and input sequence.
//!
//! ## Module Structure
//!
//! - `config`: Named integer toggles
//! - `tuning`: Physics parameters, base table plus tune zones
//! - `input`: Per-tick player input record
//! - `character`: Character physics, hook and interaction
//! - `weapons`: Firing, reload, jetpack, ninja and pickups
//! - `tiles`: Tile-triggered effects, switches and teleporters
//! - `projectile` / `laser`: Entity physics
//! - `entity`: Generational entity arena
//! - `world`: World state and the tick loop

pub mod config;
pub mod tuning;
pub mod input;
pub mod character;
pub mod weapons;
pub mod tiles;
pub mod projectile;
pub mod laser;
pub mod entity;
pub mod world;

// Re-export key types
pub use config::{ConfigError, WorldConfig};
pub use tuning::{TuneKey, TuningParams, TuningTable};
pub use input::PlayerInput;
pub use character::{Character, CharacterId, HookState, NinjaState};
pub use weapons::Weapon;
pub use projectile::{EntityLayer, Projectile};
pub use laser::Laser;
pub use entity::{Entity, EntityArena, EntityHandle, EntityKind};
pub use world::{Switch, WorldCore};
