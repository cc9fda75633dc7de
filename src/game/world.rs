//! World Simulation
//!
//! `WorldCore` owns the characters, the entity arena and the switch array
//! of one simulation and advances them one tick at a time. The collision
//! map, config and tuning are shared with every copy of the world.
//!
//! Tick order is fixed. Characters are always visited in slot order, so two
//! worlds fed the same inputs stay bit-identical.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collision::{Collision, SwitchStateProvider};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::vec2::Vec2;
use crate::game::character::{intersect_character, Character, CharacterId, Neighbors};
use crate::game::config::WorldConfig;
use crate::game::entity::{Entity, EntityArena, EntityHandle, EntityKind};
use crate::game::input::PlayerInput;
use crate::game::projectile::{EntityLayer, Projectile};
use crate::game::tiles::postcore;
use crate::game::tuning::{TuningParams, TuningTable};
use crate::game::weapons::{self, Spawn, Weapon};
use crate::map::tiles::*;

// =============================================================================
// TICK ENVIRONMENT
// =============================================================================

/// Read-only world context handed to per-character and per-entity updates.
///
/// Borrowing these separately from the mutable character and entity lists
/// lets one character be updated while the rest of the world is visible.
#[derive(Clone, Copy)]
pub(crate) struct TickEnv<'a> {
    /// Static map
    pub collision: &'a Collision,
    /// Config toggles
    pub config: &'a WorldConfig,
    /// Base and zone tuning
    pub tuning: &'a TuningTable,
    /// Tick being simulated
    pub game_tick: i32,
    /// Number of character slots
    pub characters: usize,
}

impl<'a> TickEnv<'a> {
    /// Effective tuning for `zone`.
    #[inline]
    pub fn tuning(&self, zone: u8) -> &'a TuningParams {
        self.tuning.get(zone as usize)
    }
}

// =============================================================================
// SWITCHES
// =============================================================================

/// One map switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Switch {
    /// Current state
    pub status: bool,
    /// State at world creation
    pub initial: bool,
    /// Tick a timed switch flips back, 0 when untimed
    pub end_tick: i32,
    /// Switch tile that last wrote this switch
    pub kind: u8,
    /// Tick of the last write
    pub last_update_tick: i32,
}

impl Switch {
    fn fresh() -> Self {
        Self { status: true, initial: true, ..Self::default() }
    }
}

impl SwitchStateProvider for Vec<Switch> {
    #[inline]
    fn is_active(&self, number: i32) -> bool {
        usize::try_from(number).ok().and_then(|n| self.get(n)).is_some_and(|s| s.status)
    }
}

/// Expire timed switches whose end tick has passed.
fn expire_switches(switches: &mut [Switch], now: i32) {
    for (number, switch) in switches.iter_mut().enumerate() {
        if switch.end_tick == 0 || switch.end_tick > now {
            continue;
        }
        match switch.kind {
            TILE_SWITCHTIMEDOPEN => switch.status = false,
            TILE_SWITCHTIMEDCLOSE => switch.status = true,
            _ => {}
        }
        switch.end_tick = 0;
        debug!(number, status = switch.status, "switch timer expired");
    }
}

// =============================================================================
// WORLD
// =============================================================================

/// One simulated world.
///
/// `Clone` forks the world: characters, entities and switches are copied,
/// the collision map, config and tuning stay shared until mutated.
#[derive(Clone)]
pub struct WorldCore {
    collision: Arc<Collision>,
    config: Arc<WorldConfig>,
    tuning: Arc<TuningTable>,
    characters: Vec<Character>,
    entities: EntityArena,
    switches: Vec<Switch>,
    game_tick: i32,
}

impl WorldCore {
    /// New world on `collision`.
    ///
    /// Map-global tiles adjust the config and base tuning, and crazy-shotgun
    /// tiles spawn their projectiles.
    pub fn new(collision: Arc<Collision>, mut config: WorldConfig) -> Self {
        let mut tuning = TuningTable::new();
        apply_global_tiles(&collision, &mut config, &mut tuning);

        let switches = match collision.highest_switch_number() {
            0 => Vec::new(),
            highest => vec![Switch::fresh(); highest as usize + 1],
        };

        let mut world = Self {
            collision,
            config: Arc::new(config),
            tuning: Arc::new(tuning),
            characters: Vec::new(),
            entities: EntityArena::new(),
            switches,
            game_tick: 0,
        };
        world.create_map_entities();
        debug!(
            switches = world.switches.len(),
            projectiles = world.entities.count(EntityKind::Projectile),
            "world created"
        );
        world
    }

    fn env(&self) -> TickEnv<'_> {
        TickEnv {
            collision: &self.collision,
            config: &self.config,
            tuning: &self.tuning,
            game_tick: self.game_tick,
            characters: self.characters.len(),
        }
    }

    fn create_map_entities(&mut self) {
        let col = Arc::clone(&self.collision);
        let map = col.map();
        let mut spawned = Vec::new();

        for y in 0..col.height() {
            for x in 0..col.width() {
                let index = col.cell_index(x, y);
                let pos = Vec2::from_ints(x * 32 + 16, y * 32 + 16);
                if let Some(e) = entity_id(map.game.index[index]) {
                    spawned.extend(crazy_shotgun(e, map.game.flags[index], pos, EntityLayer::Game, 0));
                }
                if let Some(front) = &map.front {
                    if let Some(e) = entity_id(front.index[index]) {
                        spawned.extend(crazy_shotgun(e, front.flags[index], pos, EntityLayer::Front, 0));
                    }
                }
                if let Some(switch) = &map.switch {
                    if let Some(e) = entity_id(switch.kind[index]) {
                        let number = switch.number[index] as i32;
                        spawned.extend(crazy_shotgun(e, switch.flags[index], pos, EntityLayer::Switch, number));
                    }
                }
            }
        }

        let env = self.env();
        let projectiles: Vec<Projectile> = spawned
            .into_iter()
            .map(|s| {
                Projectile::new(Weapon::Shotgun, None, s.pos, s.dir, -2, &env)
                    .with_freeze(true)
                    .with_explosive(s.explosive)
                    .with_bouncing(s.bouncing)
                    .on_layer(s.layer, s.number)
            })
            .collect();
        for p in projectiles {
            self.entities.insert(Entity::Projectile(p));
        }
    }

    // =========================================================================
    // CHARACTERS
    // =========================================================================

    /// Add a character at the spawn for its slot.
    ///
    /// `None` when the map has no spawn points.
    pub fn add_character(&mut self) -> Option<CharacterId> {
        let slot = self.characters.len() as u32;
        match self.collision.spawn_position(slot) {
            Some(pos) => Some(self.add_character_at(pos)),
            None => {
                warn!(slot, "map has no spawn points");
                None
            }
        }
    }

    /// Add a character at an explicit position.
    pub fn add_character_at(&mut self, pos: Vec2) -> CharacterId {
        let id = CharacterId(self.characters.len() as u32);
        let mut character = Character::new(id, pos);
        let col = &self.collision;
        let index = col.map_index(pos);
        character.tune_zone = col.is_tune(index);
        character.move_restrictions =
            col.move_restrictions(&self.switches, pos, crate::collision::restrictions::PROBE_DISTANCE, Some(index));
        self.characters.push(character);
        debug!(character = id.raw(), x = pos.x, y = pos.y, "character added");
        id
    }

    /// Retire a character. Its handle is never reused.
    pub fn remove_character(&mut self, id: CharacterId) {
        let slot = self.slot_mut(id);
        slot.active = false;
        slot.reset_hook();
        for other in self.characters.iter_mut() {
            other.release_if_hooking(id);
        }
        debug!(character = id.raw(), "character removed");
    }

    /// Stage input for the next tick.
    pub fn on_input(&mut self, id: CharacterId, input: PlayerInput) {
        let slot = self.slot_mut(id);
        if !slot.active {
            warn!(character = id.raw(), "input for removed character ignored");
            return;
        }
        slot.saved_input = Some(input);
    }

    #[track_caller]
    fn slot_mut(&mut self, id: CharacterId) -> &mut Character {
        let count = self.characters.len();
        match self.characters.get_mut(id.index()) {
            Some(c) => c,
            None => panic!("character {} out of range ({} slots)", id.raw(), count),
        }
    }

    /// Character in slot `id`, removed ones included.
    ///
    /// # Panics
    ///
    /// If `id` does not belong to this world.
    #[track_caller]
    pub fn character(&self, id: CharacterId) -> &Character {
        match self.characters.get(id.index()) {
            Some(c) => c,
            None => panic!("character {} out of range ({} slots)", id.raw(), self.characters.len()),
        }
    }

    /// Mutable character in slot `id`.
    ///
    /// # Panics
    ///
    /// If `id` does not belong to this world.
    #[track_caller]
    pub fn character_mut(&mut self, id: CharacterId) -> &mut Character {
        self.slot_mut(id)
    }

    /// Every character slot in id order.
    #[inline]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// First active character touching the segment `p0`..`p1`.
    pub fn intersect_character(
        &self,
        p0: Vec2,
        p1: Vec2,
        radius: f32,
        not_this: Option<CharacterId>,
    ) -> Option<(CharacterId, Vec2)> {
        intersect_character(&self.characters, p0, p1, radius, not_this, None)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Ticks simulated so far.
    #[inline]
    pub fn game_tick(&self) -> i32 {
        self.game_tick
    }

    /// Shared collision map.
    #[inline]
    pub fn collision(&self) -> &Arc<Collision> {
        &self.collision
    }

    /// Config toggles.
    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Mutable config; unshares it from other copies.
    pub fn config_mut(&mut self) -> &mut WorldConfig {
        Arc::make_mut(&mut self.config)
    }

    /// Tuning table.
    #[inline]
    pub fn tuning(&self) -> &TuningTable {
        &self.tuning
    }

    /// Mutable tuning; unshares it from other copies.
    pub fn tuning_mut(&mut self) -> &mut TuningTable {
        Arc::make_mut(&mut self.tuning)
    }

    /// Switch array, indexed by switch number.
    #[inline]
    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    /// Entity arena.
    #[inline]
    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    /// Whether two worlds use the same map, config and tuning allocations.
    pub fn shares_statics_with(&self, other: &WorldCore) -> bool {
        Arc::ptr_eq(&self.collision, &other.collision)
            && Arc::ptr_eq(&self.config, &other.config)
            && Arc::ptr_eq(&self.tuning, &other.tuning)
    }

    // =========================================================================
    // COPY / HASH
    // =========================================================================

    /// Overwrite this world with `other`, reusing allocations.
    pub fn copy_from(&mut self, other: &WorldCore) {
        self.collision = Arc::clone(&other.collision);
        self.config = Arc::clone(&other.config);
        self.tuning = Arc::clone(&other.tuning);
        self.characters.clone_from(&other.characters);
        self.entities.clone_from(&other.entities);
        self.switches.clone_from(&other.switches);
        self.game_tick = other.game_tick;
        debug!(tick = self.game_tick, characters = self.characters.len(), "world copied");
    }

    /// Round every active character to wire precision.
    pub fn quantize(&mut self) {
        for c in self.characters.iter_mut().filter(|c| c.active) {
            c.quantize();
        }
    }

    /// SHA-256 fingerprint of the dynamic world state.
    pub fn state_hash(&self) -> StateHash {
        let mut h = StateHasher::for_world_state();
        h.update_i32(self.game_tick);

        h.update_u32(self.switches.len() as u32);
        for s in &self.switches {
            h.update_bool(s.status);
            h.update_i32(s.end_tick);
            h.update_u8(s.kind);
        }

        for c in &self.characters {
            h.update_bool(c.active);
            if !c.active {
                continue;
            }
            h.update_vec2(c.pos);
            h.update_vec2(c.vel);
            h.update_vec2(c.hook_pos);
            h.update_u8(c.hook_state.as_i8() as u8);
            h.update_i32(c.hooked.map_or(-1, |id| id.raw() as i32));
            h.update_i32(c.jumped);
            h.update_i32(c.freeze_time);
            h.update_u8(c.active_weapon as u8);
        }

        for (_, entity) in self.entities.iter() {
            match entity {
                Entity::Projectile(p) => {
                    h.update_u8(0);
                    h.update_vec2(p.start_pos());
                    h.update_i32(p.start_tick());
                    h.update_i32(p.lifespan());
                }
                Entity::Laser(l) => {
                    h.update_u8(1);
                    h.update_vec2(l.pos());
                    h.update_vec2(l.from());
                    h.update_f32(l.energy());
                }
            }
        }
        h.finalize()
    }

    // =========================================================================
    // TICK
    // =========================================================================

    fn insert_spawn(&mut self, spawn: Spawn, env: &TickEnv<'_>) -> Option<EntityHandle> {
        let entity = match spawn {
            Spawn::Projectile(p) => Entity::Projectile(p),
            Spawn::Laser(mut l) => {
                if !l.bounce(env, &mut self.characters) {
                    return None;
                }
                Entity::Laser(l)
            }
        };
        let kind = entity.kind();
        let handle = self.entities.insert(entity);
        debug!(?kind, index = handle.index(), "entity spawned");
        Some(handle)
    }

    /// Advance the world by one tick.
    pub fn tick(&mut self) {
        let statics = (Arc::clone(&self.collision), Arc::clone(&self.config), Arc::clone(&self.tuning));
        let (collision, config, tuning) = (&*statics.0, &*statics.1, &*statics.2);
        let count = self.characters.len();
        let commit_env = TickEnv { collision, config, tuning, game_tick: self.game_tick, characters: count };
        let env = TickEnv { game_tick: self.game_tick + 1, ..commit_env };

        // 1. Commit staged inputs
        for i in 0..count {
            let spawn = {
                let Some((ch, mut others)) = Neighbors::split(&mut self.characters, i) else { continue };
                let Some(input) = ch.saved_input.take().filter(|_| ch.active) else { continue };
                weapons::commit_input(ch, input, &mut others, &commit_env)
            };
            if let Some(spawn) = spawn {
                self.insert_spawn(spawn, &commit_env);
            }
        }

        // 2. Projectiles, then lasers
        for kind in [EntityKind::Projectile, EntityKind::Laser] {
            let handles = self.entities.handles(kind).to_vec();
            for handle in handles {
                if !self.entities.is_alive(handle) {
                    continue;
                }
                let alive = match self.entities.get_mut(handle) {
                    Some(Entity::Projectile(p)) => p.tick(&env, &mut self.characters, &self.switches),
                    Some(Entity::Laser(l)) => l.tick(&env, &mut self.characters),
                    None => true,
                };
                if !alive {
                    self.entities.mark_destroyed(handle);
                    debug!(?kind, index = handle.index(), "entity destroyed");
                }
            }
        }

        // 3. Pickups
        for c in self.characters.iter_mut().filter(|c| c.active) {
            weapons::collect_pickups(c, &self.switches, &env);
        }

        // 4. Primary phase
        for i in 0..count {
            let Some((ch, others)) = Neighbors::split(&mut self.characters, i) else { continue };
            if ch.active {
                ch.pre_tick(&env, &others);
            }
        }

        // 5. Interactions, weapons and tiles
        for i in 0..count {
            let spawn = {
                let Some((ch, mut others)) = Neighbors::split(&mut self.characters, i) else { continue };
                if !ch.active {
                    continue;
                }
                if ch.respawn_delay > 0 {
                    ch.respawn_delay -= 1;
                }
                ch.interact(&env, &mut others);
                let spawn = weapons::handle_weapons(ch, &mut others, &env);
                postcore(ch, &mut others, &mut self.switches, &env);
                ch.prev_pos = ch.pos;
                if ch.hit_num > 0 {
                    ch.hit_num -= 1;
                }
                spawn
            };
            if let Some(spawn) = spawn {
                self.insert_spawn(spawn, &env);
            }
        }

        // 6. Movement
        for c in self.characters.iter_mut().filter(|c| c.active) {
            c.move_pass(&env, &self.switches);
        }

        // 7. Retire destroyed entities
        self.entities.sweep();

        // 8. Switch timers
        expire_switches(&mut self.switches, env.game_tick);

        // 9. Advance
        self.game_tick = env.game_tick;
        #[cfg(feature = "debug-tracing")]
        tracing::trace!(tick = self.game_tick, entities = self.entities.len(), "tick done");
    }
}

impl SwitchStateProvider for WorldCore {
    #[inline]
    fn is_active(&self, number: i32) -> bool {
        self.switches.is_active(number)
    }
}

impl std::fmt::Debug for WorldCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldCore")
            .field("game_tick", &self.game_tick)
            .field("characters", &self.characters.len())
            .field("entities", &self.entities.len())
            .field("switches", &self.switches.len())
            .finish()
    }
}

// =============================================================================
// MAP SETUP
// =============================================================================

/// Map-global toggles read from the game and front layers.
fn apply_global_tiles(collision: &Collision, config: &mut WorldConfig, tuning: &mut TuningTable) {
    let map = collision.map();
    let layers = std::iter::once(&map.game.index).chain(map.front.as_ref().map(|f| &f.index));
    for layer in layers {
        for &tile in layer.iter() {
            match tile {
                TILE_NPC => tuning.base_mut().player_collision = 0.0,
                TILE_EHOOK => config.sv_endless_drag = 1,
                TILE_NOHIT => config.sv_hit = 0,
                TILE_NPH => tuning.base_mut().player_hooking = 0.0,
                _ => {}
            }
        }
    }
}

struct MapProjectile {
    pos: Vec2,
    dir: Vec2,
    explosive: bool,
    bouncing: i32,
    layer: EntityLayer,
    number: i32,
}

/// Crazy-shotgun entity at `pos`, aimed by the tile's rotation.
fn crazy_shotgun(entity: u8, flags: u8, pos: Vec2, layer: EntityLayer, number: i32) -> Option<MapProjectile> {
    let explosive = match entity {
        ENTITY_CRAZY_SHOTGUN_EX => true,
        ENTITY_CRAZY_SHOTGUN => false,
        _ => return None,
    };
    let quarter = match flags {
        0 => 0,
        ROTATION_90 => 1,
        ROTATION_180 => 2,
        _ => 3,
    };
    let angle = quarter as f32 * std::f32::consts::FRAC_PI_2;
    Some(MapProjectile {
        pos,
        dir: Vec2::new(angle.sin(), angle.cos()),
        explosive,
        bouncing: 2 - quarter % 2,
        layer,
        number,
    })
}

// =============================================================================
// TESTS
// =============================================================================
