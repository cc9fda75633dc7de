//! Collision Engine
//!
//! Immutable, precomputed view of a [`MapData`] answering every spatial
//! question the simulation asks: solidity, stoppers, teleporters, speedups,
//! tune zones, pickups and line/box queries.
//!
//! A `Collision` is built once per map and shared (behind an `Arc`) by any
//! number of worlds. Queries never mutate it.
//!
//! Grid indices are always clamped: positions outside the map alias the
//! border row or column. Absent optional layers answer 0 / `false` / `None`.

pub mod restrictions;
pub mod intersect;
pub mod movement;

use tracing::info;

use crate::core::vec2::Vec2;
use crate::map::{MapData, MapError};
use crate::map::tiles::*;

pub use restrictions::{clamp_vel, restrictions_for};
pub use intersect::{HookHit, LineHit, WeaponHit};

/// Width and height of one tile in world units.
pub const TILE_SIZE: i32 = 32;

/// Side length of a character's collision box.
pub const PHYSICAL_SIZE: f32 = 28.0;

/// Half of [`PHYSICAL_SIZE`].
pub const HALF_PHYSICAL_SIZE: f32 = 14.0;

/// Offset of the four death-tile probes from the character center.
pub const DEATH_PROBE: f32 = 9.0;

/// Number of tune zones (zone 0 is the base tuning).
pub const NUM_TUNE_ZONES: usize = 256;

/// Teleporter numbers are bytes.
const NUM_TELE_NUMBERS: usize = 256;

const INFO_SOLID: u8 = 1 << 0;
const INFO_HAS_TILES: u8 = 1 << 1;

/// Answers whether a numbered switch is currently on.
///
/// Collision queries that depend on door tiles take one of these instead
/// of a world reference.
pub trait SwitchStateProvider {
    /// True if switch `number` exists and is on.
    fn is_active(&self, number: i32) -> bool;
}

/// Provider for maps or callers without switches: every switch is off.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSwitches;

impl SwitchStateProvider for NoSwitches {
    #[inline]
    fn is_active(&self, _number: i32) -> bool {
        false
    }
}

/// Kind of pickup placed on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    /// Heart: freezes the collector
    Health,
    /// Shield: strips shotgun, grenade, laser and ninja
    Armor,
    /// Grants the weapon in `subtype`
    Weapon,
    /// Grants ninja
    Ninja,
    /// Strips shotgun
    ArmorShotgun,
    /// Strips grenade
    ArmorGrenade,
    /// Strips ninja
    ArmorNinja,
    /// Strips laser
    ArmorLaser,
}

/// A pickup tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pickup {
    /// What it does
    pub kind: PickupKind,
    /// Gating switch number (0 = always on)
    pub number: u8,
    /// Weapon index for [`PickupKind::Weapon`] and [`PickupKind::Ninja`]
    pub subtype: u8,
}

/// Layer a pickup lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupLayer {
    /// Game layer
    Game,
    /// Front layer
    Front,
}

/// Speedup tile parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Speedup {
    /// Unit boost direction
    pub dir: Vec2,
    /// Boost force
    pub force: i32,
    /// Speed cap (0 = derive from velocity ramp)
    pub max_speed: i32,
    /// Boost tile id (old or new style)
    pub kind: u8,
}

/// Map a pickup entity id to its kind and weapon subtype.
fn pickup_for_entity(entity: u8) -> Option<(PickupKind, u8)> {
    let pickup = match entity {
        ENTITY_ARMOR_1 => (PickupKind::Armor, 0),
        ENTITY_HEALTH_1 => (PickupKind::Health, 0),
        ENTITY_WEAPON_SHOTGUN => (PickupKind::Weapon, 2),
        ENTITY_WEAPON_GRENADE => (PickupKind::Weapon, 3),
        ENTITY_POWERUP_NINJA => (PickupKind::Ninja, 5),
        ENTITY_WEAPON_LASER => (PickupKind::Weapon, 4),
        ENTITY_ARMOR_SHOTGUN => (PickupKind::ArmorShotgun, 0),
        ENTITY_ARMOR_GRENADE => (PickupKind::ArmorGrenade, 0),
        ENTITY_ARMOR_NINJA => (PickupKind::ArmorNinja, 0),
        ENTITY_ARMOR_LASER => (PickupKind::ArmorLaser, 0),
        _ => return None,
    };
    Some(pickup)
}

/// Precomputed collision map.
#[derive(Debug)]
pub struct Collision {
    map: MapData,
    width: i32,
    height: i32,
    infos: Vec<u8>,
    move_restrictions: Vec<[u8; 5]>,
    move_restrictions_found: bool,
    pickups: Vec<Option<Pickup>>,
    front_pickups: Vec<Option<Pickup>>,
    spawn_points: Vec<Vec2>,
    tele_outs: Vec<Vec<Vec2>>,
    tele_check_outs: Vec<Vec<Vec2>>,
    highest_switch_number: u8,
}

impl Collision {
    /// Validate `map` and precompute all derived tables.
    pub fn new(map: MapData) -> Result<Self, MapError> {
        map.validate()?;

        let width = map.width as i32;
        let height = map.height as i32;
        let cells = map.cell_count();

        let mut collision = Self {
            map,
            width,
            height,
            infos: vec![0; cells],
            move_restrictions: vec![[0; 5]; cells],
            move_restrictions_found: false,
            pickups: vec![None; cells],
            front_pickups: vec![None; cells],
            spawn_points: Vec::new(),
            tele_outs: vec![Vec::new(); NUM_TELE_NUMBERS],
            tele_check_outs: vec![Vec::new(); NUM_TELE_NUMBERS],
            highest_switch_number: 0,
        };

        collision.highest_switch_number = collision
            .map
            .switch
            .as_ref()
            .and_then(|s| s.number.iter().copied().max())
            .unwrap_or(0);

        for i in 0..cells {
            collision.init_cell(i);
        }

        // row-major scan so list order is stable
        for y in 0..height {
            for x in 0..width {
                let i = (y * width + x) as usize;
                let game = collision.map.game.index[i];
                let front = collision.front_tile_index(i);
                if is_spawn_tile(game) || is_spawn_tile(front) {
                    collision.spawn_points.push(Vec2::from_ints(x, y));
                }
                if let Some(tele) = &collision.map.tele {
                    let center = Vec2::new((x * TILE_SIZE) as f32 + 16.0, (y * TILE_SIZE) as f32 + 16.0);
                    let number = tele.number[i] as usize;
                    match tele.kind[i] {
                        TILE_TELEOUT => collision.tele_outs[number].push(center),
                        TILE_TELECHECKOUT => collision.tele_check_outs[number].push(center),
                        _ => {}
                    }
                }
            }
        }

        info!(
            width,
            height,
            spawns = collision.spawn_points.len(),
            tele_outs = collision.tele_outs.iter().map(Vec::len).sum::<usize>(),
            highest_switch = collision.highest_switch_number,
            "collision map ready"
        );

        Ok(collision)
    }

    fn init_cell(&mut self, i: usize) {
        let game = self.map.game.index[i];
        if game == TILE_SOLID || game == TILE_NOHOOK {
            self.infos[i] |= INFO_SOLID;
        }
        if self.cell_has_tiles(i) {
            self.infos[i] |= INFO_HAS_TILES;
        }

        for d in 0..5u8 {
            let mut r = 0;
            if let Some(front) = &self.map.front {
                r |= restrictions_for(d, front.index[i], front.flags[i]);
            }
            r |= restrictions_for(d, game, self.map.game.flags[i]);
            self.move_restrictions[i][d as usize] = r;
            if r != 0 {
                self.move_restrictions_found = true;
            }
        }

        self.pickups[i] = self.pickup_from_tile(i, game);
        let front = self.front_tile_index(i);
        if front != 0 {
            self.front_pickups[i] = self.pickup_from_tile(i, front);
        }
    }

    fn pickup_from_tile(&self, i: usize, tile: u8) -> Option<Pickup> {
        let (mut kind, subtype) = entity_id(tile).and_then(pickup_for_entity)?;
        let mut number = 0;
        if let Some(switch) = &self.map.switch {
            if switch.kind[i] != 0 {
                number = switch.number[i];
                if let Some((switch_kind, _)) = entity_id(switch.kind[i]).and_then(pickup_for_entity) {
                    kind = switch_kind;
                }
            }
        }
        Some(Pickup { kind, number, subtype })
    }

    /// Whether anything on any layer can affect a character in cell `i`.
    fn cell_has_tiles(&self, i: usize) -> bool {
        let m = &self.map;
        if m.game.index[i] != 0 {
            return true;
        }
        if m.front.as_ref().is_some_and(|l| l.index[i] != 0)
            || m.tele.as_ref().is_some_and(|l| l.kind[i] != 0)
            || m.speedup.as_ref().is_some_and(|l| l.force[i] > 0)
            || m.switch.as_ref().is_some_and(|l| l.kind[i] != 0)
            || m.door.as_ref().is_some_and(|l| l.index[i] != 0)
            || m.tune.as_ref().is_some_and(|l| l.kind[i] != 0)
        {
            return true;
        }

        // stoppers in a neighbouring cell restrict movement out of this one
        let x = i as i32 % self.width;
        let y = i as i32 / self.width;
        let is_stopper = |t: u8| matches!(t, TILE_STOP | TILE_STOPS | TILE_STOPA);
        [(-1, 0), (1, 0), (0, -1), (0, 1)].iter().any(|&(dx, dy)| {
            let n = self.cell_index(x + dx, y + dy);
            is_stopper(m.game.index[n])
                || m.front.as_ref().is_some_and(|l| is_stopper(l.index[n]))
                || m.door.as_ref().is_some_and(|l| is_stopper(l.index[n]))
        })
    }

    // =========================================================================
    // GRID
    // =========================================================================

    /// Underlying map record.
    #[inline]
    pub fn map(&self) -> &MapData {
        &self.map
    }

    /// Width in tiles.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Row-major index of cell `(x, y)`, clamped into the grid.
    #[inline]
    pub fn cell_index(&self, x: i32, y: i32) -> usize {
        let x = x.clamp(0, self.width - 1);
        let y = y.clamp(0, self.height - 1);
        (y * self.width + x) as usize
    }

    /// Cell containing `pos` (truncated coordinates), clamped.
    #[inline]
    pub fn map_index(&self, pos: Vec2) -> usize {
        self.cell_index((pos.x as i32) >> 5, (pos.y as i32) >> 5)
    }

    /// Cell containing `pos` (rounded coordinates), clamped.
    #[inline]
    pub fn pure_map_index(&self, pos: Vec2) -> usize {
        self.cell_index(((pos.x + 0.5) as i32) >> 5, ((pos.y + 0.5) as i32) >> 5)
    }

    /// Grid coordinates of a cell index.
    #[inline]
    pub fn cell_coords(&self, index: usize) -> (i32, i32) {
        (index as i32 % self.width, index as i32 / self.width)
    }

    #[inline]
    pub(crate) fn is_solid_index(&self, index: usize) -> bool {
        self.infos[index] & INFO_SOLID != 0
    }

    /// Whether any cell in the rectangle spanned by `a` and `b` carries tiles.
    pub fn any_tiles_between(&self, a: Vec2, b: Vec2) -> bool {
        let min_x = (a.x.min(b.x) as i32) >> 5;
        let min_y = (a.y.min(b.y) as i32) >> 5;
        let max_x = ((a.x.max(b.x) as i32) + 1) >> 5;
        let max_y = ((a.y.max(b.y) as i32) + 1) >> 5;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if self.infos[self.cell_index(x, y)] & INFO_HAS_TILES != 0 {
                    return true;
                }
            }
        }
        false
    }

    // =========================================================================
    // LAYER LOOKUPS
    // =========================================================================

    /// Game-layer tile id.
    #[inline]
    pub fn tile_index(&self, index: usize) -> u8 {
        self.map.game.index[index]
    }

    /// Game-layer flags.
    #[inline]
    pub fn tile_flags(&self, index: usize) -> u8 {
        self.map.game.flags[index]
    }

    /// Front-layer tile id (0 without a front layer).
    #[inline]
    pub fn front_tile_index(&self, index: usize) -> u8 {
        self.map.front.as_ref().map_or(0, |l| l.index[index])
    }

    /// Front-layer flags (0 without a front layer).
    #[inline]
    pub fn front_tile_flags(&self, index: usize) -> u8 {
        self.map.front.as_ref().map_or(0, |l| l.flags[index])
    }

    /// Whether the map has a front layer.
    #[inline]
    pub fn has_front(&self) -> bool {
        self.map.front.is_some()
    }

    /// Switch number on the switch layer.
    #[inline]
    pub fn switch_number(&self, index: usize) -> u8 {
        self.map.switch.as_ref().map_or(0, |l| l.number[index])
    }

    /// Switch tile id on the switch layer.
    #[inline]
    pub fn switch_type(&self, index: usize) -> u8 {
        self.map.switch.as_ref().map_or(0, |l| l.kind[index])
    }

    /// Switch parameter on the switch layer.
    #[inline]
    pub fn switch_delay(&self, index: usize) -> u8 {
        self.map.switch.as_ref().map_or(0, |l| l.delay[index])
    }

    /// Whether the map has a switch layer.
    #[inline]
    pub fn has_switch_layer(&self) -> bool {
        self.map.switch.is_some()
    }

    /// Highest switch number on the switch layer.
    #[inline]
    pub fn highest_switch_number(&self) -> u8 {
        self.highest_switch_number
    }

    /// Tile id at `pos` (truncated cell) if it is an obstacle tile, else 0.
    #[inline]
    pub fn collision_at(&self, pos: Vec2) -> u8 {
        obstacle(self.tile_index(self.map_index(pos)))
    }

    /// Front-layer counterpart of [`Collision::collision_at`].
    #[inline]
    pub fn front_collision_at(&self, pos: Vec2) -> u8 {
        obstacle(self.front_tile_index(self.map_index(pos)))
    }

    /// True if the rounded cell at `pos` is solid or no-hook.
    #[inline]
    pub fn check_point(&self, pos: Vec2) -> bool {
        self.is_solid_index(self.pure_map_index(pos))
    }

    // =========================================================================
    // TELEPORTERS
    // =========================================================================

    #[inline]
    fn tele_of_kind(&self, index: usize, kind: u8) -> u8 {
        match &self.map.tele {
            Some(l) if l.kind[index] == kind => l.number[index],
            _ => 0,
        }
    }

    /// Whether the map has a teleporter layer.
    #[inline]
    pub fn has_tele_layer(&self) -> bool {
        self.map.tele.is_some()
    }

    /// TELEIN number at `index`, or 0.
    #[inline]
    pub fn is_teleport(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELEIN)
    }

    /// TELEINEVIL number at `index`, or 0.
    #[inline]
    pub fn is_evil_teleport(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELEINEVIL)
    }

    /// TELECHECKIN number at `index`, or 0.
    #[inline]
    pub fn is_check_teleport(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELECHECKIN)
    }

    /// TELECHECKINEVIL number at `index`, or 0.
    #[inline]
    pub fn is_check_evil_teleport(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELECHECKINEVIL)
    }

    /// TELECHECK (checkpoint) number at `index`, or 0.
    #[inline]
    pub fn is_tele_checkpoint(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELECHECK)
    }

    /// TELEINHOOK number at `index`, or 0.
    #[inline]
    pub fn is_teleport_hook(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELEINHOOK)
    }

    /// TELEINWEAPON number at `index`, or 0.
    #[inline]
    pub fn is_teleport_weapon(&self, index: usize) -> u8 {
        self.tele_of_kind(index, TILE_TELEINWEAPON)
    }

    /// All TELEOUT positions for `number`, in row-major order.
    #[inline]
    pub fn tele_outs(&self, number: u8) -> &[Vec2] {
        &self.tele_outs[number as usize]
    }

    /// All TELECHECKOUT positions for `number`, in row-major order.
    #[inline]
    pub fn tele_check_outs(&self, number: u8) -> &[Vec2] {
        &self.tele_check_outs[number as usize]
    }

    /// Output for teleporter `number` at `tick`: `outs[tick % count]`.
    ///
    /// Pure in `(number, tick)`, so repeated calls within a tick agree.
    #[inline]
    pub fn tele_out(&self, number: u8, tick: i32) -> Option<Vec2> {
        select_out(self.tele_outs(number), tick)
    }

    /// Checkpoint output for `number` at `tick`.
    #[inline]
    pub fn tele_check_out(&self, number: u8, tick: i32) -> Option<Vec2> {
        select_out(self.tele_check_outs(number), tick)
    }

    /// Spawn cells (grid coordinates), in row-major order.
    #[inline]
    pub fn spawn_points(&self) -> &[Vec2] {
        &self.spawn_points
    }

    /// World position of the spawn used by character slot `slot`.
    pub fn spawn_position(&self, slot: u32) -> Option<Vec2> {
        if self.spawn_points.is_empty() {
            return None;
        }
        let cell = self.spawn_points[slot as usize % self.spawn_points.len()];
        Some(cell * TILE_SIZE as f32 + Vec2::new(16.0, 16.0))
    }

    // =========================================================================
    // SPEEDUPS, TUNE ZONES, PICKUPS
    // =========================================================================

    /// Speedup at `index`, if the cell has a positive boost force.
    pub fn speedup(&self, index: usize) -> Option<Speedup> {
        let layer = self.map.speedup.as_ref()?;
        let force = layer.force[index];
        if force == 0 {
            return None;
        }
        let angle = layer.angle[index] as f32 * (std::f32::consts::PI / 180.0);
        Some(Speedup {
            dir: Vec2::direction(angle),
            force: force as i32,
            max_speed: layer.max_speed[index] as i32,
            kind: layer.kind[index],
        })
    }

    /// Tune zone at `index` (0 = base tuning).
    #[inline]
    pub fn is_tune(&self, index: usize) -> u8 {
        match &self.map.tune {
            Some(l) if l.kind[index] != 0 => l.number[index],
            _ => 0,
        }
    }

    /// Pickup on `layer` at `index`.
    #[inline]
    pub fn pickup_at(&self, layer: PickupLayer, index: usize) -> Option<Pickup> {
        match layer {
            PickupLayer::Game => self.pickups[index],
            PickupLayer::Front => self.front_pickups[index],
        }
    }

    /// Whether any stopper exists on the game or front layer.
    #[inline]
    pub fn has_move_restrictions(&self) -> bool {
        self.move_restrictions_found || self.map.door.is_some()
    }
}

#[inline]
fn obstacle(tile: u8) -> u8 {
    if (TILE_SOLID..=TILE_NOLASER).contains(&tile) {
        tile
    } else {
        0
    }
}

#[inline]
fn select_out(outs: &[Vec2], tick: i32) -> Option<Vec2> {
    if outs.is_empty() {
        return None;
    }
    Some(outs[tick.rem_euclid(outs.len() as i32) as usize])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapBuilder;
    use proptest::prelude::*;

    fn test_map() -> Collision {
        let map = MapBuilder::new(10, 8)
            .border()
            .spawn(3, 5)
            .spawn(6, 5)
            .tile(4, 4, TILE_NOHOOK)
            .tile(5, 4, TILE_DEATH)
            .tele(2, 2, TILE_TELEIN, 1)
            .tele(7, 2, TILE_TELEOUT, 1)
            .tele(8, 2, TILE_TELEOUT, 1)
            .tele(5, 2, TILE_TELECHECKOUT, 2)
            .tune(3, 3, 7)
            .speedup(6, 3, TILE_SPEED_BOOST, 10, 0, 90)
            .build();
        Collision::new(map).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_map() {
        let mut map = MapBuilder::new(4, 4).build();
        map.game.index.truncate(3);
        assert!(matches!(Collision::new(map), Err(MapError::LayerSize { .. })));
        assert!(Collision::new(MapBuilder::new(0, 0).build()).is_err());
    }

    #[test]
    fn test_map_index_clamps() {
        let col = test_map();
        assert_eq!(col.map_index(Vec2::new(-100.0, -100.0)), 0);
        assert_eq!(col.map_index(Vec2::new(1.0e6, 1.0e6)), 10 * 8 - 1);
        assert_eq!(col.map_index(Vec2::new(33.0, 65.0)), 2 * 10 + 1);
        assert_eq!(col.pure_map_index(Vec2::new(31.6, 0.0)), 1);
        assert_eq!(col.map_index(Vec2::new(31.6, 0.0)), 0);
    }

    #[test]
    fn test_check_point_and_collision_at() {
        let col = test_map();
        assert!(col.check_point(Vec2::new(5.0, 5.0)));
        assert!(col.check_point(Vec2::new(4.0 * 32.0 + 3.0, 4.0 * 32.0 + 3.0)));
        assert!(!col.check_point(Vec2::new(5.0 * 32.0 + 3.0, 4.0 * 32.0 + 3.0)));
        assert_eq!(col.collision_at(Vec2::new(5.0 * 32.0 + 3.0, 4.0 * 32.0 + 3.0)), TILE_DEATH);
        assert_eq!(col.collision_at(Vec2::new(100.0, 100.0)), 0);
        assert_eq!(col.front_collision_at(Vec2::new(5.0, 5.0)), 0);
    }

    #[test]
    fn test_spawn_points_row_major() {
        let col = test_map();
        assert_eq!(col.spawn_points(), &[Vec2::new(3.0, 5.0), Vec2::new(6.0, 5.0)]);
        assert_eq!(col.spawn_position(0), Some(Vec2::new(112.0, 176.0)));
        assert_eq!(col.spawn_position(3), Some(Vec2::new(208.0, 176.0)));
    }

    #[test]
    fn test_tele_outs_selection() {
        let col = test_map();
        let idx = col.cell_index(2, 2);
        assert_eq!(col.is_teleport(idx), 1);
        assert_eq!(col.is_evil_teleport(idx), 0);
        assert_eq!(col.tele_outs(1).len(), 2);
        assert_eq!(col.tele_out(1, 4), Some(Vec2::new(7.0 * 32.0 + 16.0, 80.0)));
        assert_eq!(col.tele_out(1, 5), Some(Vec2::new(8.0 * 32.0 + 16.0, 80.0)));
        // same tick, same answer
        assert_eq!(col.tele_out(1, 5), col.tele_out(1, 5));
        assert_eq!(col.tele_out(9, 5), None);
        assert_eq!(col.tele_check_out(2, 0), Some(Vec2::new(176.0, 80.0)));
    }

    #[test]
    fn test_absent_layers_answer_zero() {
        let col = Collision::new(MapBuilder::new(4, 4).build()).unwrap();
        assert_eq!(col.is_teleport(5), 0);
        assert_eq!(col.switch_type(5), 0);
        assert_eq!(col.is_tune(5), 0);
        assert!(col.speedup(5).is_none());
        assert_eq!(col.front_tile_index(5), 0);
        assert!(col.spawn_position(0).is_none());
        assert!(!col.has_move_restrictions());
    }

    #[test]
    fn test_tune_and_speedup() {
        let col = test_map();
        assert_eq!(col.is_tune(col.cell_index(3, 3)), 7);
        let s = col.speedup(col.cell_index(6, 3)).unwrap();
        assert_eq!(s.force, 10);
        assert_eq!(s.kind, TILE_SPEED_BOOST);
        assert!(s.dir.x.abs() < 1e-6);
        assert!((s.dir.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pickups() {
        let map = MapBuilder::new(6, 6)
            .tile(1, 1, ENTITY_OFFSET + ENTITY_WEAPON_GRENADE)
            .tile(2, 1, ENTITY_OFFSET + ENTITY_HEALTH_1)
            .front(3, 1, ENTITY_OFFSET + ENTITY_ARMOR_LASER, 0)
            .tile(4, 1, ENTITY_OFFSET + ENTITY_ARMOR_1)
            .switch_tile(4, 1, TILE_SWITCHOPEN, 3, 0)
            .build();
        let col = Collision::new(map).unwrap();

        let p = col.pickup_at(PickupLayer::Game, col.cell_index(1, 1)).unwrap();
        assert_eq!((p.kind, p.subtype, p.number), (PickupKind::Weapon, 3, 0));
        assert_eq!(col.pickup_at(PickupLayer::Game, col.cell_index(2, 1)).map(|p| p.kind), Some(PickupKind::Health));
        assert_eq!(col.pickup_at(PickupLayer::Front, col.cell_index(3, 1)).map(|p| p.kind), Some(PickupKind::ArmorLaser));
        assert_eq!(col.pickup_at(PickupLayer::Game, col.cell_index(4, 1)).map(|p| p.number), Some(3));
        assert_eq!(col.highest_switch_number(), 3);
        assert!(col.pickup_at(PickupLayer::Game, col.cell_index(0, 0)).is_none());
    }

    #[test]
    fn test_any_tiles_between() {
        let col = Collision::new(MapBuilder::new(20, 20).tile(10, 10, TILE_FREEZE).build()).unwrap();
        assert!(!col.any_tiles_between(Vec2::new(40.0, 40.0), Vec2::new(100.0, 60.0)));
        assert!(col.any_tiles_between(Vec2::new(300.0, 300.0), Vec2::new(340.0, 340.0)));
    }

    proptest! {
        #[test]
        fn test_out_of_bounds_queries_clamp(x in -1.0e5f32..1.0e5, y in -1.0e5f32..1.0e5) {
            let col = test_map();
            let pos = Vec2::new(x, y);
            let cx = ((x as i32) >> 5).clamp(0, 9);
            let cy = ((y as i32) >> 5).clamp(0, 7);
            prop_assert_eq!(col.map_index(pos), (cy * 10 + cx) as usize);
            let clamped = Vec2::new((cx * 32 + 16) as f32, (cy * 32 + 16) as f32);
            prop_assert_eq!(col.collision_at(pos), col.collision_at(clamped));
            let _ = col.check_point(pos);
            let _ = col.move_restrictions(&NoSwitches, pos, 18.0, None);
        }
    }
}
